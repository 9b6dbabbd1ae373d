//! Eviction victim selection
//!
//! Room-making rescores every resident entry and hands the candidates here.
//! Selection picks the globally lowest score; exact ties fall back to the
//! recency index (least recently touched loses). Entries pinned by open
//! sessions are never selected, so room-making moves on to the next-lowest
//! candidate instead of invalidating a live session's buffer.

use std::cmp::Ordering;
use std::path::Path;

/// One resident entry offered to the eviction policy
#[derive(Debug, Clone, Copy)]
pub struct EvictionCandidate<'a> {
    /// Cache key of the entry
    pub path: &'a Path,
    /// Freshly recomputed priority score
    pub score: f32,
    /// Recency tick, lower = touched longer ago
    pub touch_tick: u64,
    /// Whether an open session pins this entry
    pub pinned: bool,
}

/// Lowest-score-first eviction policy with a recency tie-break
#[derive(Debug, Default)]
pub struct EvictionPolicy;

impl EvictionPolicy {
    /// Select the victim among the candidates, or `None` if all are pinned
    pub fn select_victim<'a, I>(&self, candidates: I) -> Option<&'a Path>
    where
        I: IntoIterator<Item = EvictionCandidate<'a>>,
    {
        candidates
            .into_iter()
            .filter(|c| !c.pinned)
            .min_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.touch_tick.cmp(&b.touch_tick))
            })
            .map(|c| c.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &str, score: f32, tick: u64, pinned: bool) -> EvictionCandidate<'_> {
        EvictionCandidate {
            path: Path::new(path),
            score,
            touch_tick: tick,
            pinned,
        }
    }

    #[test]
    fn lowest_score_wins() {
        let policy = EvictionPolicy;
        let victim = policy.select_victim([
            candidate("a", 0.8, 1, false),
            candidate("b", 0.2, 2, false),
            candidate("c", 0.5, 3, false),
        ]);
        assert_eq!(victim, Some(Path::new("b")));
    }

    #[test]
    fn ties_fall_back_to_least_recently_touched() {
        let policy = EvictionPolicy;
        let victim = policy.select_victim([
            candidate("newer", 0.4, 9, false),
            candidate("older", 0.4, 3, false),
        ]);
        assert_eq!(victim, Some(Path::new("older")));
    }

    #[test]
    fn pinned_entries_are_never_selected() {
        let policy = EvictionPolicy;
        let victim = policy.select_victim([
            candidate("pinned_low", 0.1, 1, true),
            candidate("free_high", 0.9, 2, false),
        ]);
        assert_eq!(victim, Some(Path::new("free_high")));

        let none = policy.select_victim([candidate("pinned", 0.1, 1, true)]);
        assert_eq!(none, None);
    }
}
