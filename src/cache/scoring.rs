//! Composite priority scoring
//!
//! The scorer is a pure function of an entry's current state, the wall clock,
//! and the configured type-weight table. Four normalized factors combine with
//! fixed weights into a score in `[0, 1]`; lower scores are evicted first.
//! Scores are time-dependent through the recency factor, so a recomputation
//! with no state change still drifts downward as the entry idles.

use dashmap::DashMap;

use super::entry::CacheEntry;

/// Weight of the file-type factor in the composite score
const TYPE_FACTOR_WEIGHT: f32 = 0.3;
/// Weight of the size factor
const SIZE_FACTOR_WEIGHT: f32 = 0.2;
/// Weight of the access-frequency factor
const FREQUENCY_FACTOR_WEIGHT: f32 = 0.3;
/// Weight of the access-recency factor
const RECENCY_FACTOR_WEIGHT: f32 = 0.2;

/// Type weight applied when the tag is not configured
const DEFAULT_TYPE_WEIGHT: f32 = 0.5;
/// Buffers at or below this size score a full size factor
const SMALL_FILE_BYTES: u64 = 1024;
/// Numerator of the size decay curve for larger buffers
const SIZE_DECAY_BYTES: f32 = 10240.0;
/// Recency decay time constant in seconds (roughly one hour window)
const RECENCY_DECAY_SECS: f32 = 3600.0;

/// Configured per-type priority weights
///
/// Backed by a lock-free map so the scorer reads weights without taking the
/// store lock. Weights are clamped to `[0, 1]` on insert, never rejected.
#[derive(Debug, Default)]
pub struct TypeWeights {
    weights: DashMap<String, f32>,
}

impl TypeWeights {
    /// Create an empty weight table
    pub fn new() -> Self {
        Self {
            weights: DashMap::new(),
        }
    }

    /// Create a table with the default weights for common file types
    pub fn with_defaults() -> Self {
        let table = Self::new();
        for (tag, weight) in [
            (".txt", 0.7),
            (".cfg", 0.9),
            (".conf", 0.9),
            (".ini", 0.9),
            (".log", 0.6),
            (".json", 0.8),
            (".xml", 0.8),
            (".cpp", 0.7),
            (".h", 0.7),
            (".c", 0.7),
            (".py", 0.7),
            (".rs", 0.7),
            (".jpg", 0.4),
            (".png", 0.4),
            (".pdf", 0.3),
            (".exe", 0.1),
            (".so", 0.1),
            (".dll", 0.1),
        ] {
            table.set(tag, weight);
        }
        table
    }

    /// Normalize a tag: a missing leading dot is added so `"cfg"` and
    /// `".cfg"` name the same type
    pub(crate) fn normalize(tag: &str) -> String {
        if !tag.is_empty() && !tag.starts_with('.') {
            format!(".{}", tag)
        } else {
            tag.to_string()
        }
    }

    /// Set the weight for a type tag, clamped to `[0, 1]`
    pub fn set(&self, tag: &str, weight: f32) {
        self.weights
            .insert(Self::normalize(tag), weight.clamp(0.0, 1.0));
    }

    /// Look up the weight for a tag, falling back to the default
    #[inline(always)]
    pub fn get(&self, tag: &str) -> f32 {
        self.weights
            .get(tag)
            .map(|w| *w)
            .unwrap_or(DEFAULT_TYPE_WEIGHT)
    }
}

/// Pure composite score computation
#[derive(Debug, Default)]
pub struct PriorityScorer;

impl PriorityScorer {
    /// Compute an entry's priority score at wall-clock time `now_ns`
    ///
    /// Deterministic given the entry state, the weight table, and `now_ns`.
    pub fn score(&self, entry: &CacheEntry, now_ns: u64, weights: &TypeWeights) -> f32 {
        let type_factor = weights.get(&entry.metadata().type_tag);
        let size_factor = Self::size_factor(entry.memory_usage());
        let frequency_factor = Self::frequency_factor(entry.stats().access_count());
        let recency_factor = Self::recency_factor(now_ns, entry.stats().last_accessed_ns());

        type_factor * TYPE_FACTOR_WEIGHT
            + size_factor * SIZE_FACTOR_WEIGHT
            + frequency_factor * FREQUENCY_FACTOR_WEIGHT
            + recency_factor * RECENCY_FACTOR_WEIGHT
    }

    /// Size factor: 1.0 up to 1 KiB, decaying smoothly for larger buffers
    #[inline(always)]
    fn size_factor(size_bytes: u64) -> f32 {
        if size_bytes <= SMALL_FILE_BYTES {
            1.0
        } else {
            (SIZE_DECAY_BYTES / size_bytes as f32).min(1.0)
        }
    }

    /// Frequency factor: logarithmic with a 0.1 floor, saturating at 1.0
    #[inline(always)]
    fn frequency_factor(access_count: u64) -> f32 {
        0.1 + ((1.0 + access_count as f32).log2() / 10.0).min(0.9)
    }

    /// Recency factor: exponential decay over an hour-scale window
    #[inline(always)]
    fn recency_factor(now_ns: u64, last_accessed_ns: u64) -> f32 {
        let idle_secs = now_ns.saturating_sub(last_accessed_ns) as f32 / 1_000_000_000.0;
        (-idle_secs / RECENCY_DECAY_SECS).exp()
    }
}
