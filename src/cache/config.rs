//! Cache configuration
//!
//! Construction-time settings for a cache instance. The defaults mirror the
//! classic tuning: a 64 MiB ceiling and a weight table that favors small
//! configuration formats over bulk binary content.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::scoring::TypeWeights;

/// Default capacity ceiling (64 MiB)
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// Cache construction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Capacity ceiling in bytes
    pub max_size_bytes: u64,
    /// Per-type priority weights, keyed by type tag (e.g. ".cfg")
    ///
    /// Weights outside `[0, 1]` are clamped at table construction. An empty
    /// map configures nothing: unknown tags score the default weight 0.5.
    pub type_weights: HashMap<String, f32>,
    /// Seed the weight table with the built-in defaults before applying
    /// `type_weights` overrides
    pub use_default_type_weights: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            type_weights: HashMap::new(),
            use_default_type_weights: true,
        }
    }
}

impl CacheConfig {
    /// Build the runtime weight table this config describes
    pub(crate) fn build_type_weights(&self) -> TypeWeights {
        let table = if self.use_default_type_weights {
            TypeWeights::with_defaults()
        } else {
            TypeWeights::new()
        };
        for (tag, weight) in &self.type_weights {
            table.set(tag, *weight);
        }
        table
    }
}
