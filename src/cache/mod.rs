//! Cache subsystem: entries, scoring, eviction, store, and sessions
//!
//! Module dependency order is leaf-first: `entry` holds the cached data
//! model, `scoring` computes priority scores from it, `eviction` selects
//! victims, `store` orchestrates residency and capacity, and `session`
//! exposes the per-open cursor callers actually read and write through.

pub mod config;
pub mod entry;
pub mod error;
pub mod eviction;
pub mod mode;
pub mod recency;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod store;
