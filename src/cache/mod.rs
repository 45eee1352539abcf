//! Local cache for scheduling data.
//!
//! This module provides the client-side store that sits in front of the
//! scheduling API:
//! - One serialized collection per entity family plus the schedule view
//! - A single last-updated timestamp shared by every collection
//! - Pluggable storage (SQLite on disk, or process memory)
//! - Storage failures are logged and read as cache misses, never raised

mod freshness;
mod key;
mod layer;
mod storage;
mod traits;

pub use freshness::{FreshnessPolicy, GlobalFreshness};
pub use key::CacheKey;
pub use layer::LocalCache;
pub use storage::{CacheStorage, MemoryStorage, SqliteStorage};
pub use traits::{CacheResult, DataOrigin};
