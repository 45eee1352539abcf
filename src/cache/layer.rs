//! Typed cache over a storage backend and a freshness policy.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::freshness::{read_last_updated, FreshnessPolicy, GlobalFreshness};
use super::key::CacheKey;
use super::storage::{CacheStorage, MemoryStorage};
use crate::model::ScheduleView;

/// Client-side cache of scheduling collections.
///
/// Constructed once per session and shared by every data-access service;
/// clones share the same storage. Storage and decoding failures are logged
/// and surface as misses.
#[derive(Clone)]
pub struct LocalCache {
  storage: Arc<dyn CacheStorage>,
  freshness: Arc<dyn FreshnessPolicy>,
}

impl LocalCache {
  /// Create a cache over `storage` with the default 15 minute shared clock.
  pub fn new(storage: impl CacheStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
      freshness: Arc::new(GlobalFreshness::default()),
    }
  }

  /// A cache that lives only as long as the process.
  pub fn in_memory() -> Self {
    Self::new(MemoryStorage::new())
  }

  /// Set the time-to-live of the shared clock.
  pub fn with_ttl(self, ttl: Duration) -> Self {
    self.with_freshness(GlobalFreshness::new(ttl))
  }

  /// Replace the freshness policy.
  pub fn with_freshness(mut self, policy: impl FreshnessPolicy + 'static) -> Self {
    self.freshness = Arc::new(policy);
    self
  }

  /// Read and decode the value under `key`.
  pub fn get<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
    let raw = match self.storage.get(key.as_str()) {
      Ok(Some(raw)) => raw,
      Ok(None) => return None,
      Err(e) => {
        warn!("Error retrieving data from cache ({}): {}", key, e);
        return None;
      }
    };

    match serde_json::from_str(&raw) {
      Ok(value) => Some(value),
      Err(e) => {
        warn!("Discarding unreadable cache entry ({}): {}", key, e);
        None
      }
    }
  }

  /// Encode and store `value` under `key`. Failures are logged only.
  pub fn set<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) {
    let raw = match serde_json::to_string(value) {
      Ok(raw) => raw,
      Err(e) => {
        warn!("Failed to serialize cache entry ({}): {}", key, e);
        return;
      }
    };

    if let Err(e) = self.storage.set(key.as_str(), &raw) {
      warn!("Error storing data in cache ({}): {}", key, e);
    }
  }

  /// Whether the cache as a whole needs a reload.
  pub fn is_expired(&self) -> bool {
    self
      .freshness
      .is_expired(self.storage.as_ref(), CacheKey::LastUpdated)
  }

  /// Whether the collection under `key` needs a reload.
  pub fn is_stale(&self, key: CacheKey) -> bool {
    self.freshness.is_expired(self.storage.as_ref(), key)
  }

  /// Record the current time as the refresh time of the whole cache.
  pub fn touch_last_updated(&self) {
    self.mark_fresh(CacheKey::LastUpdated);
  }

  /// Record that the collection under `key` was just refreshed.
  pub fn mark_fresh(&self, key: CacheKey) {
    if let Err(e) = self.freshness.touch(self.storage.as_ref(), key) {
      warn!("Failed to update cache timestamp after refreshing {}: {}", key, e);
    }
  }

  /// When the cache was last refreshed.
  pub fn last_updated(&self) -> Option<DateTime<Utc>> {
    read_last_updated(self.storage.as_ref())
  }

  /// Time-to-live of the freshness policy.
  pub fn ttl(&self) -> Duration {
    self.freshness.ttl()
  }

  /// Whether anything is stored under `key`.
  pub fn contains(&self, key: CacheKey) -> bool {
    matches!(self.storage.get(key.as_str()), Ok(Some(_)))
  }

  /// Remove every known key.
  pub fn clear(&self) {
    for key in CacheKey::ALL {
      if let Err(e) = self.storage.remove(key.as_str()) {
        warn!("Failed to remove cache entry ({}): {}", key, e);
      }
    }
    debug!("Cache cleared");
  }

  /// Cached schedule view rows for one department.
  pub fn filter_views_by_department(&self, department: &str) -> Vec<ScheduleView> {
    self
      .get::<Vec<ScheduleView>>(CacheKey::ScheduleViews)
      .unwrap_or_default()
      .into_iter()
      .filter(|view| view.department == department)
      .collect()
  }
}
