//! Freshness tracking for cached collections.

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use tracing::warn;

use super::key::CacheKey;
use super::storage::CacheStorage;

/// Decides when a cached collection must be refetched.
///
/// Call sites always name the collection they are asking about, so a policy
/// with per-collection clocks can replace the shared one without changes
/// elsewhere.
pub trait FreshnessPolicy: Send + Sync {
  /// Whether the collection under `key` is stale.
  fn is_expired(&self, storage: &dyn CacheStorage, key: CacheKey) -> bool;

  /// Record that the collection under `key` was just refreshed.
  fn touch(&self, storage: &dyn CacheStorage, key: CacheKey) -> Result<()>;

  /// Time-to-live applied by this policy.
  fn ttl(&self) -> Duration;
}

/// One clock for every collection, stored under `cache_last_updated`.
///
/// Refreshing any collection makes all of them look fresh.
#[derive(Debug, Clone, Copy)]
pub struct GlobalFreshness {
  ttl: Duration,
}

impl GlobalFreshness {
  pub const DEFAULT_TTL_MINUTES: i64 = 15;

  pub fn new(ttl: Duration) -> Self {
    Self { ttl }
  }
}

impl Default for GlobalFreshness {
  fn default() -> Self {
    Self::new(Duration::minutes(Self::DEFAULT_TTL_MINUTES))
  }
}

impl FreshnessPolicy for GlobalFreshness {
  fn is_expired(&self, storage: &dyn CacheStorage, _key: CacheKey) -> bool {
    expired_after(read_last_updated(storage), self.ttl, Utc::now())
  }

  fn touch(&self, storage: &dyn CacheStorage, _key: CacheKey) -> Result<()> {
    let now = Utc::now().timestamp_millis();
    storage.set(CacheKey::LastUpdated.as_str(), &now.to_string())
  }

  fn ttl(&self) -> Duration {
    self.ttl
  }
}

/// Read the shared last-updated timestamp. Unreadable values count as absent.
pub(crate) fn read_last_updated(storage: &dyn CacheStorage) -> Option<DateTime<Utc>> {
  let raw = match storage.get(CacheKey::LastUpdated.as_str()) {
    Ok(raw) => raw?,
    Err(e) => {
      warn!("Failed to read cache timestamp: {}", e);
      return None;
    }
  };

  match parse_millis(&raw) {
    Ok(at) => Some(at),
    Err(e) => {
      warn!("{}", e);
      None
    }
  }
}

/// True when there is no timestamp or more than `ttl` has passed since it.
fn expired_after(
  last_updated: Option<DateTime<Utc>>,
  ttl: Duration,
  now: DateTime<Utc>,
) -> bool {
  match last_updated {
    Some(at) => now - at > ttl,
    None => true,
  }
}

fn parse_millis(raw: &str) -> Result<DateTime<Utc>> {
  let millis: i64 = serde_json::from_str(raw)
    .map_err(|e| eyre!("Invalid cache timestamp '{}': {}", raw, e))?;
  DateTime::from_timestamp_millis(millis)
    .ok_or_else(|| eyre!("Cache timestamp out of range: {}", millis))
}
