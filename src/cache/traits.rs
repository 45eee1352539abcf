//! Result types describing where served data came from.

/// Result from a read, including data and the source that produced it.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub origin: DataOrigin,
}

impl<T> CacheResult<T> {
  /// Fresh data from the remote API.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      origin: DataOrigin::Network,
    }
  }

  /// Cached data still inside its time-to-live.
  pub fn from_cache(data: T) -> Self {
    Self {
      data,
      origin: DataOrigin::CacheFresh,
    }
  }

  /// Cached data served because the remote API failed.
  pub fn offline(data: T) -> Self {
    Self {
      data,
      origin: DataOrigin::Offline,
    }
  }

  /// Rows from the bundled static dataset.
  pub fn from_fallback(data: T) -> Self {
    Self {
      data,
      origin: DataOrigin::Fallback,
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheResult<U> {
    CacheResult {
      data: f(self.data),
      origin: self.origin,
    }
  }
}

/// Indicates where served data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
  /// Fresh data from network
  Network,
  /// Data from cache, still considered fresh
  CacheFresh,
  /// Offline mode - network unavailable, serving cached data
  Offline,
  /// Network and cache unavailable, serving the bundled snapshot
  Fallback,
}

impl DataOrigin {
  pub fn label(self) -> &'static str {
    match self {
      DataOrigin::Network => "network",
      DataOrigin::CacheFresh => "cache",
      DataOrigin::Offline => "cache (offline)",
      DataOrigin::Fallback => "bundled snapshot",
    }
  }
}
