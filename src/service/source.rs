//! Ordered data sources consulted by a read.

/// One step of a read's fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
  /// Cached collection, only while the freshness clock allows it
  FreshCache,
  /// Full collection from the remote API; refreshes the cache on success
  Remote,
  /// Cached collection regardless of age
  StaleCache,
  /// Bundled snapshot; rewrites the cache on use
  Static,
}

impl Source {
  /// Cache, then network, then whatever is cached.
  pub const DEFAULT_CHAIN: &'static [Source] =
    &[Source::FreshCache, Source::Remote, Source::StaleCache];

  /// Default chain with the bundled snapshot as the last resort.
  pub const WITH_STATIC: &'static [Source] = &[
    Source::FreshCache,
    Source::Remote,
    Source::StaleCache,
    Source::Static,
  ];
}

/// Outcome of consulting one source.
pub(crate) enum Attempt<T> {
  /// The source produced data; stop walking the chain
  Hit(T),
  /// The source had nothing to offer
  Miss,
  /// The source failed; remembered in case nothing later succeeds
  Failed(color_eyre::Report),
}
