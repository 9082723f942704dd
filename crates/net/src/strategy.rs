//! The download strategy capability contract

use async_trait::async_trait;
use capstan_errors::Error;
use capstan_events::EventSender;
use std::path::PathBuf;

/// A transport capable of materializing one artifact into the local cache.
///
/// A strategy is selected once per artifact reference and owns the cached
/// state for that reference. Implementations are black boxes to the
/// download core; the only assumptions made here are the ones below.
///
/// A single instance is not assumed safe to drive from two concurrent
/// fetches of the same reference - external concurrency is handled by the
/// cache layer's at-most-one-writer guarantee, surfaced to this contract as
/// the retryable `AcquireError::CacheBusy`.
#[async_trait]
pub trait DownloadStrategy: Send + Sync {
    /// Perform the transfer.
    ///
    /// Idempotent with respect to an already-cached artifact: a strategy
    /// may short-circuit when the cache already holds matching content.
    ///
    /// # Errors
    ///
    /// `AcquireError::CacheBusy` when another writer holds the cached path
    /// (the caller retries); any other error is terminal for this attempt.
    async fn fetch(&self, tx: &EventSender) -> Result<(), Error>;

    /// Local path of the most recent successful fetch.
    ///
    /// # Errors
    ///
    /// Fails if no successful fetch has populated the cache.
    async fn cached_location(&self) -> Result<PathBuf, Error>;

    /// Invalidate and remove cached state for this reference.
    ///
    /// # Errors
    ///
    /// Returns an error if cached files exist but cannot be removed.
    async fn clear_cache(&self) -> Result<(), Error>;
}
