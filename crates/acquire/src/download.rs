//! The fetch-verify-mark state machine
//!
//! One [`ArtifactDownload`] instance drives one fetch attempt:
//! `Idle -> Fetching -> Marking -> Verifying -> Done`, with `Failed`
//! terminal from any non-idle phase. Retry means constructing a fresh
//! instance; the only in-place waiting is the bounded busy-wait on a
//! contended cache path.
//!
//! Error wrapping happens here and only here: everything that leaves the
//! orchestrator carries the package identity. The one exception is
//! `UnsupportedTransport`, which is surfaced unchanged because it already
//! names the locator and predates any package-specific work.

use capstan_errors::{AcquireError, Error, StorageError};
use capstan_events::{AcquisitionEvent, AppEvent, EventEmitter, EventSender};
use capstan_hash::{verify_artifact, Hash, VerificationOutcome};
use capstan_net::{CacheLayout, DownloadStrategy, StrategyRegistry};
use capstan_types::{ArtifactRef, QuarantineIntent};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Attempt cap for the cache-busy wait. The condition is expected to clear
/// (another writer finishing), so the cap is generous, but a wedged lock
/// must not hang an install forever.
const CACHE_BUSY_MAX_ATTEMPTS: u32 = 10;

/// Base delay between cache-busy attempts; grows linearly per attempt.
const CACHE_BUSY_DELAY: Duration = Duration::from_millis(250);

/// Orchestration phase of one download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Marking,
    Verifying,
    Done,
    Failed,
}

/// A successfully acquired artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    /// Local filesystem path of the cached artifact.
    pub path: PathBuf,
    /// Digest computed during verification; `None` when verification was
    /// skipped or not requested.
    pub digest: Option<Hash>,
}

/// Coordinates one fetch-verify-mark operation for one artifact reference.
pub struct ArtifactDownload {
    reference: ArtifactRef,
    registry: Arc<StrategyRegistry>,
    cache: CacheLayout,
    intent: QuarantineIntent,
    tx: EventSender,
    fetch_timeout: Option<Duration>,
    // Resolved once and cached for the lifetime of this instance.
    strategy: Option<Arc<dyn DownloadStrategy>>,
    phase: Phase,
}

impl ArtifactDownload {
    /// Create an orchestrator for one artifact reference.
    #[must_use]
    pub fn new(
        reference: ArtifactRef,
        registry: Arc<StrategyRegistry>,
        cache: CacheLayout,
        intent: QuarantineIntent,
        tx: EventSender,
    ) -> Self {
        Self {
            reference,
            registry,
            cache,
            intent,
            tx,
            fetch_timeout: None,
            strategy: None,
            phase: Phase::Idle,
        }
    }

    /// Bound the fetch step with a caller-supplied timeout.
    ///
    /// The bound covers only the transfer - the single long-running,
    /// externally-bound step. Marking and verification are ordinary local
    /// file I/O and run unbounded.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Current phase of this attempt.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The descriptor this orchestrator was built for.
    #[must_use]
    pub fn reference(&self) -> &ArtifactRef {
        &self.reference
    }

    /// Fetch the artifact, apply quarantine marking, and verify integrity.
    ///
    /// Marking always precedes verification, so a file that fails its
    /// checksum is still correctly marked on disk; the fetched file is not
    /// rolled back on verification failure. Callers that manage integrity
    /// elsewhere (cache warming) pass `verify: false`.
    ///
    /// # Errors
    ///
    /// `UnsupportedTransport` if no strategy matches the reference;
    /// `FetchFailed` for transfer errors and timeout expiry;
    /// `QuarantineFailed` if the marking operation itself fails;
    /// `ChecksumMismatch` / `ChecksumMissing` for verification failures;
    /// `AlreadyAttempted` if this instance already ran.
    pub async fn fetch_and_verify(&mut self, verify: bool) -> Result<LocalArtifact, Error> {
        if self.phase != Phase::Idle {
            return Err(AcquireError::AlreadyAttempted {
                package: self.reference.id.to_string(),
            }
            .into());
        }

        match self.run(verify).await {
            Ok(artifact) => {
                self.phase = Phase::Done;
                self.tx
                    .emit(AppEvent::Acquisition(AcquisitionEvent::Completed {
                        package: self.reference.id.to_string(),
                        path: artifact.path.display().to_string(),
                        digest: artifact.digest.as_ref().map(Hash::to_hex),
                    }));
                Ok(artifact)
            }
            Err(error) => {
                self.phase = Phase::Failed;
                self.tx
                    .emit(AppEvent::Acquisition(AcquisitionEvent::Failed {
                        package: self.reference.id.to_string(),
                        error: error.to_string(),
                    }));
                Err(error)
            }
        }
    }

    /// Invalidate cached state for this reference.
    ///
    /// # Errors
    ///
    /// `UnsupportedTransport` if no strategy matches; `CacheClearFailed`
    /// if cached files exist but cannot be removed.
    pub async fn clear_cache(&mut self) -> Result<(), Error> {
        let package = self.reference.id.to_string();
        let strategy = self.strategy()?;
        strategy.clear_cache().await.map_err(|e| {
            AcquireError::CacheClearFailed {
                package,
                cause: e.to_string(),
            }
            .into()
        })
    }

    /// Local path of a previously fetched artifact, if the cache holds one.
    ///
    /// # Errors
    ///
    /// `UnsupportedTransport` if no strategy matches; cache absence is
    /// `Ok(None)`, never an error.
    pub async fn cached_location_if_present(&mut self) -> Result<Option<PathBuf>, Error> {
        let strategy = self.strategy()?;
        match strategy.cached_location().await {
            Ok(path) => Ok(Some(path)),
            Err(
                Error::Acquire(AcquireError::MissingLocalPath { .. })
                | Error::Storage(StorageError::PathNotFound { .. }),
            ) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn strategy(&mut self) -> Result<Arc<dyn DownloadStrategy>, Error> {
        if let Some(strategy) = &self.strategy {
            return Ok(Arc::clone(strategy));
        }
        let strategy = self.registry.resolve(&self.reference, &self.cache)?;
        self.strategy = Some(Arc::clone(&strategy));
        Ok(strategy)
    }

    async fn run(&mut self, verify: bool) -> Result<LocalArtifact, Error> {
        let package = self.reference.id.to_string();

        self.phase = Phase::Fetching;
        self.tx
            .emit(AppEvent::Acquisition(AcquisitionEvent::Started {
                package: package.clone(),
                url: self.reference.url.clone(),
            }));

        // Resolution failures (UnsupportedTransport) surface unchanged.
        let strategy = self.strategy()?;
        self.fetch(&strategy, &package).await?;

        let path = strategy.cached_location().await.map_err(|e| {
            Error::from(AcquireError::FetchFailed {
                package: package.clone(),
                cause: format!("no cached location after fetch: {e}"),
            })
        })?;
        self.tx
            .emit(AppEvent::Acquisition(AcquisitionEvent::Fetched {
                package: package.clone(),
                path: path.display().to_string(),
            }));

        self.phase = Phase::Marking;
        capstan_quarantine::apply(self.intent, &path, &self.reference, &self.tx)
            .await
            .map_err(|e| {
                Error::from(AcquireError::QuarantineFailed {
                    package: package.clone(),
                    cause: e.to_string(),
                })
            })?;

        self.phase = Phase::Verifying;
        let digest = if verify {
            self.verify_integrity(&path, &package).await?
        } else {
            None
        };

        Ok(LocalArtifact { path, digest })
    }

    /// Drive the strategy's fetch, waiting out a busy cache path.
    async fn fetch(&self, strategy: &Arc<dyn DownloadStrategy>, package: &str) -> Result<(), Error> {
        let mut attempt = 0u32;
        loop {
            let result = match self.fetch_timeout {
                Some(limit) => match tokio::time::timeout(limit, strategy.fetch(&self.tx)).await {
                    Ok(result) => result,
                    Err(_) => {
                        return Err(AcquireError::FetchFailed {
                            package: package.to_string(),
                            cause: format!("timed out after {}ms", limit.as_millis()),
                        }
                        .into())
                    }
                },
                None => strategy.fetch(&self.tx).await,
            };

            match result {
                Ok(()) => return Ok(()),
                Err(Error::Acquire(AcquireError::CacheBusy { .. }))
                    if attempt < CACHE_BUSY_MAX_ATTEMPTS =>
                {
                    attempt += 1;
                    let delay = CACHE_BUSY_DELAY * attempt;
                    self.tx
                        .emit(AppEvent::Acquisition(AcquisitionEvent::CacheBusyRetry {
                            package: package.to_string(),
                            attempt,
                            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        }));
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(AcquireError::FetchFailed {
                        package: package.to_string(),
                        cause: e.to_string(),
                    }
                    .into())
                }
            }
        }
    }

    async fn verify_integrity(
        &self,
        path: &std::path::Path,
        package: &str,
    ) -> Result<Option<Hash>, Error> {
        self.tx
            .emit(AppEvent::Acquisition(AcquisitionEvent::VerificationStarted {
                package: package.to_string(),
            }));

        // A read failure keeps its error kind (and retryability); storage
        // errors already name the cached path, which carries the package
        // identity.
        let outcome = verify_artifact(path, &self.reference.checksum)
            .await
            .map_err(|e| match e {
                Error::Io {
                    kind,
                    message,
                    path,
                } => Error::Io {
                    kind,
                    message: format!("verification read failed for {package}: {message}"),
                    path,
                },
                other => other,
            })?;

        match outcome {
            VerificationOutcome::Verified { digest } => Ok(Some(digest)),
            VerificationOutcome::Skipped => {
                self.tx.emit_warning(format!(
                    "No checksum defined for {package}, skipping verification."
                ));
                Ok(None)
            }
            VerificationOutcome::Mismatch { expected, actual } => {
                Err(AcquireError::ChecksumMismatch {
                    package: package.to_string(),
                    expected,
                    actual,
                }
                .into())
            }
            VerificationOutcome::MissingExpected { declared, actual } => {
                Err(AcquireError::ChecksumMissing {
                    package: package.to_string(),
                    expected: declared,
                    actual,
                }
                .into())
            }
        }
    }
}

impl std::fmt::Debug for ArtifactDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactDownload")
            .field("reference", &self.reference.id)
            .field("intent", &self.intent)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
