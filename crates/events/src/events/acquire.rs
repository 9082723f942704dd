use serde::{Deserialize, Serialize};

/// Artifact acquisition events covering the fetch, quarantine-marking, and
/// verification stages of one download.
///
/// The events for a single acquisition arrive in stage order, so a consumer
/// can reconstruct the pipeline's trace (in particular, quarantine events
/// always precede `VerificationStarted`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AcquisitionEvent {
    /// Acquisition started for a package artifact
    Started { package: String, url: String },

    /// The cached artifact path is busy; the fetch will be retried
    CacheBusyRetry {
        package: String,
        attempt: u32,
        delay_ms: u64,
    },

    /// Transfer finished (or the cache already held the artifact)
    Fetched {
        package: String,
        path: String,
    },

    /// Untrusted-origin marking was attached to the download
    QuarantineMarked { package: String, path: String },

    /// Untrusted-origin marking was removed from the download
    QuarantineReleased { package: String, path: String },

    /// Quarantine marking was skipped
    QuarantineSkipped { package: String, reason: String },

    /// Integrity verification started
    VerificationStarted { package: String },

    /// Acquisition completed; the artifact is ready for use
    Completed {
        package: String,
        path: String,
        digest: Option<String>,
    },

    /// Acquisition failed
    Failed { package: String, error: String },
}
