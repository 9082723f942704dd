//! Artifact acquisition error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum AcquireError {
    #[error("no download strategy for {locator} (hint: {hint})")]
    UnsupportedTransport { locator: String, hint: String },

    #[error("download failed for {package}: {cause}")]
    FetchFailed { package: String, cause: String },

    #[error("cache busy: {path}")]
    CacheBusy { path: String },

    #[error("download already attempted for {package}")]
    AlreadyAttempted { package: String },

    #[error("quarantine failed for {package}: {cause}")]
    QuarantineFailed { package: String, cause: String },

    #[error("checksum for {package} is missing or unreadable: expected {expected}, file has {actual}")]
    ChecksumMissing {
        package: String,
        expected: String,
        actual: String,
    },

    #[error("checksum mismatch for {package}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        package: String,
        expected: String,
        actual: String,
    },

    #[error("failed to clear cache for {package}: {cause}")]
    CacheClearFailed { package: String, cause: String },

    #[error("no cached download for {package}")]
    MissingLocalPath { package: String },
}

impl UserFacingError for AcquireError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedTransport { .. } => {
                Some("Check the artifact URL and its transport hint.")
            }
            Self::FetchFailed { .. } => Some("Check your network connection and retry."),
            Self::CacheBusy { .. } => {
                Some("Another download for this artifact is in progress; retry shortly.")
            }
            Self::ChecksumMismatch { .. } => Some(
                "The downloaded file does not match its descriptor. Clear the cache and \
                 re-download, or update the descriptor's checksum if the upstream artifact \
                 changed legitimately.",
            ),
            Self::ChecksumMissing { .. } => {
                Some("The descriptor's checksum could not be parsed; fix it or declare no_check.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CacheBusy { .. } | Self::FetchFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnsupportedTransport { .. } => "acquire.unsupported_transport",
            Self::FetchFailed { .. } => "acquire.fetch_failed",
            Self::CacheBusy { .. } => "acquire.cache_busy",
            Self::AlreadyAttempted { .. } => "acquire.already_attempted",
            Self::QuarantineFailed { .. } => "acquire.quarantine_failed",
            Self::CacheClearFailed { .. } => "acquire.cache_clear_failed",
            Self::ChecksumMissing { .. } => "acquire.checksum_missing",
            Self::ChecksumMismatch { .. } => "acquire.checksum_mismatch",
            Self::MissingLocalPath { .. } => "acquire.missing_local_path",
        };
        Some(code)
    }
}
