//! Quarantine marking error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum QuarantineError {
    #[error("failed to mark {path}: {message}")]
    MarkFailed { path: String, message: String },

    #[error("failed to release quarantine on {path}: {message}")]
    ReleaseFailed { path: String, message: String },

    #[error("quarantine attributes not supported on this platform")]
    Unsupported,
}

impl UserFacingError for QuarantineError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MarkFailed { .. } | Self::ReleaseFailed { .. } => {
                Some("Check filesystem permissions on the download cache.")
            }
            Self::Unsupported => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MarkFailed { .. } => "quarantine.mark_failed",
            Self::ReleaseFailed { .. } => "quarantine.release_failed",
            Self::Unsupported => "quarantine.unsupported",
        };
        Some(code)
    }
}
