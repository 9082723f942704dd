#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the capstan download core
//!
//! This crate provides the fundamental types shared across the system:
//! artifact descriptors, declared checksums, and the quarantine intent.

pub mod artifact;
pub mod checksum;

// Re-export commonly used types
pub use artifact::{ArtifactId, ArtifactRef};
pub use checksum::{Checksum, ChecksumParseError};

use serde::{Deserialize, Serialize};

/// Whether a downloaded artifact should carry an untrusted-origin marking.
///
/// `Unspecified` means the caller expressed no preference and the download
/// pipeline must leave any existing marking alone. It is never collapsed
/// into `Mark` or `Release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuarantineIntent {
    /// Attach the untrusted-origin marking to the download.
    Mark,
    /// Remove any untrusted-origin marking from the download.
    Release,
    /// Do nothing either way.
    Unspecified,
}

impl Default for QuarantineIntent {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl std::fmt::Display for QuarantineIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mark => write!(f, "mark"),
            Self::Release => write!(f, "release"),
            Self::Unspecified => write!(f, "unspecified"),
        }
    }
}
