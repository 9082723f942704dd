//! Declared checksum expectations
//!
//! A [`Checksum`] records what a package descriptor *claims* the artifact
//! hashes to. The hex payload is stored as written: a malformed digest is a
//! verification-time failure (the verifier still computes and reports the
//! actual digest), not a parse error here, so a typo in a descriptor shows
//! up with enough context to fix it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Declared checksum for a remote artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Checksum {
    /// Explicit opt-out: the descriptor declares `no_check`.
    NoCheck,
    /// Expected SHA-256 digest as lowercase hex.
    Sha256 { hex: String },
    /// Expected BLAKE3 digest as lowercase hex.
    Blake3 { hex: String },
}

impl Checksum {
    /// Expected SHA-256 digest.
    pub fn sha256(hex: impl Into<String>) -> Self {
        Self::Sha256 { hex: hex.into() }
    }

    /// Expected BLAKE3 digest.
    pub fn blake3(hex: impl Into<String>) -> Self {
        Self::Blake3 { hex: hex.into() }
    }

    /// True if this is the explicit no-check sentinel.
    #[must_use]
    pub fn is_no_check(&self) -> bool {
        matches!(self, Self::NoCheck)
    }

    /// The declared hex payload, if any.
    #[must_use]
    pub fn declared_hex(&self) -> Option<&str> {
        match self {
            Self::NoCheck => None,
            Self::Sha256 { hex } | Self::Blake3 { hex } => Some(hex),
        }
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCheck => write!(f, "no_check"),
            Self::Sha256 { hex } => write!(f, "sha256:{hex}"),
            Self::Blake3 { hex } => write!(f, "blake3:{hex}"),
        }
    }
}

/// Error parsing a checksum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumParseError {
    #[error("empty checksum declaration")]
    Empty,
    #[error("unknown checksum algorithm: {0}")]
    UnknownAlgorithm(String),
}

impl FromStr for Checksum {
    type Err = ChecksumParseError;

    /// Accepts `no_check`, `sha256:<hex>`, `blake3:<hex>`, or a bare
    /// 64-character hex string (read as SHA-256, the historical default).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ChecksumParseError::Empty);
        }
        if s == "no_check" || s == ":no_check" {
            return Ok(Self::NoCheck);
        }
        if let Some((algorithm, hex)) = s.split_once(':') {
            return match algorithm {
                "sha256" => Ok(Self::sha256(hex)),
                "blake3" => Ok(Self::blake3(hex)),
                other => Err(ChecksumParseError::UnknownAlgorithm(other.to_string())),
            };
        }
        if s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Self::sha256(s.to_ascii_lowercase()));
        }
        Err(ChecksumParseError::UnknownAlgorithm(s.to_string()))
    }
}
