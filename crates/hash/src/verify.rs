//! Checksum verification of downloaded artifacts
//!
//! [`verify_artifact`] is a pure function of the file's bytes and the
//! declared checksum: it never touches the network and never mutates the
//! file. Classification is the caller's to act on - nothing here is coerced
//! to success.

use crate::{Hash, HashAlgorithm};
use capstan_errors::Error;
use capstan_types::Checksum;
use std::path::Path;

/// Result of comparing a local file against its declared checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Digest matches the declaration.
    Verified { digest: Hash },
    /// The descriptor declares `no_check`; nothing was computed.
    Skipped,
    /// Digest does not match. The actual digest is included so callers can
    /// display it or suggest a descriptor fix-up.
    Mismatch { expected: String, actual: String },
    /// The declared value could not be parsed as a digest. Treated like a
    /// mismatch for propagation purposes - never like `Skipped`.
    MissingExpected { declared: String, actual: String },
}

impl VerificationOutcome {
    /// True for the two outcomes that let an artifact through.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Verified { .. } | Self::Skipped)
    }
}

/// Compare a local file against its declared checksum.
///
/// The digest is computed with the declared value's algorithm family. A
/// malformed declaration still computes the actual digest so the failure
/// can be reported with both sides.
///
/// # Errors
///
/// Returns an error only if the file itself cannot be read; every
/// comparison result, including failure to parse the declared value, is a
/// [`VerificationOutcome`].
pub async fn verify_artifact(
    path: &Path,
    expected: &Checksum,
) -> Result<VerificationOutcome, Error> {
    let (algorithm, declared) = match expected {
        Checksum::NoCheck => return Ok(VerificationOutcome::Skipped),
        Checksum::Sha256 { hex } => (HashAlgorithm::Sha256, hex),
        Checksum::Blake3 { hex } => (HashAlgorithm::Blake3, hex),
    };

    let actual = Hash::hash_file(algorithm, path).await?;

    match Hash::from_hex(algorithm, declared) {
        Ok(expected_hash) if expected_hash == actual => Ok(VerificationOutcome::Verified {
            digest: actual,
        }),
        Ok(expected_hash) => Ok(VerificationOutcome::Mismatch {
            expected: expected_hash.to_hex(),
            actual: actual.to_hex(),
        }),
        Err(_) => Ok(VerificationOutcome::MissingExpected {
            declared: declared.clone(),
            actual: actual.to_hex(),
        }),
    }
}
