#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Content digests and integrity verification for capstan
//!
//! This crate computes artifact digests (BLAKE3 for content addressing,
//! SHA-256 because upstream descriptors overwhelmingly declare SHA-256) and
//! classifies a local file against its declared checksum.

mod verify;

pub use verify::{verify_artifact, VerificationOutcome};

use blake3::Hasher as Blake3Hasher;
use capstan_errors::{Error, StorageError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Digest algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    /// Canonical lowercase name, as used in checksum declarations.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A 32-byte digest tagged with its algorithm.
///
/// Two hashes are only equal if both the algorithm and the bytes match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    algorithm: HashAlgorithm,
    bytes: [u8; 32],
}

impl Hash {
    /// Create a hash from raw bytes
    #[must_use]
    pub fn from_bytes(algorithm: HashAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// The algorithm this digest was computed with
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string
    ///
    /// # Errors
    /// Returns an error if the input string is not valid hexadecimal or is not
    /// exactly 64 characters (32 bytes).
    pub fn from_hex(algorithm: HashAlgorithm, s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s).map_err(|e| StorageError::CorruptedData {
            message: format!("invalid hex: {e}"),
        })?;

        if bytes.len() != 32 {
            return Err(StorageError::CorruptedData {
                message: format!("{algorithm} digest must be 32 bytes, got {}", bytes.len()),
            }
            .into());
        }

        let mut array = [0u8; 32];
        array.copy_from_slice(&bytes);
        Ok(Self::from_bytes(algorithm, array))
    }

    /// Compute the digest of a byte slice
    #[must_use]
    pub fn from_data(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        let bytes = match algorithm {
            HashAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
            HashAlgorithm::Sha256 => Sha256::digest(data).into(),
        };
        Self::from_bytes(algorithm, bytes)
    }

    /// Compute the digest of a file, streaming in fixed-size chunks
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, read, or if any I/O
    /// operation fails.
    pub async fn hash_file(algorithm: HashAlgorithm, path: &Path) -> Result<Self, Error> {
        let mut file = File::open(path)
            .await
            .map_err(|_| StorageError::PathNotFound {
                path: path.display().to_string(),
            })?;

        let mut buffer = vec![0; CHUNK_SIZE];

        match algorithm {
            HashAlgorithm::Blake3 => {
                let mut hasher = Blake3Hasher::new();
                loop {
                    let n = file.read(&mut buffer).await?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buffer[..n]);
                }
                Ok(Self::from_bytes(algorithm, *hasher.finalize().as_bytes()))
            }
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                loop {
                    let n = file.read(&mut buffer).await?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buffer[..n]);
                }
                Ok(Self::from_bytes(algorithm, hasher.finalize().into()))
            }
        }
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let (algorithm, hex) = s
            .split_once(':')
            .ok_or_else(|| serde::de::Error::custom("expected <algorithm>:<hex>"))?;
        let algorithm = match algorithm {
            "blake3" => HashAlgorithm::Blake3,
            "sha256" => HashAlgorithm::Sha256,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "unknown hash algorithm: {other}"
                )))
            }
        };
        Self::from_hex(algorithm, hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_known_digests() {
        let data = b"hello world";

        // Known BLAKE3 hash of "hello world"
        let blake3 = Hash::from_data(HashAlgorithm::Blake3, data);
        assert_eq!(
            blake3.to_hex(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );

        // Known SHA-256 hash of "hello world"
        let sha256 = Hash::from_data(HashAlgorithm::Sha256, data);
        assert_eq!(
            sha256.to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_algorithm_distinguishes_hashes() {
        let a = Hash::from_data(HashAlgorithm::Blake3, b"same");
        let b = Hash::from_data(HashAlgorithm::Sha256, b"same");
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Hash::from_hex(HashAlgorithm::Sha256, "zzzz").is_err());
        assert!(Hash::from_hex(HashAlgorithm::Sha256, "abcd").is_err());
    }

    #[test]
    fn test_hash_serialization() {
        let hash = Hash::from_data(HashAlgorithm::Sha256, b"test");
        let json = serde_json::to_string(&hash).unwrap();
        assert!(json.starts_with("\"sha256:"));
        let deserialized: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, deserialized);
    }

    #[tokio::test]
    async fn test_hash_file() {
        use std::io::Write;
        let mut temp = NamedTempFile::new().unwrap();
        let data = b"test file content";
        temp.write_all(data).unwrap();

        for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256] {
            let hash = Hash::hash_file(algorithm, temp.path()).await.unwrap();
            assert_eq!(hash, Hash::from_data(algorithm, data));
        }
    }
}
