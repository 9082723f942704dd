//! Artifact descriptor types
//!
//! An [`ArtifactRef`] is the immutable input to the download pipeline: it
//! identifies a package, where to fetch its artifact from, and what the
//! artifact's contents are expected to hash to. The core only ever reads
//! these values; parsing them out of a package descriptor happens upstream.

use crate::Checksum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Package identity: a name token plus a version.
///
/// Versions are opaque strings. Upstream artifact versions routinely carry
/// build metadata (`1.2.3-beta,45`) that does not parse as semver, so no
/// ordering is implied here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId {
    pub token: String,
    pub version: String,
}

impl ArtifactId {
    pub fn new(token: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.token, self.version)
    }
}

/// Immutable descriptor of a remote artifact to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Package identity the artifact belongs to.
    pub id: ArtifactId,
    /// Source locator (typically a URL).
    pub url: String,
    /// Optional transport hint overriding scheme-based strategy detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    /// Transport-specific options (headers, revisions, trust flags, ...).
    ///
    /// Opaque to the core; forwarded verbatim to the selected strategy.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, String>,
    /// Declared checksum expectation, possibly the explicit no-check sentinel.
    pub checksum: Checksum,
}

impl ArtifactRef {
    /// Create a descriptor with no transport hint or options.
    pub fn new(id: ArtifactId, url: impl Into<String>, checksum: Checksum) -> Self {
        Self {
            id,
            url: url.into(),
            using: None,
            options: HashMap::new(),
            checksum,
        }
    }

    /// Set the transport hint.
    #[must_use]
    pub fn with_using(mut self, using: impl Into<String>) -> Self {
        self.using = Some(using.into());
        self
    }

    /// Add a transport-specific option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_id_display() {
        let id = ArtifactId::new("wget", "1.24.5");
        assert_eq!(id.to_string(), "wget@1.24.5");
    }

    #[test]
    fn artifact_ref_serde_round_trip() {
        let reference = ArtifactRef::new(
            ArtifactId::new("iterm2", "3.5.0"),
            "https://example.com/iterm2.zip",
            Checksum::NoCheck,
        )
        .with_using("http")
        .with_option("trust_cert", "true");

        let json = serde_json::to_string(&reference).unwrap();
        let back: ArtifactRef = serde_json::from_str(&json).unwrap();
        assert_eq!(reference, back);
    }
}
