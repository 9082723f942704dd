//! Strategy resolution: locator + hint -> transport kind -> strategy
//!
//! Detection is pure and deterministic: the same (locator, hint) pair
//! always selects the same transport kind, and an unmatchable pair fails
//! with `UnsupportedTransport` before any strategy exists - so no network
//! activity can precede the failure.

use crate::{parse_locator, CacheLayout, DownloadStrategy};
use capstan_errors::{AcquireError, Error};
use capstan_types::ArtifactRef;
use std::collections::HashMap;
use std::sync::Arc;

/// Transport family an artifact is fetched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Http,
    Git,
    File,
}

impl TransportKind {
    /// Select the transport kind for a locator and optional hint.
    ///
    /// The hint wins over the locator's scheme; without a hint the scheme
    /// decides, with a `.git` path suffix inferring git over HTTP.
    ///
    /// # Errors
    ///
    /// `UnsupportedTransport` for an empty/unparseable locator, an unknown
    /// hint, or a scheme no transport covers.
    pub fn detect(locator: &str, hint: Option<&str>) -> Result<Self, Error> {
        let unsupported = || -> Error {
            AcquireError::UnsupportedTransport {
                locator: locator.to_string(),
                hint: hint.unwrap_or("none").to_string(),
            }
            .into()
        };

        let url = parse_locator(locator).map_err(|_| unsupported())?;

        if let Some(hint) = hint {
            return match hint {
                "http" | "curl" | "post" => Ok(Self::Http),
                "git" => Ok(Self::Git),
                "file" => Ok(Self::File),
                _ => Err(unsupported()),
            };
        }

        match url.scheme() {
            "http" | "https" => {
                if url.path().ends_with(".git") {
                    Ok(Self::Git)
                } else {
                    Ok(Self::Http)
                }
            }
            "git" => Ok(Self::Git),
            "file" => Ok(Self::File),
            _ => Err(unsupported()),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Git => write!(f, "git"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Factory instantiating a strategy for one artifact reference.
pub type StrategyFactory =
    Arc<dyn Fn(&ArtifactRef, &CacheLayout) -> Arc<dyn DownloadStrategy> + Send + Sync>;

/// Registry of transport implementations, keyed by transport kind.
///
/// The registry is a collaborator: callers register the transports they
/// actually ship. Resolution happens once per orchestration; a detected
/// kind with no registered factory is as unsupported as an unknown scheme.
#[derive(Default)]
pub struct StrategyRegistry {
    factories: HashMap<TransportKind, StrategyFactory>,
}

impl StrategyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a transport kind, replacing any previous one.
    pub fn register<F>(&mut self, kind: TransportKind, factory: F)
    where
        F: Fn(&ArtifactRef, &CacheLayout) -> Arc<dyn DownloadStrategy> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Arc::new(factory));
    }

    /// Whether a transport kind has a registered implementation.
    #[must_use]
    pub fn supports(&self, kind: TransportKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Resolve the strategy for an artifact reference.
    ///
    /// # Errors
    ///
    /// `UnsupportedTransport` when detection fails or no factory is
    /// registered for the detected kind.
    pub fn resolve(
        &self,
        reference: &ArtifactRef,
        cache: &CacheLayout,
    ) -> Result<Arc<dyn DownloadStrategy>, Error> {
        let kind = TransportKind::detect(&reference.url, reference.using.as_deref())?;
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| AcquireError::UnsupportedTransport {
                locator: reference.url.clone(),
                hint: reference.using.clone().unwrap_or_else(|| "none".into()),
            })?;
        Ok(factory(reference, cache))
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
