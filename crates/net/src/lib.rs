#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Download strategy selection for capstan
//!
//! This crate defines the capability contract every transport implements
//! ([`DownloadStrategy`]), the pure mapping from a source locator to a
//! transport kind, and the registry that instantiates a strategy for an
//! artifact descriptor. The concrete transports themselves (HTTP, git,
//! local file, ...) live with the caller; the download core only consumes
//! the contract.

mod cache;
mod resolver;
mod strategy;

pub use cache::CacheLayout;
pub use resolver::{StrategyFactory, StrategyRegistry, TransportKind};
pub use strategy::DownloadStrategy;

use capstan_errors::{AcquireError, Error};
use url::Url;

/// Parse and validate a source locator
///
/// # Errors
///
/// Returns `UnsupportedTransport` if the locator is empty or not a valid
/// URL; a locator that cannot be parsed can never be matched to a strategy.
pub fn parse_locator(locator: &str) -> Result<Url, Error> {
    if locator.trim().is_empty() {
        return Err(AcquireError::UnsupportedTransport {
            locator: String::from("<empty>"),
            hint: String::from("none"),
        }
        .into());
    }
    Url::parse(locator).map_err(|_| {
        AcquireError::UnsupportedTransport {
            locator: locator.to_string(),
            hint: String::from("none"),
        }
        .into()
    })
}
