#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Download orchestration for capstan
//!
//! This crate ties strategy resolution, transfer, quarantine marking, and
//! integrity verification into one fetch-verify-mark operation. It sits at
//! the trust boundary of the installer: an artifact path leaves this crate
//! only after marking has been attempted and verification (when requested)
//! has passed.

mod download;

pub use download::{ArtifactDownload, LocalArtifact, Phase};
