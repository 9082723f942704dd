#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Untrusted-origin (quarantine) marking for downloaded artifacts
//!
//! Downloads carry a provenance marking so later security prompts can tell
//! the user where a file came from. On macOS this is the
//! `com.apple.quarantine` extended attribute consumed by Gatekeeper; on
//! other Unix platforms an equivalent attribute is written in the `user.`
//! namespace. Marking reflects provenance, not trust: it is applied before
//! integrity verification, so even a file that fails its checksum is
//! correctly marked on disk.
//!
//! Absence of the capability (an unsupported platform, or a filesystem
//! without extended attributes) is expected and is never an error.

use capstan_errors::{Error, QuarantineError};
use capstan_events::{AcquisitionEvent, AppEvent, EventEmitter, EventSender};
use capstan_types::{ArtifactRef, QuarantineIntent};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_os = "macos")]
const QUARANTINE_ATTR: &str = "com.apple.quarantine";
#[cfg(not(target_os = "macos"))]
const QUARANTINE_ATTR: &str = "user.capstan.quarantine";

/// Quarantine flags: download + user approval required.
const QUARANTINE_FLAGS: &str = "0083";

/// Agent name recorded in the attribute payload.
const AGENT_NAME: &str = "capstan";

/// Extended attribute errno values meaning "attribute not present".
/// ENODATA on Linux, ENOATTR on macOS/BSD.
const ATTR_ABSENT_ERRNOS: [i32; 2] = [61, 93];

/// Whether this platform can carry quarantine attributes at all.
#[must_use]
pub fn available() -> bool {
    xattr::SUPPORTED_PLATFORM
}

/// Attach the untrusted-origin marking to a downloaded file.
///
/// The payload mirrors the conventional quarantine format:
/// `flags;hex-timestamp;agent;event-uuid`.
///
/// # Errors
///
/// Returns `QuarantineError::Unsupported` when the filesystem cannot carry
/// extended attributes, and `QuarantineError::MarkFailed` for any other
/// failure to write the attribute.
pub async fn mark(path: &Path, reference: &ArtifactRef) -> Result<(), Error> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let event_id = uuid::Uuid::new_v4().to_string().to_uppercase();
    let payload = format!("{QUARANTINE_FLAGS};{timestamp:x};{AGENT_NAME};{event_id}");

    let target = path.to_path_buf();
    let origin = reference.id.to_string();
    run_attr_op(target.clone(), move |p| {
        xattr::set(p, QUARANTINE_ATTR, payload.as_bytes())
    })
    .await
    .map_err(|e| classify(e, &target, QuarantineOp::Mark { origin }))
}

/// Remove any untrusted-origin marking from a file.
///
/// A file that carries no marking is left alone; absence is not an error.
///
/// # Errors
///
/// Returns `QuarantineError::Unsupported` when the filesystem cannot carry
/// extended attributes, and `QuarantineError::ReleaseFailed` for any other
/// failure to remove the attribute.
pub async fn release(path: &Path) -> Result<(), Error> {
    let target = path.to_path_buf();
    match run_attr_op(target.clone(), |p| xattr::remove(p, QUARANTINE_ATTR)).await {
        Ok(()) => Ok(()),
        Err(e) if attr_absent(&e) => Ok(()),
        Err(e) => Err(classify(e, &target, QuarantineOp::Release)),
    }
}

/// Whether a file currently carries the untrusted-origin marking.
///
/// # Errors
///
/// Returns an error if the attribute cannot be read for a reason other
/// than its absence.
pub async fn is_marked(path: &Path) -> Result<bool, Error> {
    let target = path.to_path_buf();
    let value = tokio::task::spawn_blocking(move || xattr::get(&target, QUARANTINE_ATTR))
        .await
        .map_err(|e| Error::internal(format!("task join error: {e}")))?;
    match value {
        Ok(v) => Ok(v.is_some()),
        Err(e) if attr_absent(&e) || unsupported(&e) => Ok(false),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

/// Apply a quarantine intent to a downloaded file.
///
/// Behavior table: `Unspecified` is a no-op; an absent capability (platform
/// or filesystem) is a no-op reported as a skip event; otherwise the
/// marking is attached or removed and the corresponding acquisition event
/// is emitted.
///
/// # Errors
///
/// Fails only when the capability is present but the attribute operation
/// itself fails.
pub async fn apply(
    intent: QuarantineIntent,
    path: &Path,
    reference: &ArtifactRef,
    tx: &EventSender,
) -> Result<(), Error> {
    if intent == QuarantineIntent::Unspecified {
        return Ok(());
    }

    let package = reference.id.to_string();
    if !available() {
        tx.emit(AppEvent::Acquisition(AcquisitionEvent::QuarantineSkipped {
            package,
            reason: "platform does not support quarantine attributes".to_string(),
        }));
        return Ok(());
    }

    let result = match intent {
        QuarantineIntent::Mark => mark(path, reference).await,
        QuarantineIntent::Release => release(path).await,
        QuarantineIntent::Unspecified => unreachable!(),
    };

    match result {
        Ok(()) => {
            let event = match intent {
                QuarantineIntent::Mark => AcquisitionEvent::QuarantineMarked {
                    package,
                    path: path.display().to_string(),
                },
                _ => AcquisitionEvent::QuarantineReleased {
                    package,
                    path: path.display().to_string(),
                },
            };
            tx.emit(AppEvent::Acquisition(event));
            Ok(())
        }
        Err(Error::Quarantine(QuarantineError::Unsupported)) => {
            tx.emit(AppEvent::Acquisition(AcquisitionEvent::QuarantineSkipped {
                package,
                reason: "filesystem does not support quarantine attributes".to_string(),
            }));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

enum QuarantineOp {
    Mark { origin: String },
    Release,
}

async fn run_attr_op<F>(path: PathBuf, op: F) -> Result<(), std::io::Error>
where
    F: FnOnce(&Path) -> Result<(), std::io::Error> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&path))
        .await
        .map_err(|e| std::io::Error::other(format!("task join error: {e}")))?
}

fn classify(err: std::io::Error, path: &Path, op: QuarantineOp) -> Error {
    if unsupported(&err) {
        return QuarantineError::Unsupported.into();
    }
    let path = path.display().to_string();
    match op {
        QuarantineOp::Mark { origin } => QuarantineError::MarkFailed {
            path,
            message: format!("{err} (artifact {origin})"),
        }
        .into(),
        QuarantineOp::Release => QuarantineError::ReleaseFailed {
            path,
            message: err.to_string(),
        }
        .into(),
    }
}

fn unsupported(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::Unsupported
        || err.raw_os_error() == Some(enotsup_errno())
}

fn attr_absent(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::NotFound
        || err
            .raw_os_error()
            .is_some_and(|code| ATTR_ABSENT_ERRNOS.contains(&code))
}

const fn enotsup_errno() -> i32 {
    // EOPNOTSUPP/ENOTSUP; same value on Linux (95) and distinct on macOS (45)
    #[cfg(target_os = "macos")]
    {
        45
    }
    #[cfg(not(target_os = "macos"))]
    {
        95
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capstan_types::{ArtifactId, Checksum};
    use tempfile::TempDir;

    fn reference() -> ArtifactRef {
        ArtifactRef::new(
            ArtifactId::new("demo", "1.0"),
            "https://example.com/demo.zip",
            Checksum::NoCheck,
        )
    }

    /// Extended attributes are filesystem-dependent; skip assertions where
    /// the temp directory cannot carry them.
    fn fs_supports_xattr(dir: &Path) -> bool {
        let probe = dir.join("xattr-probe");
        std::fs::write(&probe, b"probe").unwrap();
        xattr::set(&probe, QUARANTINE_ATTR, b"0083;0;probe;TEST").is_ok()
    }

    #[tokio::test]
    async fn mark_then_release_round_trip() {
        let dir = TempDir::new().unwrap();
        if !available() || !fs_supports_xattr(dir.path()) {
            return;
        }

        let file = dir.path().join("artifact.zip");
        tokio::fs::write(&file, b"artifact bytes").await.unwrap();

        mark(&file, &reference()).await.unwrap();
        assert!(is_marked(&file).await.unwrap());

        let value = xattr::get(&file, QUARANTINE_ATTR).unwrap().unwrap();
        let value = String::from_utf8(value).unwrap();
        assert!(value.starts_with("0083;"));
        assert!(value.contains(";capstan;"));

        release(&file).await.unwrap();
        assert!(!is_marked(&file).await.unwrap());
    }

    #[tokio::test]
    async fn release_of_unmarked_file_is_ok() {
        let dir = TempDir::new().unwrap();
        if !available() || !fs_supports_xattr(dir.path()) {
            return;
        }

        let file = dir.path().join("clean.zip");
        tokio::fs::write(&file, b"never marked").await.unwrap();

        release(&file).await.unwrap();
        assert!(!is_marked(&file).await.unwrap());
    }

    #[tokio::test]
    async fn apply_unspecified_is_noop_and_silent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("untouched.zip");
        tokio::fs::write(&file, b"data").await.unwrap();

        let (tx, mut rx) = capstan_events::channel();
        apply(QuarantineIntent::Unspecified, &file, &reference(), &tx)
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn apply_mark_emits_quarantine_event() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("marked.zip");
        tokio::fs::write(&file, b"data").await.unwrap();

        let (tx, mut rx) = capstan_events::channel();
        apply(QuarantineIntent::Mark, &file, &reference(), &tx)
            .await
            .unwrap();

        // Either the marking or a capability-absence skip; never silence.
        let event = rx.try_recv().unwrap();
        assert!(matches!(
            event,
            AppEvent::Acquisition(
                AcquisitionEvent::QuarantineMarked { .. }
                    | AcquisitionEvent::QuarantineSkipped { .. }
            )
        ));
    }

    #[tokio::test]
    async fn mark_on_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        if !available() || !fs_supports_xattr(dir.path()) {
            return;
        }

        let missing = dir.path().join("missing.zip");
        let err = mark(&missing, &reference()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Quarantine(QuarantineError::MarkFailed { .. })
        ));
    }
}
