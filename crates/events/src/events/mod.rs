use serde::{Deserialize, Serialize};

pub mod acquire;
pub mod general;

pub use acquire::AcquisitionEvent;
pub use general::GeneralEvent;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Artifact acquisition events (fetch, quarantine, verification)
    Acquisition(AcquisitionEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Acquisition(AcquisitionEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Acquisition(
                AcquisitionEvent::CacheBusyRetry { .. } | AcquisitionEvent::QuarantineSkipped { .. },
            ) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "capstan::events::general",
            Self::Acquisition(_) => "capstan::events::acquisition",
        }
    }
}
