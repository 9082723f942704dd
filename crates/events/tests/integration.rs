//! Integration tests for events crate

use capstan_events::{channel, AcquisitionEvent, AppEvent, EventEmitter, GeneralEvent};

#[tokio::test]
async fn emitter_delivers_in_order() {
    let (tx, mut rx) = channel();

    tx.emit_warning("first");
    tx.emit(AppEvent::Acquisition(AcquisitionEvent::Started {
        package: "demo@1.0".to_string(),
        url: "https://example.com/demo.zip".to_string(),
    }));

    assert!(matches!(
        rx.try_recv().unwrap(),
        AppEvent::General(GeneralEvent::Warning { .. })
    ));
    assert!(matches!(
        rx.try_recv().unwrap(),
        AppEvent::Acquisition(AcquisitionEvent::Started { .. })
    ));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn dropped_receiver_does_not_panic() {
    let (tx, rx) = channel();
    drop(rx);
    // Send errors are intentionally swallowed by the emitter.
    tx.emit_debug("nobody listening");
}

#[test]
fn events_serialize_with_domain_tag() {
    let event = AppEvent::Acquisition(AcquisitionEvent::QuarantineSkipped {
        package: "demo@1.0".to_string(),
        reason: "unsupported".to_string(),
    });

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["domain"], "acquisition");
    assert_eq!(json["event"]["type"], "QuarantineSkipped");

    let back: AppEvent = serde_json::from_value(json).unwrap();
    assert!(matches!(
        back,
        AppEvent::Acquisition(AcquisitionEvent::QuarantineSkipped { .. })
    ));
}

#[test]
fn log_levels_follow_severity() {
    let failed = AppEvent::Acquisition(AcquisitionEvent::Failed {
        package: "demo@1.0".to_string(),
        error: "boom".to_string(),
    });
    assert_eq!(failed.log_level(), tracing::Level::ERROR);

    let warning = AppEvent::General(GeneralEvent::warning("advisory"));
    assert_eq!(warning.log_level(), tracing::Level::WARN);

    let retry = AppEvent::Acquisition(AcquisitionEvent::CacheBusyRetry {
        package: "demo@1.0".to_string(),
        attempt: 1,
        delay_ms: 250,
    });
    assert_eq!(retry.log_level(), tracing::Level::DEBUG);
    assert_eq!(retry.log_target(), "capstan::events::acquisition");
}
