mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{eventually, FakeBackend};
use speechdeck_lib::adapters::{HostGuard, HttpSpeechBackend};
use speechdeck_lib::app::SessionController;
use speechdeck_lib::domain::config::PrivacyConfig;
use speechdeck_lib::domain::{
    ModelState, SessionState, StaleResponsePolicy, TranscriptSnapshot, UiEvent,
};

async fn start(fake: &FakeBackend) -> SessionController {
    let base_url = fake.start().await;
    let guard = HostGuard::new(&PrivacyConfig::default(), None).unwrap();
    let backend = HttpSpeechBackend::new(guard, &base_url).unwrap();
    SessionController::new(
        Arc::new(backend),
        Duration::from_millis(100),
        StaleResponsePolicy::Discard,
    )
}

#[tokio::test]
async fn test_select_device_then_transcribe() {
    let fake = FakeBackend::default();
    fake.route("/api/list_devices", 200, r#"[{"index":0,"name":"Mic A"}]"#);
    fake.route("/api/use_device", 200, r#"{"status":"success","using_device":0}"#);
    fake.route("/api/load_model", 200, r#"{"status":"success"}"#);
    fake.route("/api/get_latest_text", 200, r#""hallo welt""#);
    fake.route("/api/get_latest_partial_text", 200, r#""wie geht""#);

    let session = start(&fake).await;
    let mut events = session.subscribe();

    session.refresh_device_list();
    assert!(eventually(|| session.devices().len() == 1).await);
    assert_eq!(session.devices()[0].name, "Mic A");

    session.submit_device_index("0").unwrap();
    assert!(eventually(|| session.session_state() == SessionState::DeviceConfirmed).await);
    assert_eq!(fake.count("/api/use_device"), 1);
    assert_eq!(fake.count("/api/get_latest_text"), 0);

    session.load_model();
    assert!(eventually(|| session.model_state() == ModelState::Loaded).await);
    assert!(
        eventually(|| session.transcript()
            == TranscriptSnapshot {
                final_text: "hallo welt".to_string(),
                partial_text: "wie geht".to_string(),
            })
        .await
    );
    assert_eq!(fake.count("/api/load_model"), 1);

    session.shutdown();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&UiEvent::DeviceConfirmed {
        device_id: "0".to_string()
    }));
    assert!(seen.contains(&UiEvent::ModelLoaded));
    assert_eq!(seen.last(), Some(&UiEvent::Closed));
}

#[tokio::test]
async fn test_rejected_load_can_be_retried() {
    let fake = FakeBackend::default();
    fake.route("/api/use_device", 200, r#"{"status":"success"}"#);
    fake.route("/api/load_model", 200, r#"{"status":"error"}"#);

    let session = start(&fake).await;
    session.submit_device_index("0").unwrap();
    assert!(eventually(|| session.session_state() == SessionState::DeviceConfirmed).await);

    session.load_model();
    assert!(eventually(|| fake.count("/api/load_model") == 1
        && session.model_state() == ModelState::NotLoaded)
    .await);

    fake.route("/api/load_model", 200, r#"{"status":"success"}"#);
    session.load_model();
    assert!(eventually(|| session.model_state() == ModelState::Loaded).await);
    assert_eq!(fake.count("/api/load_model"), 2);
    session.shutdown();
}

#[tokio::test]
async fn test_backend_down_keeps_session_retryable() {
    let fake = FakeBackend::default();
    fake.route("/api/list_devices", 503, r#"{}"#);
    fake.route("/api/use_device", 500, r#"{}"#);

    let session = start(&fake).await;
    session.refresh_device_list();
    session.submit_device_index("2").unwrap();

    assert!(eventually(|| fake.count("/api/use_device") == 1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.devices().is_empty());
    assert_eq!(session.session_state(), SessionState::Unselected);

    assert!(session.submit_device_index("").is_err());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(fake.count("/api/use_device"), 1);
    session.shutdown();
}

#[tokio::test]
async fn test_stop_listening_halts_polling() {
    let fake = FakeBackend::default();
    fake.route("/api/use_device", 200, r#"{"status":"success"}"#);
    fake.route("/api/load_model", 200, r#"{"status":"success"}"#);
    fake.route("/api/get_latest_text", 200, r#""eins""#);
    fake.route("/api/get_latest_partial_text", 200, r#""zwei""#);
    fake.route("/api/stop_listening", 200, r#"{"info":"model stopped"}"#);

    let session = start(&fake).await;
    session.submit_device_index("0").unwrap();
    assert!(eventually(|| session.session_state() == SessionState::DeviceConfirmed).await);
    session.load_model();
    assert!(eventually(|| fake.count("/api/get_latest_text") >= 2).await);

    session.stop_listening();
    assert_eq!(session.model_state(), ModelState::NotLoaded);
    assert!(eventually(|| fake.count("/api/stop_listening") == 1).await);

    // Let in-flight polls drain, then nothing new may be issued.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let polled = fake.count("/api/get_latest_text");
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(fake.count("/api/get_latest_text"), polled);
    assert!(!session.is_polling());
    session.shutdown();
}
