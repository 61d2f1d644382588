mod common;

use std::time::Duration;

use common::FakeBackend;
use speechdeck_lib::adapters::{HostGuard, HttpSpeechBackend};
use speechdeck_lib::domain::config::PrivacyConfig;
use speechdeck_lib::domain::{Ack, DeviceId, DomainError};
use speechdeck_lib::ports::SpeechBackend;

fn backend(base_url: &str) -> HttpSpeechBackend<HostGuard> {
    let guard = HostGuard::new(&PrivacyConfig::default(), Some(Duration::from_secs(5))).unwrap();
    HttpSpeechBackend::new(guard, base_url).unwrap()
}

#[tokio::test]
async fn test_list_devices_over_http() {
    let fake = FakeBackend::default();
    fake.route(
        "/api/list_devices",
        200,
        r#"[[0,"Mic A"],[7,"USB Audio Device: - (hw:2,0)"]]"#,
    );
    let backend = backend(&fake.start().await);

    let devices = backend.list_devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].index, 7);
    assert_eq!(fake.seen()[0].method, "GET");
}

#[tokio::test]
async fn test_non_2xx_is_status_error() {
    let fake = FakeBackend::default();
    fake.route("/api/list_devices", 500, r#"{"error":"boom"}"#);
    let backend = backend(&fake.start().await);

    assert!(matches!(
        backend.list_devices().await,
        Err(DomainError::HttpStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_use_device_sends_json_body() {
    let fake = FakeBackend::default();
    fake.route(
        "/api/use_device",
        200,
        r#"{"status":"success","using_device":3}"#,
    );
    let backend = backend(&fake.start().await);

    let reply = backend.use_device(DeviceId::Integer(3)).await.unwrap();
    assert_eq!(Ack::from(&reply), Ack::Success);

    let seen = fake.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/api/use_device");
    assert_eq!(seen[0].body, r#"{"device_id":3}"#);
}

#[tokio::test]
async fn test_load_model_without_device_is_rejection() {
    let fake = FakeBackend::default();
    fake.route(
        "/api/load_model",
        200,
        r#"{"info":"before loading the model you must first select an input device"}"#,
    );
    let backend = backend(&fake.start().await);

    let reply = backend.load_model().await.unwrap();
    assert!(!Ack::from(&reply).is_success());
}

#[tokio::test]
async fn test_transcript_and_stop_endpoints() {
    let fake = FakeBackend::default();
    fake.route("/api/get_latest_text", 200, r#""guten morgen""#);
    fake.route("/api/get_latest_partial_text", 200, r#""""#);
    fake.route("/api/stop_listening", 200, r#"{"info":"model stopped"}"#);
    let backend = backend(&fake.start().await);

    assert_eq!(backend.latest_text().await.unwrap(), "guten morgen");
    assert_eq!(backend.latest_partial_text().await.unwrap(), "");
    let reply = backend.stop_listening().await.unwrap();
    assert_eq!(reply.info.as_deref(), Some("model stopped"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = backend(&format!("http://{}", addr));
    let err = backend.load_model().await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_remote_host_blocked_in_local_only_mode() {
    let backend = backend("http://192.0.2.10:5000");
    assert!(matches!(
        backend.list_devices().await,
        Err(DomainError::NetworkBlocked { .. })
    ));
}
