use async_trait::async_trait;

use crate::domain::{BackendReply, Device, DeviceId, DomainError, TranscriptField};

/// Port for the speech-recognition backend.
///
/// One method per endpoint. Implementations only move bytes; interpreting
/// `status` values is the session's job.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// `GET /api/list_devices`, in backend order.
    async fn list_devices(&self) -> Result<Vec<Device>, DomainError>;

    /// `POST /api/use_device` with `{"device_id": <id>}`.
    async fn use_device(&self, device_id: DeviceId) -> Result<BackendReply, DomainError>;

    /// `GET /api/load_model`. May take as long as the backend needs.
    async fn load_model(&self) -> Result<BackendReply, DomainError>;

    /// `GET /api/get_latest_text`.
    async fn latest_text(&self) -> Result<String, DomainError>;

    /// `GET /api/get_latest_partial_text`.
    async fn latest_partial_text(&self) -> Result<String, DomainError>;

    /// `GET /api/stop_listening`.
    async fn stop_listening(&self) -> Result<BackendReply, DomainError>;

    /// Fetch whichever transcript field a poll asks for.
    async fn transcript(&self, field: TranscriptField) -> Result<String, DomainError> {
        match field {
            TranscriptField::Final => self.latest_text().await,
            TranscriptField::Partial => self.latest_partial_text().await,
        }
    }
}
