use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::domain::{BackendReply, Device, DeviceId, DomainError, UseDeviceRequest};
use crate::ports::{HttpClient, SpeechBackend};

const LIST_DEVICES: &str = "api/list_devices";
const USE_DEVICE: &str = "api/use_device";
const LOAD_MODEL: &str = "api/load_model";
const LATEST_TEXT: &str = "api/get_latest_text";
const LATEST_PARTIAL_TEXT: &str = "api/get_latest_partial_text";
const STOP_LISTENING: &str = "api/stop_listening";

/// Speech backend reached over HTTP/JSON.
pub struct HttpSpeechBackend<C> {
    http: C,
    base: Url,
}

impl<C: HttpClient> HttpSpeechBackend<C> {
    /// Build a backend client rooted at `base_url`, e.g. `http://127.0.0.1:5000`.
    pub fn new(http: C, base_url: &str) -> Result<Self, DomainError> {
        let mut base = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<String, DomainError> {
        Ok(self.base.join(path)?.to_string())
    }
}

#[async_trait]
impl<C: HttpClient> SpeechBackend for HttpSpeechBackend<C> {
    async fn list_devices(&self) -> Result<Vec<Device>, DomainError> {
        let url = self.endpoint(LIST_DEVICES)?;
        let devices: Vec<Device> = self.http.get_json(&url).await?;
        debug!(count = devices.len(), "devices listed");
        Ok(devices)
    }

    async fn use_device(&self, device_id: DeviceId) -> Result<BackendReply, DomainError> {
        let url = self.endpoint(USE_DEVICE)?;
        let reply: BackendReply = self
            .http
            .post_json(&url, &UseDeviceRequest { device_id })
            .await?;
        debug!(%device_id, ?reply, "use_device replied");
        Ok(reply)
    }

    async fn load_model(&self) -> Result<BackendReply, DomainError> {
        let url = self.endpoint(LOAD_MODEL)?;
        let reply: BackendReply = self.http.get_json(&url).await?;
        debug!(?reply, "load_model replied");
        Ok(reply)
    }

    async fn latest_text(&self) -> Result<String, DomainError> {
        let url = self.endpoint(LATEST_TEXT)?;
        self.http.get_json(&url).await
    }

    async fn latest_partial_text(&self) -> Result<String, DomainError> {
        let url = self.endpoint(LATEST_PARTIAL_TEXT)?;
        self.http.get_json(&url).await
    }

    async fn stop_listening(&self) -> Result<BackendReply, DomainError> {
        let url = self.endpoint(STOP_LISTENING)?;
        self.http.get_json(&url).await
    }
}
