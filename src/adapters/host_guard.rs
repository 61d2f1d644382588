use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{trace, warn};
use url::{Host, Url};

use crate::domain::config::PrivacyConfig;
use crate::domain::DomainError;
use crate::ports::HttpClient;

/// HostGuard is the only way out to the network.
/// In local-only mode (default) it talks to loopback hosts and nothing else.
/// When local-only is off, only whitelisted hosts are allowed.
pub struct HostGuard {
    client: Client,
    local_only: bool,
    allowed_hosts: Vec<String>,
}

impl HostGuard {
    /// Create a guard from privacy settings, with an optional per-request timeout.
    pub fn new(privacy: &PrivacyConfig, timeout: Option<Duration>) -> Result<Self, DomainError> {
        Self::try_with_config(privacy.local_only, privacy.allowed_hosts.clone(), timeout)
    }

    fn try_with_config(
        local_only: bool,
        allowed_hosts: Vec<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, DomainError> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .user_agent(format!("SpeechDeck/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DomainError::HttpRequest(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            local_only = local_only,
            allowed_hosts = ?allowed_hosts,
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "HostGuard initialized"
        );

        Ok(Self {
            client,
            local_only,
            allowed_hosts,
        })
    }

    fn is_loopback(host: &Host<&str>) -> bool {
        match host {
            Host::Domain(name) => name.eq_ignore_ascii_case("localhost"),
            Host::Ipv4(addr) => IpAddr::V4(*addr).is_loopback(),
            Host::Ipv6(addr) => IpAddr::V6(*addr).is_loopback(),
        }
    }

    /// Check if a URL is allowed based on current settings.
    fn is_url_allowed(&self, url: &str) -> Result<(), DomainError> {
        let parsed = Url::parse(url).map_err(|e| DomainError::HttpRequest(e.to_string()))?;
        let host = parsed
            .host()
            .ok_or_else(|| DomainError::HttpRequest("Invalid URL: no host".to_string()))?;

        if Self::is_loopback(&host) {
            trace!(url = url, "loopback request allowed");
            return Ok(());
        }

        if self.local_only {
            warn!(url = url, "Network request blocked: local-only mode enabled");
            return Err(DomainError::NetworkBlocked {
                reason: format!("Local-only mode is enabled; '{}' is not a loopback host", host),
            });
        }

        let host = host.to_string();
        if !self
            .allowed_hosts
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
        {
            warn!(url = url, host = %host, "Network request blocked: host not in whitelist");
            return Err(DomainError::NetworkBlocked {
                reason: format!("Host '{}' is not in the allowed list", host),
            });
        }

        trace!(url = url, "Network request allowed");
        Ok(())
    }

    async fn decode<R: DeserializeOwned>(url: &str, response: Response) -> Result<R, DomainError> {
        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::HttpRequest(e.to_string()))
    }
}

#[async_trait]
impl HttpClient for HostGuard {
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DomainError> {
        self.is_url_allowed(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::HttpRequest(e.to_string()))?;

        Self::decode(url, response).await
    }

    async fn post_json<T: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<R, DomainError> {
        self.is_url_allowed(url)?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::HttpRequest(e.to_string()))?;

        Self::decode(url, response).await
    }
}
