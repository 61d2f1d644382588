use thiserror::Error;

/// Domain-level errors for SpeechDeck.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network request blocked: {reason}")]
    NetworkBlocked { reason: String },

    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Please enter a valid index (got {input:?})")]
    InvalidDeviceIndex { input: String },

    #[error("Session has been torn down")]
    SessionClosed,
}

impl DomainError {
    /// True for failures that happened before or during transport, as opposed
    /// to a well-formed reply the backend chose to reject.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DomainError::HttpRequest(_)
                | DomainError::HttpStatus { .. }
                | DomainError::NetworkBlocked { .. }
        )
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DomainError {
    fn from(err: toml::de::Error) -> Self {
        DomainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DomainError {
    fn from(err: toml::ser::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for DomainError {
    fn from(err: url::ParseError) -> Self {
        DomainError::Config(format!("Invalid URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(DomainError::HttpRequest("connection refused".into()).is_transport());
        assert!(DomainError::HttpStatus {
            status: 500,
            url: "http://127.0.0.1:5000/api/load_model".into()
        }
        .is_transport());
        assert!(!DomainError::InvalidDeviceIndex { input: "x".into() }.is_transport());
    }

    #[test]
    fn test_validation_message() {
        let err = DomainError::InvalidDeviceIndex { input: "abc".into() };
        assert!(err.to_string().starts_with("Please enter a valid index"));
    }
}
