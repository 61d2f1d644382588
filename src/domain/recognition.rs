use serde::{Deserialize, Serialize};

/// Model lifecycle as seen from this client.
///
/// State transitions:
/// - NotLoaded -> Loading (load requested by the operator)
/// - Loading -> Loaded (backend replied `status: "success"`)
/// - Loading -> NotLoaded (any other reply or a transport failure; retry allowed)
/// - Loaded -> NotLoaded (operator stopped listening)
///
/// Polling runs exactly while the state is Loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModelState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
}

impl ModelState {
    /// Check if a load request may be issued from this state.
    #[must_use]
    pub fn can_load(&self) -> bool {
        matches!(self, ModelState::NotLoaded)
    }

    /// Check if transcript polling is allowed in this state.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded)
    }
}

impl std::fmt::Display for ModelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelState::NotLoaded => write!(f, "Load Model"),
            ModelState::Loading => write!(f, "Loading Model"),
            ModelState::Loaded => write!(f, "Model Loaded"),
        }
    }
}

/// Which of the two transcript fields a poll response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptField {
    /// Text the backend will not revise further.
    Final,
    /// Provisional text for the utterance in progress.
    Partial,
}

/// Latest transcript text. Each field is overwritten independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSnapshot {
    pub final_text: String,
    pub partial_text: String,
}

impl TranscriptSnapshot {
    pub fn field(&self, field: TranscriptField) -> &str {
        match field {
            TranscriptField::Final => &self.final_text,
            TranscriptField::Partial => &self.partial_text,
        }
    }

    pub fn set(&mut self, field: TranscriptField, text: String) {
        match field {
            TranscriptField::Final => self.final_text = text,
            TranscriptField::Partial => self.partial_text = text,
        }
    }
}

/// Status literal the backend uses to signal acceptance.
pub const STATUS_SUCCESS: &str = "success";

/// Reply body of `use_device`, `load_model` and `stop_listening`.
///
/// Only `status` carries meaning; the other fields are kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

/// Outcome of a backend acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Success,
    /// Any status other than `"success"`, carrying the value actually received.
    Rejected(String),
}

impl Ack {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Ack::Success)
    }
}

impl From<&BackendReply> for Ack {
    fn from(reply: &BackendReply) -> Self {
        match reply.status.as_deref() {
            Some(STATUS_SUCCESS) => Ack::Success,
            Some(other) => Ack::Rejected(other.to_string()),
            None => Ack::Rejected("<missing>".to_string()),
        }
    }
}
