pub mod config;
pub mod device;
pub mod error;
pub mod recognition;
pub mod session;

pub use config::{AppConfig, BackendConfig, StaleResponsePolicy};
pub use device::{parse_device_index, Device, DeviceId, SessionState, UseDeviceRequest};
pub use error::DomainError;
pub use recognition::{Ack, BackendReply, ModelState, TranscriptField, TranscriptSnapshot};
pub use session::{Effect, Input, PollTicket, Session, UiEvent};
