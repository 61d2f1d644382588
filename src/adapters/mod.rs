pub mod config_store;
pub mod host_guard;
pub mod http_backend;

pub use config_store::TomlConfigStore;
pub use host_guard::HostGuard;
pub use http_backend::HttpSpeechBackend;
