pub mod backend;
pub mod config;
pub mod http;

pub use backend::SpeechBackend;
pub use config::ConfigStore;
pub use http::HttpClient;
