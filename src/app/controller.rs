use std::sync::Arc;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{HostGuard, HttpSpeechBackend, TomlConfigStore};
use crate::app::SessionController;
use crate::domain::{AppConfig, DomainError};
use crate::infrastructure::init_logging;
use crate::ports::ConfigStore;

/// Application controller that orchestrates initialization and owns the
/// operator session.
pub struct AppController {
    config: AppConfig,
    config_store: Arc<TomlConfigStore>,
    session: SessionController,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize the application controller.
    /// Sets up configuration, logging, the HTTP guard and the session.
    /// Must be called from within a tokio runtime.
    pub fn new() -> Result<Self, DomainError> {
        // Step 1: Initialize config store
        let config_store = Arc::new(TomlConfigStore::new()?);

        // Step 2: Load configuration
        let config = config_store.load_effective()?;

        // Step 3: Initialize logging
        let log_guard = init_logging(
            &config_store.logs_dir(),
            &config.logging.level,
            config.logging.file_logging,
            config.logging.max_files,
        )?;

        info!(version = env!("CARGO_PKG_VERSION"), "SpeechDeck starting up");

        // Step 4: HTTP guard and backend client
        let guard = HostGuard::new(&config.privacy, config.backend.request_timeout())?;
        let backend = HttpSpeechBackend::new(guard, &config.backend.base_url)?;

        info!(
            backend = %backend.base_url(),
            poll_interval_ms = config.backend.poll_interval_ms,
            stale_responses = ?config.backend.stale_responses,
            "AppController initialized"
        );

        // Step 5: Session, seeded with a first device listing
        let session = SessionController::new(
            Arc::new(backend),
            config.backend.poll_interval(),
            config.backend.stale_responses,
        );
        session.refresh_device_list();

        Ok(Self {
            config,
            config_store,
            session,
            _log_guard: log_guard,
        })
    }

    /// The operator session.
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> String {
        self.config_store.data_dir().to_string_lossy().to_string()
    }

    /// Get the logs directory path.
    pub fn logs_dir(&self) -> String {
        self.config_store.logs_dir().to_string_lossy().to_string()
    }

    /// Get the config file path.
    pub fn config_path(&self) -> String {
        self.config_store.config_path().to_string_lossy().to_string()
    }

    /// Tear down the session. Safe to call more than once.
    pub fn shutdown(&self) {
        self.session.shutdown();
        info!("SpeechDeck stopped");
    }
}
