use std::path::PathBuf;

use crate::domain::{AppConfig, DomainError};

/// Where the console keeps its settings and logs.
pub trait ConfigStore: Send + Sync {
    /// Read the stored configuration, writing defaults on first run.
    fn load(&self) -> Result<AppConfig, DomainError>;

    /// Persist the configuration.
    fn save(&self, config: &AppConfig) -> Result<(), DomainError>;

    /// Stored configuration with process-level overrides applied.
    /// Overrides are never written back.
    fn load_effective(&self) -> Result<AppConfig, DomainError> {
        Ok(self.load()?.with_env_overrides())
    }

    fn config_path(&self) -> PathBuf;

    fn data_dir(&self) -> PathBuf;

    fn logs_dir(&self) -> PathBuf;
}
