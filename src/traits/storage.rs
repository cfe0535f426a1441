//! Persistence trait for the display configuration.

use thiserror::Error;
use tracing::error;

use crate::config::DisplayConfig;

/// Failure reading or writing the persisted configuration.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The backing file could not be read or written.
    #[error("config storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be encoded or decoded.
    #[error("config format error: {0}")]
    Format(String),
}

/// Loads and saves [`DisplayConfig`].
///
/// `save` is called once after every accepted operator command. A failed
/// save leaves the in-memory configuration authoritative.
pub trait ConfigStore {
    /// Load the stored configuration.
    fn load(&mut self) -> Result<DisplayConfig, PersistError>;

    /// Persist `config`, replacing whatever was stored.
    fn save(&mut self, config: &DisplayConfig) -> Result<(), PersistError>;

    /// Load the stored configuration, falling back to the defaults when it
    /// cannot be read. The next accepted command overwrites the bad copy.
    fn load_or_default(&mut self) -> DisplayConfig {
        self.load().unwrap_or_else(|e| {
            error!(error = %e, "stored configuration unusable, starting from defaults");
            DisplayConfig::default()
        })
    }
}
