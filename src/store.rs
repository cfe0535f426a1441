//! TOML file persistence for [`DisplayConfig`].
//!
//! A missing file is not an error: the defaults are used and the file is
//! created on the first save.
//!
//! ```toml
//! station = "KLWC"
//! zone = "ct"
//! speed_unit = "knots"
//! bright_start = "7:00"
//! dim_start = "21:00"
//! bright_level = 100
//! dim_level = 10
//!
//! [wifi]
//! ssid = "hangar"
//! password = "secret"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::DisplayConfig;
use crate::traits::{ConfigStore, PersistError};

/// Stores the configuration as a TOML file.
#[derive(Clone, Debug)]
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&mut self) -> Result<DisplayConfig, PersistError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => toml::from_str(&text).map_err(|e| PersistError::Format(e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "no saved configuration, using defaults");
                Ok(DisplayConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, config: &DisplayConfig) -> Result<(), PersistError> {
        let text =
            toml::to_string_pretty(config).map_err(|e| PersistError::Format(e.to_string()))?;
        // Write beside the target, then swap in
        let staging = self.path.with_extension("toml.tmp");
        fs::write(&staging, text)?;
        fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}
