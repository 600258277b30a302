//! Host settings file.
//!
//! JSON with every field optional:
//!
//! ```json
//! {
//!   "tick_ms": 20,
//!   "seed": 42,
//!   "volume": 3,
//!   "scores_path": "highscores.json",
//!   "log_path": "keypad-arcade.log",
//!   "arcade": { "reaction_chase": { "decay_factor": 0.9 } }
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::{ArcadeConfig, ConfigError};
use crate::error::StoreError;
use crate::types::{DEFAULT_VOLUME, MAX_VOLUME, TICK_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tick_ms: u32,
    /// Fixed RNG seed; `None` derives one from the clock at startup.
    pub seed: Option<u32>,
    pub volume: u8,
    pub scores_path: PathBuf,
    pub log_path: PathBuf,
    pub arcade: ArcadeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            seed: None,
            volume: DEFAULT_VOLUME,
            scores_path: PathBuf::from("highscores.json"),
            log_path: PathBuf::from("keypad-arcade.log"),
            arcade: ArcadeConfig::default(),
        }
    }
}

impl Settings {
    /// Read and validate `path`. A missing file yields defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let settings: Settings = match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no settings file at {}, using defaults", path.display());
                Settings::default()
            }
            Err(e) => return Err(e.into()),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::OutOfRange {
                field: "tick_ms",
                reason: "must be at least 1".into(),
            });
        }
        if self.volume > MAX_VOLUME {
            return Err(ConfigError::OutOfRange {
                field: "volume",
                reason: format!("{} exceeds {MAX_VOLUME}", self.volume),
            });
        }
        self.arcade.validate()
    }
}
