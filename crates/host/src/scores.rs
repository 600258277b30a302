//! Persistent best scores, one per game.
//!
//! Stored as a JSON object keyed by [`GameKind::name`]. A missing or
//! unreadable file means "no scores yet"; the host must keep running on a
//! read-only card, so load never fails and save errors are only reported.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::GameKind;
use crate::error::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    scores: BTreeMap<String, u32>,
}

impl HighScores {
    /// Load from `path`, falling back to empty scores.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(scores) => scores,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no high-score file at {}", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("ignoring high-score file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn get(&self, kind: GameKind) -> u32 {
        self.scores.get(kind.name()).copied().unwrap_or(0)
    }

    /// Keep `score` if it beats the stored best. Returns whether it did.
    pub fn record(&mut self, kind: GameKind, score: u32) -> bool {
        if score <= self.get(kind) {
            return false;
        }
        self.scores.insert(kind.name().to_string(), score);
        true
    }
}
