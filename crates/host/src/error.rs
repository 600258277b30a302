use thiserror::Error;

use crate::core::ConfigError;

/// Failure reading or writing one of the host's files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),
}
