//! Guide Store Error Types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuideStoreError {
    /// Filesystem operation failed
    #[error("Guide store I/O failed at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored document could not be (de)serialized
    #[error("Guide serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Topic id cannot be used as a storage key
    #[error("Invalid guide key: {0:?}")]
    InvalidKey(String),
}

impl GuideStoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }
}
