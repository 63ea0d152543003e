//! Content Loading Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Failures while obtaining the curriculum forest
///
/// None of these reach query callers: the graph service logs them and
/// answers from an empty index instead.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Failed to read curriculum file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Curriculum JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Curriculum has an invalid shape: {0}")]
    InvalidShape(String),

    #[error("Curriculum content unavailable: {0}")]
    Unavailable(String),
}

impl ContentError {
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
