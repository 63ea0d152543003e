//! Service Layer Error Types
//!
//! Graph queries never fail; these errors belong to the guide workflow, which
//! talks to the generator and the store.

use crate::db::GuideStoreError;
use thiserror::Error;

/// Guide service operation errors
#[derive(Error, Debug)]
pub enum GuideServiceError {
    /// Id is unknown to the graph or does not name a topic
    #[error("Topic not found: {id}")]
    TopicNotFound { id: String },

    /// The guide generator reported a failure
    #[error("Guide generation failed for topic {topic_id}: {source}")]
    GenerationFailed {
        topic_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// Reading or writing the guide store failed
    #[error("Guide store operation failed: {0}")]
    StoreFailed(#[from] GuideStoreError),
}

impl GuideServiceError {
    /// Create a topic not found error
    pub fn topic_not_found(id: impl Into<String>) -> Self {
        Self::TopicNotFound { id: id.into() }
    }

    /// Create a generation failed error
    pub fn generation_failed(topic_id: impl Into<String>, source: anyhow::Error) -> Self {
        Self::GenerationFailed {
            topic_id: topic_id.into(),
            source,
        }
    }
}
