//! Generated Topic Guides
//!
//! Types exchanged with the guide generator and the guide store. The graph
//! itself never reads these; it only supplies the topic fields a request is
//! built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the generator is told about a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideRequest {
    pub topic_id: String,
    pub title: String,
    pub description: Option<String>,
    pub content_points: Vec<String>,

    /// Ancestor titles root-first, ending with the topic's own title
    pub breadcrumb: Vec<String>,
}

/// Generator output: prose plus the URLs it cites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedGuide {
    pub content: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// A guide as persisted, keyed by topic id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGuide {
    pub topic_id: String,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl StoredGuide {
    /// Stamp a freshly generated guide for storage
    pub fn from_generated(topic_id: impl Into<String>, guide: GeneratedGuide) -> Self {
        Self {
            topic_id: topic_id.into(),
            content: guide.content,
            sources: guide.sources,
            generated_at: Utc::now(),
        }
    }
}
