//! Curriculum Source Tree
//!
//! The authored curriculum is a forest of pillars, each owning an ordered
//! sequence of sections, sub-sections and finally topics (the leaf level).
//!
//! # Lenient Deserialization
//!
//! Content is hand-authored and large, so a single malformed entry must not
//! take the whole curriculum down with it. Child arrays are deserialized one
//! element at a time: an element that fails to deserialize is logged and
//! skipped, and its siblings survive. A missing child array is treated as
//! empty. Optional fields (`code`, `color`, `description`, `contentPoints`,
//! `relatedTopics`) fall back to their defaults when null or mistyped; only an
//! unusable `id` or `title` drops an entry.
//!
//! # Examples
//!
//! ```rust
//! use syllabus_core::models::Pillar;
//! use serde_json::json;
//!
//! let pillar: Pillar = serde_json::from_value(json!({
//!     "id": "p-systems",
//!     "title": "Systems",
//!     "code": "SYS",
//!     "sections": [
//!         { "id": "s-os", "title": "Operating Systems", "subSections": [] },
//!         { "title": "missing id, skipped" }
//!     ]
//! }))
//! .unwrap();
//!
//! assert_eq!(pillar.sections.len(), 1);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The full curriculum: pillars in authored order
pub type Forest = Vec<Arc<Pillar>>;

/// Top-level curriculum category (root of one tree in the forest)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pillar {
    pub id: String,

    pub title: String,

    /// Short code shown in badges (e.g. "SYS"); also matched by search
    #[serde(default, deserialize_with = "lenient_field")]
    pub code: String,

    /// Accent color used by the pillar page
    #[serde(default, deserialize_with = "lenient_field")]
    pub color: Option<String>,

    #[serde(default, deserialize_with = "lenient_field")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_children")]
    pub sections: Vec<Arc<Section>>,

    /// Authored fields this model does not name
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,

    pub title: String,

    #[serde(default, deserialize_with = "lenient_field")]
    pub description: Option<String>,

    #[serde(
        default,
        alias = "subsections",
        deserialize_with = "lenient_children"
    )]
    pub sub_sections: Vec<Arc<SubSection>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSection {
    pub id: String,

    pub title: String,

    #[serde(default, deserialize_with = "lenient_field")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_children")]
    pub topics: Vec<Arc<Topic>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Leaf level of the curriculum and the unit a generated guide attaches to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,

    pub title: String,

    #[serde(default, deserialize_with = "lenient_field")]
    pub description: Option<String>,

    /// Key points the topic's content must cover
    #[serde(default, deserialize_with = "lenient_strings")]
    pub content_points: Vec<String>,

    /// Cross-links to other topics by id (may be stale)
    #[serde(default, deserialize_with = "lenient_strings")]
    pub related_topics: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deserialize a child array element by element, dropping malformed entries
///
/// `null` is accepted as an empty array. Anything that is not an array at all
/// is also treated as empty (and logged), so a broken `sections` field only
/// costs that pillar its sections.
fn lenient_children<'de, D, T>(deserializer: D) -> Result<Vec<Arc<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    let items = match raw {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::warn!(
                "Expected an array of curriculum entries, found {}; treating as empty",
                json_type_name(&other)
            );
            return Ok(Vec::new());
        }
    };

    let mut children = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        let label = entry_label(&item);
        match serde_json::from_value::<T>(item) {
            Ok(child) => children.push(Arc::new(child)),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed curriculum entry #{} ({}): {}",
                    position,
                    label,
                    e
                );
            }
        }
    }

    Ok(children)
}

/// Deserialize an optional or cosmetic field, falling back to its default
///
/// `null` and values of the wrong type yield `T::default()` (logged), so a
/// bad `code` or `color` never costs a node its subtree.
fn lenient_field<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(T::default());
    }

    match serde_json::from_value::<T>(raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!("Ignoring malformed curriculum field: {}", e);
            Ok(T::default())
        }
    }
}

/// Deserialize a list of strings, keeping only the string elements
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                other => {
                    tracing::warn!(
                        "Ignoring non-string list entry ({})",
                        json_type_name(&other)
                    );
                    None
                }
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => {
            tracing::warn!(
                "Expected a list of strings, found {}; treating as empty",
                json_type_name(&other)
            );
            Ok(Vec::new())
        }
    }
}

/// Best-effort label for a raw entry, used only in diagnostics
pub(crate) fn entry_label(value: &Value) -> String {
    value
        .get("id")
        .and_then(Value::as_str)
        .map(|id| format!("id '{}'", id))
        .unwrap_or_else(|| "no id".to_string())
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
