//! Content Source Implementations
//!
//! # Accepted Shapes
//!
//! A curriculum document is either a bare array of pillars or an object with
//! a `pillars` array:
//!
//! ```json
//! [{ "id": "p1", "title": "Systems", "code": "SYS", "sections": [] }]
//! { "pillars": [{ "id": "p1", "title": "Systems", "code": "SYS" }] }
//! ```
//!
//! Anything else is [`ContentError::InvalidShape`]. Inside a valid array,
//! individual entries that fail to deserialize are skipped with a warning.

use crate::content::error::ContentError;
use crate::models::{entry_label, json_type_name, Forest, Pillar};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Supplies the curriculum forest the knowledge graph is built from
///
/// `load` is called at most once per service for a successful build, but
/// implementations must tolerate being called from any thread.
pub trait ContentSource: Send + Sync {
    fn load(&self) -> Result<Forest, ContentError>;

    /// Short description for log lines
    fn describe(&self) -> String {
        "custom content source".to_string()
    }
}

impl<F> ContentSource for F
where
    F: Fn() -> Result<Forest, ContentError> + Send + Sync,
{
    fn load(&self) -> Result<Forest, ContentError> {
        self()
    }
}

/// An already-loaded forest
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    forest: Forest,
}

impl StaticContent {
    pub fn new(forest: Forest) -> Self {
        Self { forest }
    }

    pub fn from_pillars(pillars: impl IntoIterator<Item = Pillar>) -> Self {
        Self {
            forest: pillars.into_iter().map(Arc::new).collect(),
        }
    }
}

impl ContentSource for StaticContent {
    fn load(&self) -> Result<Forest, ContentError> {
        Ok(self.forest.clone())
    }

    fn describe(&self) -> String {
        format!("static forest ({} pillars)", self.forest.len())
    }
}

/// A curriculum held as a JSON value (e.g. embedded with `include_str!`)
#[derive(Debug, Clone)]
pub struct JsonValueContent {
    value: Value,
}

impl JsonValueContent {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl ContentSource for JsonValueContent {
    fn load(&self) -> Result<Forest, ContentError> {
        parse_forest(&self.value)
    }

    fn describe(&self) -> String {
        format!("JSON value ({})", json_type_name(&self.value))
    }
}

/// A curriculum JSON file, read when the index is first needed
#[derive(Debug, Clone)]
pub struct JsonFileContent {
    path: PathBuf,
}

impl JsonFileContent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for JsonFileContent {
    fn load(&self) -> Result<Forest, ContentError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| ContentError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_forest_str(&raw)
    }

    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }
}

/// Parse curriculum JSON text into a forest
pub fn parse_forest_str(raw: &str) -> Result<Forest, ContentError> {
    let value: Value = serde_json::from_str(raw)?;
    parse_forest(&value)
}

/// Convert a curriculum JSON value into a forest, skipping malformed pillars
pub fn parse_forest(value: &Value) -> Result<Forest, ContentError> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("pillars") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(ContentError::invalid_shape(format!(
                    "`pillars` must be an array, found {}",
                    json_type_name(other)
                )))
            }
            None => {
                return Err(ContentError::invalid_shape(
                    "expected an array of pillars or an object with a `pillars` array",
                ))
            }
        },
        other => {
            return Err(ContentError::invalid_shape(format!(
                "expected an array of pillars, found {}",
                json_type_name(other)
            )))
        }
    };

    let mut forest = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        match Pillar::deserialize(entry) {
            Ok(pillar) => forest.push(Arc::new(pillar)),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed pillar #{} ({}): {}",
                    position,
                    entry_label(entry),
                    e
                );
            }
        }
    }

    Ok(forest)
}
