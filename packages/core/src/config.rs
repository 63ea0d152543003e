/// Configuration for the knowledge graph service
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of curriculum levels (pillar, section, sub-section, topic)
pub const CURRICULUM_DEPTH: usize = 4;

/// Upper bound for `max_lineage_depth`; anything deeper is corrupted data
const MAX_SUPPORTED_LINEAGE_DEPTH: usize = 64;

pub const ENV_CONTENT_PATH: &str = "SYLLABUS_CONTENT_PATH";
pub const ENV_SEARCH_LIMIT: &str = "SYLLABUS_SEARCH_LIMIT";
pub const ENV_MAX_LINEAGE_DEPTH: &str = "SYLLABUS_MAX_LINEAGE_DEPTH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    /// Curriculum JSON file used by file-backed content sources
    pub content_path: Option<PathBuf>,

    /// Result limit used by `search_default`
    pub default_search_limit: usize,

    /// Maximum nodes visited when reconstructing a lineage
    pub max_lineage_depth: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            content_path: None,
            default_search_limit: 20,
            max_lineage_depth: CURRICULUM_DEPTH,
        }
    }
}

impl GraphConfig {
    /// Build configuration from `SYLLABUS_*` environment variables
    ///
    /// Unset variables keep their defaults. Unparseable values are logged and
    /// ignored rather than failing startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (environment or test map)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_CONTENT_PATH).filter(|p| !p.trim().is_empty()) {
            config.content_path = Some(PathBuf::from(path));
        }

        if let Some(limit) = parse_usize(&lookup, ENV_SEARCH_LIMIT) {
            config.default_search_limit = limit;
        }

        if let Some(depth) = parse_usize(&lookup, ENV_MAX_LINEAGE_DEPTH) {
            config.max_lineage_depth = depth;
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_search_limit == 0 {
            return Err("default_search_limit must be greater than 0".to_string());
        }

        if self.max_lineage_depth < CURRICULUM_DEPTH {
            return Err(format!(
                "max_lineage_depth must be at least {} (one per curriculum level)",
                CURRICULUM_DEPTH
            ));
        }

        if self.max_lineage_depth > MAX_SUPPORTED_LINEAGE_DEPTH {
            return Err(format!(
                "max_lineage_depth cannot exceed {}",
                MAX_SUPPORTED_LINEAGE_DEPTH
            ));
        }

        Ok(())
    }
}

fn parse_usize<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}
