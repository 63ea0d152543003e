//! Knowledge Graph Service
//!
//! The single access point for curriculum graph queries. Owns the index and
//! answers every query from memory.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──first query──▶ Building ──▶ Ready
//!                                    └──────▶ BuildFailed (queries answer empty)
//! ```
//!
//! The index is built exactly once per service, even when the first queries
//! race on several threads (`OnceLock`). After that all reads are lock-free
//! and the index is never mutated.
//!
//! Construct one service at startup and share it as `Arc<KnowledgeGraphService>`.
//! [`KnowledgeGraphService::from_forest`] builds eagerly, which is the normal
//! path once content is loaded; [`KnowledgeGraphService::new`] defers loading
//! to the first query for hosts that cannot order their startup.
//!
//! # Error Policy
//!
//! No query returns an error. Unknown ids are routine (stale bookmarks,
//! stale cross-links) and answer `None` or an empty list. A content source
//! failure is logged and leaves the service answering as an empty graph.
//!
//! # Examples
//!
//! ```rust
//! use syllabus_core::content::parse_forest;
//! use syllabus_core::{GraphConfig, KnowledgeGraphService};
//! use serde_json::json;
//!
//! let forest = parse_forest(&json!([{
//!     "id": "p1", "title": "Systems", "code": "SYS",
//!     "sections": [{ "id": "s1", "title": "Memory", "subSections": [{
//!         "id": "ss1", "title": "Virtual Memory",
//!         "topics": [{ "id": "t1", "title": "Paging" }, { "id": "t2", "title": "TLB" }]
//!     }]}]
//! }]))
//! .unwrap();
//!
//! let graph = KnowledgeGraphService::from_forest(forest, GraphConfig::default());
//!
//! let crumbs: Vec<&str> = graph.get_lineage("t1").iter().map(|n| n.title.as_str()).collect();
//! assert_eq!(crumbs, vec!["Systems", "Memory", "Virtual Memory", "Paging"]);
//!
//! let nav = graph.get_topic_navigation("t1");
//! assert!(nav.prev.is_none());
//! assert_eq!(nav.next.map(|n| n.id.as_str()), Some("t2"));
//! ```

use crate::config::GraphConfig;
use crate::content::{ContentError, ContentSource, JsonFileContent, StaticContent};
use crate::models::{Forest, KnowledgeNode, NodeKind, Pillar, Topic, TopicNavigation};
use crate::services::graph_index::{BuildReport, GraphIndex, GraphIndexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

const STATE_UNINITIALIZED: u8 = 0;
const STATE_BUILDING: u8 = 1;
const STATE_READY: u8 = 2;
const STATE_BUILD_FAILED: u8 = 3;

/// Where the service is in its build lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexState {
    Uninitialized,
    Building,
    Ready,
    /// The source could not be loaded; the graph answers as if empty
    BuildFailed,
}

impl IndexState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            STATE_BUILDING => Self::Building,
            STATE_READY => Self::Ready,
            STATE_BUILD_FAILED => Self::BuildFailed,
            _ => Self::Uninitialized,
        }
    }

    /// Whether queries are answered from a finished index
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::BuildFailed)
    }
}

pub struct KnowledgeGraphService {
    source: Box<dyn ContentSource>,
    config: GraphConfig,
    index: OnceLock<GraphIndex>,
    state: AtomicU8,
}

impl std::fmt::Debug for KnowledgeGraphService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeGraphService")
            .field("source", &self.source.describe())
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

impl KnowledgeGraphService {
    /// Create a service that builds its index on first use
    ///
    /// An invalid configuration is logged and replaced by the defaults.
    pub fn new(source: impl ContentSource + 'static, config: GraphConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Invalid graph configuration ({}), using defaults", e);
                GraphConfig::default()
            }
        };

        Self {
            source: Box::new(source),
            config,
            index: OnceLock::new(),
            state: AtomicU8::new(STATE_UNINITIALIZED),
        }
    }

    /// Create a service and build its index before returning
    pub fn from_forest(forest: Forest, config: GraphConfig) -> Self {
        let service = Self::new(StaticContent::new(forest), config);
        service.ensure_ready();
        service
    }

    /// Create a lazily-built service reading `config.content_path`
    ///
    /// Without a content path the first query moves the service to
    /// `BuildFailed`.
    pub fn from_config(config: GraphConfig) -> Self {
        match config.content_path.clone() {
            Some(path) => Self::new(JsonFileContent::new(path), config),
            None => Self::new(
                || -> Result<Forest, ContentError> {
                    Err(ContentError::unavailable("no content path configured"))
                },
                config,
            ),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn state(&self) -> IndexState {
        IndexState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Build the index if it has not been built yet
    ///
    /// Idempotent and safe to call concurrently: exactly one caller builds,
    /// the others wait for it and observe the finished index.
    pub fn ensure_ready(&self) -> IndexState {
        self.ready_index();
        self.state()
    }

    /// Read-only view of the built index
    pub fn index(&self) -> &GraphIndex {
        self.ready_index()
    }

    pub fn report(&self) -> &BuildReport {
        self.ready_index().report()
    }

    fn ready_index(&self) -> &GraphIndex {
        self.index.get_or_init(|| self.build_index())
    }

    fn build_index(&self) -> GraphIndex {
        self.state.store(STATE_BUILDING, Ordering::Release);
        tracing::debug!(
            "Building knowledge graph index from {}",
            self.source.describe()
        );

        match self.source.load() {
            Ok(forest) => {
                let index = GraphIndexBuilder::build_forest(&forest);
                self.state.store(STATE_READY, Ordering::Release);
                index
            }
            Err(e) => {
                tracing::error!(
                    "Failed to load curriculum from {}: {}; serving an empty graph",
                    self.source.describe(),
                    e
                );
                self.state.store(STATE_BUILD_FAILED, Ordering::Release);
                GraphIndex::empty()
            }
        }
    }

    //
    // LOOKUP
    //

    /// Node by id, or `None` for an unknown id
    pub fn get_node(&self, id: &str) -> Option<&KnowledgeNode> {
        self.ready_index().node(id)
    }

    pub fn get_title(&self, id: &str) -> Option<&str> {
        self.get_node(id).map(|node| node.title.as_str())
    }

    /// Topic payload, only if `id` names a topic
    pub fn get_topic(&self, id: &str) -> Option<&Arc<Topic>> {
        self.get_node(id).and_then(|node| node.data.as_topic())
    }

    pub fn get_pillar_id_for_topic(&self, topic_id: &str) -> Option<&str> {
        self.ready_index().pillar_id_for_topic(topic_id)
    }

    pub fn get_pillar_for_topic(&self, topic_id: &str) -> Option<&Arc<Pillar>> {
        let index = self.ready_index();
        index
            .pillar_id_for_topic(topic_id)
            .and_then(|pillar_id| index.node(pillar_id))
            .and_then(|node| node.data.as_pillar())
    }

    /// Direct children in curriculum order
    pub fn get_children(&self, id: &str) -> Vec<&KnowledgeNode> {
        self.ready_index().children(id).collect()
    }

    /// Resolve a topic's cross-links, dropping ids that are unknown or not topics
    pub fn get_related_topics(&self, topic_id: &str) -> Vec<&KnowledgeNode> {
        let index = self.ready_index();
        let Some(topic) = index.node(topic_id).and_then(|node| node.data.as_topic()) else {
            return Vec::new();
        };

        topic
            .related_topics
            .iter()
            .filter_map(|related_id| match index.node(related_id) {
                Some(node) if node.kind == NodeKind::Topic => Some(node),
                _ => {
                    tracing::debug!(
                        "Topic '{}' links to unknown topic '{}'",
                        topic_id,
                        related_id
                    );
                    None
                }
            })
            .collect()
    }

    /// A pillar's topics in curriculum order
    pub fn topics_in_pillar(&self, pillar_id: &str) -> Vec<&KnowledgeNode> {
        let index = self.ready_index();
        index
            .flat_topics()
            .filter(|topic| index.pillar_id_for_topic(&topic.id) == Some(pillar_id))
            .collect()
    }

    //
    // LINEAGE
    //

    /// Ancestor chain from the root pillar down to and including `id`
    ///
    /// Empty for an unknown id. The walk is bounded by
    /// `config.max_lineage_depth` and stops at the first repeated id, so a
    /// corrupted parent chain cannot loop.
    pub fn get_lineage(&self, id: &str) -> Vec<&KnowledgeNode> {
        let index = self.ready_index();
        let Some(mut current) = index.node(id) else {
            return Vec::new();
        };

        let mut lineage = Vec::with_capacity(self.config.max_lineage_depth);
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(current.id.as_str()) {
                tracing::warn!("Cycle in parent chain of '{}' at '{}'", id, current.id);
                break;
            }
            lineage.push(current);

            let Some(parent_id) = current.parent_id.as_deref() else {
                break;
            };

            if lineage.len() >= self.config.max_lineage_depth {
                tracing::warn!(
                    "Lineage of '{}' exceeds {} levels, truncating",
                    id,
                    self.config.max_lineage_depth
                );
                break;
            }

            match index.node(parent_id) {
                Some(parent) => current = parent,
                None => {
                    tracing::warn!("Node '{}' has unknown parent '{}'", current.id, parent_id);
                    break;
                }
            }
        }

        lineage.reverse();
        lineage
    }

    //
    // NAVIGATION
    //

    /// Previous and next topics in global curriculum order
    ///
    /// Crosses section and pillar boundaries. Both sides are `None` for an
    /// unknown id or an id that is not a topic.
    pub fn get_topic_navigation(&self, topic_id: &str) -> TopicNavigation<'_> {
        let index = self.ready_index();
        let Some(position) = index.flat_position(topic_id) else {
            return TopicNavigation::default();
        };

        TopicNavigation {
            prev: position
                .checked_sub(1)
                .and_then(|prev| index.flat_topic(prev)),
            next: index.flat_topic(position + 1),
        }
    }

    //
    // SEARCH
    //

    /// Case-insensitive substring search over titles (and pillar codes)
    ///
    /// The query is trimmed before matching, so `" tcp"` matches a title
    /// containing `"tcp"`. Results come in curriculum pre-order, unranked, and
    /// scanning stops as soon as `limit` matches are found. A blank query
    /// matches nothing.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&KnowledgeNode> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        self.ready_index()
            .search_candidates()
            .filter(|(_, key)| key.matches(&needle))
            .map(|(node, _)| node)
            .take(limit)
            .collect()
    }

    /// [`search`](Self::search) with the configured default limit
    pub fn search_default(&self, query: &str) -> Vec<&KnowledgeNode> {
        self.search(query, self.config.default_search_limit)
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "knowledge_graph_test.rs"]
mod knowledge_graph_test;
