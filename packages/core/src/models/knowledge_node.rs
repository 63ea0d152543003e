//! Knowledge Node
//!
//! `KnowledgeNode` is the uniform wrapper the index builds around every
//! curriculum node, whatever level it came from. Cross-cutting queries
//! (lookup, lineage, navigation, search) work on this one shape.
//!
//! The level-specific payload is carried by [`NodePayload`], a sum type with
//! one variant per tree level. Callers pattern-match on it instead of casting:
//!
//! ```rust
//! use syllabus_core::models::{KnowledgeNode, NodePayload};
//!
//! fn accent_color(node: &KnowledgeNode) -> Option<&str> {
//!     match &node.data {
//!         NodePayload::Pillar(pillar) => pillar.color.as_deref(),
//!         _ => None,
//!     }
//! }
//! ```

use crate::models::curriculum::{Pillar, Section, SubSection, Topic};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which tree level a node came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    Pillar,
    Section,
    SubSection,
    Topic,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pillar => write!(f, "PILLAR"),
            Self::Section => write!(f, "SECTION"),
            Self::SubSection => write!(f, "SUBSECTION"),
            Self::Topic => write!(f, "TOPIC"),
        }
    }
}

/// The original source node, shared with the forest it was indexed from
///
/// Payloads are reference-counted, so cloning a node never deep-copies a
/// subtree. Treat them as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "UPPERCASE")]
pub enum NodePayload {
    Pillar(Arc<Pillar>),
    Section(Arc<Section>),
    SubSection(Arc<SubSection>),
    Topic(Arc<Topic>),
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Pillar(_) => NodeKind::Pillar,
            Self::Section(_) => NodeKind::Section,
            Self::SubSection(_) => NodeKind::SubSection,
            Self::Topic(_) => NodeKind::Topic,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Pillar(p) => &p.id,
            Self::Section(s) => &s.id,
            Self::SubSection(s) => &s.id,
            Self::Topic(t) => &t.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Pillar(p) => &p.title,
            Self::Section(s) => &s.title,
            Self::SubSection(s) => &s.title,
            Self::Topic(t) => &t.title,
        }
    }

    pub fn as_pillar(&self) -> Option<&Arc<Pillar>> {
        match self {
            Self::Pillar(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_topic(&self) -> Option<&Arc<Topic>> {
        match self {
            Self::Topic(t) => Some(t),
            _ => None,
        }
    }
}

/// Uniform index-time wrapper around any curriculum node
///
/// # Fields
///
/// - `id`: Unique identifier copied from the source node
/// - `kind`: Tree level the node came from
/// - `title`: Display title copied from the source node
/// - `data`: The original source payload
/// - `parent_id`: Immediate parent's id (`None` only for pillars)
/// - `root_id`: Id of the owning pillar (a pillar's own id for pillars)
/// - `path`: Human-readable breadcrumb, informational only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeNode {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    pub data: NodePayload,
    pub parent_id: Option<String>,
    pub root_id: String,
    pub path: String,
}

impl KnowledgeNode {
    /// Wrap a source payload, copying its id and title
    pub fn new(
        data: NodePayload,
        parent_id: Option<String>,
        root_id: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: data.id().to_string(),
            kind: data.kind(),
            title: data.title().to_string(),
            data,
            parent_id,
            root_id: root_id.into(),
            path: path.into(),
        }
    }

    pub fn is_topic(&self) -> bool {
        self.kind == NodeKind::Topic
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Linear prev/next neighbours of a topic in curriculum order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TopicNavigation<'a> {
    pub prev: Option<&'a KnowledgeNode>,
    pub next: Option<&'a KnowledgeNode>,
}
