//! Data Models
//!
//! This module contains the data structures used throughout Syllabus:
//!
//! - `Pillar`, `Section`, `SubSection`, `Topic` - The authored curriculum tree
//! - `KnowledgeNode` - Uniform index-time wrapper around any tree node
//! - `GuideRequest`, `GeneratedGuide`, `StoredGuide` - Generated topic guides

mod curriculum;
mod guide;
mod knowledge_node;

pub use curriculum::{Forest, Pillar, Section, SubSection, Topic};
pub(crate) use curriculum::{entry_label, json_type_name};
pub use guide::{GeneratedGuide, GuideRequest, StoredGuide};
pub use knowledge_node::{KnowledgeNode, NodeKind, NodePayload, TopicNavigation};
