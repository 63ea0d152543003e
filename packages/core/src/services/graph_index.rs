//! Graph Index Construction
//!
//! Flattens the curriculum forest into structures that answer every graph
//! query from memory:
//!
//! - **Node table**: all nodes in pre-order (pillar → section → sub-section →
//!   topic) plus an `id → position` map for O(1) lookup
//! - **Pillar shortcut**: `topic id → pillar id`, restricted to topics
//! - **Flat topics**: every topic in encounter order, defining linear
//!   prev/next navigation across the whole curriculum, with a parallel
//!   `topic id → flat position` map
//! - **Search keys**: lowercased title (and pillar code) per node
//!
//! # Invariants
//!
//! - Every id maps to exactly one node. A repeated id replaces the earlier
//!   node in place (last write wins) and is recorded in the [`BuildReport`].
//! - `flat_topics` holds exactly the topic nodes of the node table, in node
//!   table order.
//! - `pillar_id_for_topic(t) == node(t).root_id` for every topic.
//! - Building the same forest twice yields equal indexes.
//!
//! The index is immutable once built.

use crate::models::{
    Forest, KnowledgeNode, NodeKind, NodePayload, Pillar, Section, SubSection, Topic,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Separator between titles in a node's breadcrumb `path`
pub const PATH_SEPARATOR: &str = " > ";

/// Outcome of a build, kept alongside the index for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub pillars: usize,
    pub sections: usize,
    pub sub_sections: usize,
    pub topics: usize,

    /// Ids that appeared more than once (each listed once, first-seen order)
    pub duplicate_ids: Vec<String>,

    /// Nodes skipped because their id was blank, as breadcrumb paths
    pub skipped_blank_ids: Vec<String>,
}

impl BuildReport {
    /// Distinct nodes in the index
    pub fn total_nodes(&self) -> usize {
        self.pillars + self.sections + self.sub_sections + self.topics
    }

    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty() && self.skipped_blank_ids.is_empty()
    }
}

/// Pre-lowercased match keys for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchKey {
    pub title: String,
    pub code: Option<String>,
}

impl SearchKey {
    fn for_node(node: &KnowledgeNode) -> Self {
        let code = node
            .data
            .as_pillar()
            .map(|p| p.code.trim().to_lowercase())
            .filter(|c| !c.is_empty());
        Self {
            title: node.title.to_lowercase(),
            code,
        }
    }

    pub fn matches(&self, needle: &str) -> bool {
        self.title.contains(needle)
            || self.code.as_deref().is_some_and(|code| code.contains(needle))
    }
}

/// Immutable, fully-built knowledge graph index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphIndex {
    nodes: Vec<KnowledgeNode>,
    search_keys: Vec<SearchKey>,
    position_by_id: HashMap<String, usize>,
    children_by_id: HashMap<String, Vec<usize>>,
    pillar_id_by_topic_id: HashMap<String, String>,
    flat_topics: Vec<usize>,
    flat_position_by_topic_id: HashMap<String, usize>,
    report: BuildReport,
}

impl GraphIndex {
    /// The index of an absent or unusable curriculum
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// O(1) lookup by id
    pub fn node(&self, id: &str) -> Option<&KnowledgeNode> {
        self.position_by_id.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position_by_id.contains_key(id)
    }

    /// All nodes in pre-order
    pub fn nodes(&self) -> impl Iterator<Item = &KnowledgeNode> + '_ {
        self.nodes.iter()
    }

    /// Direct children of a node, in curriculum order
    pub fn children(&self, id: &str) -> impl Iterator<Item = &KnowledgeNode> + '_ {
        self.children_by_id
            .get(id)
            .into_iter()
            .flatten()
            .map(|&pos| &self.nodes[pos])
    }

    pub fn pillar_id_for_topic(&self, topic_id: &str) -> Option<&str> {
        self.pillar_id_by_topic_id.get(topic_id).map(String::as_str)
    }

    pub fn topic_count(&self) -> usize {
        self.flat_topics.len()
    }

    /// Every topic in curriculum encounter order
    pub fn flat_topics(&self) -> impl Iterator<Item = &KnowledgeNode> + '_ {
        self.flat_topics.iter().map(|&pos| &self.nodes[pos])
    }

    /// Topic at a position in `flat_topics`
    pub fn flat_topic(&self, position: usize) -> Option<&KnowledgeNode> {
        self.flat_topics.get(position).map(|&pos| &self.nodes[pos])
    }

    /// Position of a topic in `flat_topics`
    pub fn flat_position(&self, topic_id: &str) -> Option<usize> {
        self.flat_position_by_topic_id.get(topic_id).copied()
    }

    /// Nodes paired with their search keys, in pre-order
    pub(crate) fn search_candidates(
        &self,
    ) -> impl Iterator<Item = (&KnowledgeNode, &SearchKey)> + '_ {
        self.nodes.iter().zip(self.search_keys.iter())
    }
}

/// Walks a curriculum forest once and produces a [`GraphIndex`]
#[derive(Debug, Default)]
pub struct GraphIndexBuilder {
    nodes: Vec<KnowledgeNode>,
    position_by_id: HashMap<String, usize>,
    duplicate_ids: Vec<String>,
    skipped_blank_ids: Vec<String>,
}

impl GraphIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a forest; `None` yields the empty index
    pub fn build(forest: Option<&[Arc<Pillar>]>) -> GraphIndex {
        let Some(forest) = forest else {
            tracing::debug!("No curriculum forest supplied, building empty index");
            return GraphIndex::empty();
        };

        let mut builder = Self::new();
        for pillar in forest {
            builder.visit_pillar(pillar);
        }
        builder.finish()
    }

    /// Build an index from raw JSON
    ///
    /// A value that is not a sequence of pillars yields the empty index
    /// instead of an error.
    pub fn build_from_value(value: &Value) -> GraphIndex {
        match crate::content::parse_forest(value) {
            Ok(forest) => Self::build(Some(forest.as_slice())),
            Err(e) => {
                tracing::warn!("Curriculum value unusable, building empty index: {}", e);
                GraphIndex::empty()
            }
        }
    }

    /// Convenience over [`GraphIndexBuilder::build`] for an owned forest
    pub fn build_forest(forest: &Forest) -> GraphIndex {
        Self::build(Some(forest.as_slice()))
    }

    fn visit_pillar(&mut self, pillar: &Arc<Pillar>) {
        let path = pillar.title.clone();
        if self.skip_blank(&pillar.id, &path) {
            return;
        }

        let node = KnowledgeNode::new(
            NodePayload::Pillar(Arc::clone(pillar)),
            None,
            pillar.id.clone(),
            path.clone(),
        );
        self.insert(node);

        for section in &pillar.sections {
            self.visit_section(section, &pillar.id, &path);
        }
    }

    fn visit_section(&mut self, section: &Arc<Section>, root_id: &str, parent_path: &str) {
        let path = join_path(parent_path, &section.title);
        if self.skip_blank(&section.id, &path) {
            return;
        }

        // Parent is the pillar, which is also the root
        let node = KnowledgeNode::new(
            NodePayload::Section(Arc::clone(section)),
            Some(root_id.to_string()),
            root_id,
            path.clone(),
        );
        self.insert(node);

        for sub in &section.sub_sections {
            self.visit_sub_section(sub, &section.id, root_id, &path);
        }
    }

    fn visit_sub_section(
        &mut self,
        sub: &Arc<SubSection>,
        parent_id: &str,
        root_id: &str,
        parent_path: &str,
    ) {
        let path = join_path(parent_path, &sub.title);
        if self.skip_blank(&sub.id, &path) {
            return;
        }

        let node = KnowledgeNode::new(
            NodePayload::SubSection(Arc::clone(sub)),
            Some(parent_id.to_string()),
            root_id,
            path.clone(),
        );
        self.insert(node);

        for topic in &sub.topics {
            self.visit_topic(topic, &sub.id, root_id, &path);
        }
    }

    fn visit_topic(&mut self, topic: &Arc<Topic>, parent_id: &str, root_id: &str, parent_path: &str) {
        let path = join_path(parent_path, &topic.title);
        if self.skip_blank(&topic.id, &path) {
            return;
        }

        let node = KnowledgeNode::new(
            NodePayload::Topic(Arc::clone(topic)),
            Some(parent_id.to_string()),
            root_id,
            path,
        );
        self.insert(node);
    }

    fn skip_blank(&mut self, id: &str, path: &str) -> bool {
        if !id.trim().is_empty() {
            return false;
        }
        tracing::warn!("Skipping curriculum node with blank id at '{}' (and its subtree)", path);
        self.skipped_blank_ids.push(path.to_string());
        true
    }

    fn insert(&mut self, node: KnowledgeNode) {
        match self.position_by_id.get(&node.id) {
            Some(&pos) => {
                let previous = &self.nodes[pos];
                tracing::warn!(
                    "Duplicate curriculum id '{}': {} at '{}' replaces {} at '{}'",
                    node.id,
                    node.kind,
                    node.path,
                    previous.kind,
                    previous.path
                );
                if !self.duplicate_ids.contains(&node.id) {
                    self.duplicate_ids.push(node.id.clone());
                }
                self.nodes[pos] = node;
            }
            None => {
                self.position_by_id.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Derive the secondary structures from the final node table
    ///
    /// Runs after the walk, so `flat_topics` and the pillar shortcut only see
    /// nodes that survived duplicate replacement.
    fn finish(self) -> GraphIndex {
        let Self {
            nodes,
            position_by_id,
            duplicate_ids,
            skipped_blank_ids,
        } = self;

        let mut report = BuildReport {
            duplicate_ids,
            skipped_blank_ids,
            ..BuildReport::default()
        };

        let mut children_by_id: HashMap<String, Vec<usize>> = HashMap::new();
        let mut pillar_id_by_topic_id = HashMap::new();
        let mut flat_topics = Vec::new();
        let mut flat_position_by_topic_id = HashMap::new();

        for (pos, node) in nodes.iter().enumerate() {
            match node.kind {
                NodeKind::Pillar => report.pillars += 1,
                NodeKind::Section => report.sections += 1,
                NodeKind::SubSection => report.sub_sections += 1,
                NodeKind::Topic => {
                    report.topics += 1;
                    flat_position_by_topic_id.insert(node.id.clone(), flat_topics.len());
                    flat_topics.push(pos);
                    pillar_id_by_topic_id.insert(node.id.clone(), node.root_id.clone());
                }
            }

            if let Some(parent_id) = &node.parent_id {
                children_by_id.entry(parent_id.clone()).or_default().push(pos);
            }
        }

        let search_keys = nodes.iter().map(SearchKey::for_node).collect();

        tracing::info!(
            "Knowledge graph index built: {} nodes ({} pillars, {} sections, {} sub-sections, {} topics)",
            nodes.len(),
            report.pillars,
            report.sections,
            report.sub_sections,
            report.topics
        );
        if !report.is_clean() {
            tracing::warn!(
                "Curriculum data issues: {} duplicate ids, {} blank ids skipped",
                report.duplicate_ids.len(),
                report.skipped_blank_ids.len()
            );
        }

        GraphIndex {
            nodes,
            search_keys,
            position_by_id,
            children_by_id,
            pillar_id_by_topic_id,
            flat_topics,
            flat_position_by_topic_id,
            report,
        }
    }
}

fn join_path(parent: &str, title: &str) -> String {
    format!("{}{}{}", parent, PATH_SEPARATOR, title)
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "graph_index_test.rs"]
mod graph_index_test;
