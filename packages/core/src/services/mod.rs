//! Business Services
//!
//! This module contains the core services:
//!
//! - `GraphIndexBuilder` - One-time flattening of the curriculum tree
//! - `KnowledgeGraphService` - Lookup, lineage, navigation and search
//! - `GuideService` - Generated guide retrieval and persistence per topic
//!
//! Services are constructed once at startup and shared behind `Arc`.

pub mod error;
pub mod graph_index;
pub mod guide_service;
pub mod knowledge_graph;

pub use error::GuideServiceError;
pub use graph_index::{BuildReport, GraphIndex, GraphIndexBuilder, PATH_SEPARATOR};
pub use guide_service::{GuideGenerator, GuideService};
pub use knowledge_graph::{IndexState, KnowledgeGraphService};
