//! Syllabus Core Knowledge Graph
//!
//! This crate indexes the Syllabus curriculum (pillars → sections →
//! sub-sections → topics) into an in-memory knowledge graph and answers the
//! queries the UI is built on: node lookup, breadcrumb lineage, linear
//! prev/next topic navigation and title search.
//!
//! # Architecture
//!
//! - **Build once, read forever**: the tree is walked a single time into flat
//!   maps; queries never traverse the source tree again
//! - **Fail open**: missing or malformed content degrades to fewer (or no)
//!   results, never to an error at query time
//! - **Typed payloads**: every node carries its original pillar, section,
//!   sub-section or topic as a variant of [`NodePayload`]
//! - **Explicit wiring**: services are constructed at startup and shared as
//!   `Arc`, there is no global instance
//!
//! # Modules
//!
//! - [`models`] - Curriculum tree, knowledge nodes, guide records
//! - [`content`] - Sources the curriculum forest is loaded from
//! - [`services`] - Index builder, knowledge graph service, guide service
//! - [`db`] - Guide persistence
//! - [`config`] - Service configuration

pub mod config;
pub mod content;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::GraphConfig;
pub use models::*;
pub use services::*;
