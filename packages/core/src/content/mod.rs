//! Curriculum Content Sources
//!
//! The knowledge graph is built from a forest supplied by a [`ContentSource`].
//! Sources range from an already-loaded forest (eager startup) to a JSON file
//! read on first use.

pub mod error;
pub mod source;

pub use error::ContentError;
pub use source::{
    parse_forest, parse_forest_str, ContentSource, JsonFileContent, JsonValueContent,
    StaticContent,
};
