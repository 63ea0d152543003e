//! Guide Persistence Layer
//!
//! Generated topic guides are persisted through the [`GuideStore`] trait,
//! keyed by topic id. The knowledge graph never touches the store; callers
//! (and [`crate::services::GuideService`]) read and write it.
//!
//! Two implementations ship with the crate:
//!
//! - [`InMemoryGuideStore`] - process-local map, used by tests and previews
//! - [`JsonDirGuideStore`] - one JSON document per topic in a directory

mod error;
mod file_guide_store;
mod guide_store;

pub use error::GuideStoreError;
pub use file_guide_store::JsonDirGuideStore;
pub use guide_store::{GuideStore, InMemoryGuideStore};
