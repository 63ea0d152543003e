//! Guide Store Abstraction
//!
//! All methods are async so that network-backed stores fit behind the same
//! trait as local ones.
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`; stores are shared as
//! `Arc<dyn GuideStore>` across tasks.

use crate::db::error::GuideStoreError;
use crate::models::StoredGuide;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persisted generated guides, keyed by topic id
#[async_trait]
pub trait GuideStore: Send + Sync {
    /// Guide for a topic, or `None` if none has been stored
    async fn get(&self, topic_id: &str) -> Result<Option<StoredGuide>, GuideStoreError>;

    /// Insert or replace the guide for `guide.topic_id`
    async fn put(&self, guide: StoredGuide) -> Result<(), GuideStoreError>;

    /// Remove a topic's guide; returns whether one existed
    async fn delete(&self, topic_id: &str) -> Result<bool, GuideStoreError>;

    /// Ids of all topics with a stored guide, sorted
    async fn list_topic_ids(&self) -> Result<Vec<String>, GuideStoreError>;
}

/// Process-local guide store
#[derive(Debug, Clone, Default)]
pub struct InMemoryGuideStore {
    guides: Arc<RwLock<HashMap<String, StoredGuide>>>,
}

impl InMemoryGuideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guides(guides: impl IntoIterator<Item = StoredGuide>) -> Self {
        let guides = guides
            .into_iter()
            .map(|guide| (guide.topic_id.clone(), guide))
            .collect();
        Self {
            guides: Arc::new(RwLock::new(guides)),
        }
    }

    pub async fn len(&self) -> usize {
        self.guides.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.guides.read().await.is_empty()
    }
}

#[async_trait]
impl GuideStore for InMemoryGuideStore {
    async fn get(&self, topic_id: &str) -> Result<Option<StoredGuide>, GuideStoreError> {
        Ok(self.guides.read().await.get(topic_id).cloned())
    }

    async fn put(&self, guide: StoredGuide) -> Result<(), GuideStoreError> {
        if guide.topic_id.trim().is_empty() {
            return Err(GuideStoreError::invalid_key(guide.topic_id));
        }
        self.guides
            .write()
            .await
            .insert(guide.topic_id.clone(), guide);
        Ok(())
    }

    async fn delete(&self, topic_id: &str) -> Result<bool, GuideStoreError> {
        Ok(self.guides.write().await.remove(topic_id).is_some())
    }

    async fn list_topic_ids(&self) -> Result<Vec<String>, GuideStoreError> {
        let mut ids: Vec<String> = self.guides.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
