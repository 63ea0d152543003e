//! Guide Service
//!
//! Connects topics in the knowledge graph to generated study guides:
//!
//! 1. Resolve the topic through [`KnowledgeGraphService`]
//! 2. Return the stored guide if one exists
//! 3. Otherwise ask the [`GuideGenerator`] for one and persist it
//!
//! The generator is opaque: it receives the topic's identifying fields and
//! breadcrumb and returns prose plus source URLs. How it produces them is not
//! this crate's concern.

use crate::db::GuideStore;
use crate::models::{GeneratedGuide, GuideRequest, StoredGuide};
use crate::services::error::GuideServiceError;
use crate::services::knowledge_graph::KnowledgeGraphService;
use async_trait::async_trait;
use std::sync::Arc;

/// Produces guide content for a topic
#[async_trait]
pub trait GuideGenerator: Send + Sync {
    async fn generate(&self, request: GuideRequest) -> anyhow::Result<GeneratedGuide>;
}

pub struct GuideService {
    graph: Arc<KnowledgeGraphService>,
    generator: Arc<dyn GuideGenerator>,
    store: Arc<dyn GuideStore>,
}

impl GuideService {
    pub fn new(
        graph: Arc<KnowledgeGraphService>,
        generator: Arc<dyn GuideGenerator>,
        store: Arc<dyn GuideStore>,
    ) -> Self {
        Self {
            graph,
            generator,
            store,
        }
    }

    pub fn graph(&self) -> &Arc<KnowledgeGraphService> {
        &self.graph
    }

    /// Build the generator request for a topic
    pub fn request_for(&self, topic_id: &str) -> Result<GuideRequest, GuideServiceError> {
        let topic = self
            .graph
            .get_topic(topic_id)
            .ok_or_else(|| GuideServiceError::topic_not_found(topic_id))?;

        let breadcrumb = self
            .graph
            .get_lineage(topic_id)
            .into_iter()
            .map(|node| node.title.clone())
            .collect();

        Ok(GuideRequest {
            topic_id: topic.id.clone(),
            title: topic.title.clone(),
            description: topic.description.clone(),
            content_points: topic.content_points.clone(),
            breadcrumb,
        })
    }

    /// Stored guide for a topic, without generating
    pub async fn get_guide(&self, topic_id: &str) -> Result<Option<StoredGuide>, GuideServiceError> {
        Ok(self.store.get(topic_id).await?)
    }

    /// Stored guide for a topic, generating and persisting one if missing
    pub async fn get_or_generate(&self, topic_id: &str) -> Result<StoredGuide, GuideServiceError> {
        let request = self.request_for(topic_id)?;

        if let Some(existing) = self.store.get(topic_id).await? {
            tracing::debug!("Serving stored guide for topic '{}'", topic_id);
            return Ok(existing);
        }

        self.generate_and_store(request).await
    }

    /// Generate a fresh guide and overwrite any stored one
    pub async fn regenerate(&self, topic_id: &str) -> Result<StoredGuide, GuideServiceError> {
        let request = self.request_for(topic_id)?;
        self.generate_and_store(request).await
    }

    async fn generate_and_store(
        &self,
        request: GuideRequest,
    ) -> Result<StoredGuide, GuideServiceError> {
        let topic_id = request.topic_id.clone();
        tracing::info!("Generating guide for topic '{}'", topic_id);

        let generated = self
            .generator
            .generate(request)
            .await
            .map_err(|e| GuideServiceError::generation_failed(&topic_id, e))?;

        let stored = StoredGuide::from_generated(&topic_id, generated);
        self.store.put(stored.clone()).await?;

        tracing::info!(
            "Stored guide for topic '{}' ({} sources)",
            topic_id,
            stored.sources.len()
        );
        Ok(stored)
    }
}
