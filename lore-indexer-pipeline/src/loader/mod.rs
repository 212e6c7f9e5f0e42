//! Loader module for the search indexer pipeline.
//!
//! Provisions the index mapping and loads built documents into the search index.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use lore_indexer_repository::{Mapping, SearchEngineClient};
use lore_indexer_shared::LearningResourceDocument;

/// What `ensure_schema` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// The index did not exist; it was created and the mapping submitted.
    Created,
    /// The index existed without the mapping; the mapping was submitted.
    MappingAdded,
    /// Index and mapping were already present; nothing was written.
    Unchanged,
}

/// Loader that indexes documents into the search engine.
///
/// Each page is written as a single bulk request. Transient failures are
/// retried according to the retry policy; terminal ones are returned.
pub struct SearchLoader {
    client: Arc<dyn SearchEngineClient>,
    retry: RetryPolicy,
}

impl SearchLoader {
    /// Create a new search loader with the default retry policy.
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self::with_retry(client, RetryPolicy::default())
    }

    /// Create a new search loader with a custom retry policy.
    pub fn with_retry(client: Arc<dyn SearchEngineClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Index a page of documents in one bulk request.
    ///
    /// Documents are upserted by id, so loading the same page twice leaves
    /// the index unchanged. Returns the number of documents written.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn load(&self, documents: &[LearningResourceDocument]) -> Result<usize, PipelineError> {
        if documents.is_empty() {
            return Ok(0);
        }

        self.retry
            .run("bulk_index", || self.client.bulk_index(documents))
            .await?;

        debug!(count = documents.len(), "Indexed documents");
        Ok(documents.len())
    }

    /// Make sure the index and the mapping exist.
    ///
    /// An existing mapping is never compared or updated.
    #[instrument(skip(self, mapping), fields(mapping = mapping.name(), fields = mapping.len()))]
    pub async fn ensure_schema(&self, mapping: &Mapping) -> Result<SchemaStatus, PipelineError> {
        let mut status = SchemaStatus::Unchanged;

        if !self
            .retry
            .run("index_exists", || self.client.index_exists())
            .await?
        {
            info!("Creating search index");
            self.retry
                .run("create_index", || self.client.create_index())
                .await?;
            status = SchemaStatus::Created;
        }

        if !self
            .retry
            .run("mapping_exists", || self.client.mapping_exists())
            .await?
        {
            info!("Submitting mapping");
            self.retry
                .run("put_mapping", || self.client.put_mapping(mapping))
                .await?;
            if status == SchemaStatus::Unchanged {
                status = SchemaStatus::MappingAdded;
            }
        }

        debug!(?status, "Schema ready");
        Ok(status)
    }

    /// Check if the search engine is healthy.
    pub async fn health_check(&self) -> Result<bool, PipelineError> {
        Ok(self.client.health_check().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemorySearchEngine;
    use lore_indexer_repository::{build_mapping, SearchError};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn document(id: i64, title: &str) -> LearningResourceDocument {
        LearningResourceDocument {
            id,
            doc_id: id,
            course: "8.01".to_string(),
            run: "2015_Fall".to_string(),
            repository: "physics".to_string(),
            resource_type: "problem".to_string(),
            title: title.to_string(),
            description: String::new(),
            description_path: String::new(),
            content_xml: String::new(),
            xa_nr_views: 0,
            xa_nr_attempts: 0,
            xa_avg_grade: 0.0,
            preview_url: String::new(),
            content_stripped: String::new(),
            titlesort: format!("0{}", title),
            vocabularies: BTreeMap::new(),
        }
    }

    fn fast_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_retry_delay_ms: 1,
            max_retry_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_reindexing_overwrites_by_id() {
        let client = Arc::new(InMemorySearchEngine::default());
        let loader = SearchLoader::new(client.clone());

        loader.load(&[document(1, "Old"), document(2, "Other")]).await.unwrap();
        let written = loader.load(&[document(1, "New")]).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(client.document_count(), 2);
        assert_eq!(client.document("1").unwrap().title, "New");
    }

    #[tokio::test]
    async fn test_empty_page_skips_request() {
        let client = Arc::new(InMemorySearchEngine::default());
        let loader = SearchLoader::new(client.clone());

        assert_eq!(loader.load(&[]).await.unwrap(), 0);
        assert_eq!(client.bulk_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transient_bulk_failures_are_retried() {
        let client = Arc::new(InMemorySearchEngine::default());
        client.fail_next_bulk(SearchError::unavailable("429 Too Many Requests"));
        client.fail_next_bulk(SearchError::connection("connection reset"));
        let loader = SearchLoader::with_retry(client.clone(), fast_retry(3));

        loader.load(&[document(1, "A")]).await.unwrap();

        assert_eq!(client.bulk_calls.load(Ordering::SeqCst), 3);
        assert_eq!(client.document_count(), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let client = Arc::new(InMemorySearchEngine::default());
        for _ in 0..3 {
            client.fail_next_bulk(SearchError::unavailable("503"));
        }
        let loader = SearchLoader::with_retry(client.clone(), fast_retry(2));

        let result = loader.load(&[document(1, "A")]).await;

        assert!(matches!(
            result,
            Err(PipelineError::SearchError(SearchError::UnavailableError(_)))
        ));
        assert_eq!(client.bulk_calls.load(Ordering::SeqCst), 3);
        assert_eq!(client.document_count(), 0);
    }

    #[tokio::test]
    async fn test_terminal_bulk_failure_is_not_retried() {
        let client = Arc::new(InMemorySearchEngine::default());
        client.fail_next_bulk(SearchError::bulk_index("mapper_parsing_exception"));
        let loader = SearchLoader::with_retry(client.clone(), fast_retry(3));

        let result = loader.load(&[document(1, "A")]).await;

        assert!(result.is_err());
        assert!(!result.unwrap_err().is_retryable());
        assert_eq!(client.bulk_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_schema_is_provisioned_once() {
        let client = Arc::new(InMemorySearchEngine::default());
        let loader = SearchLoader::new(client.clone());
        let mapping = build_mapping("learningresource", &["Subject"]);

        assert_eq!(loader.ensure_schema(&mapping).await.unwrap(), SchemaStatus::Created);
        let writes = client.writes();
        assert_eq!(writes, 2);

        assert_eq!(loader.ensure_schema(&mapping).await.unwrap(), SchemaStatus::Unchanged);
        assert_eq!(client.writes(), writes);
        assert_eq!(client.mapping.lock().unwrap().as_ref(), Some(&mapping));
    }

    #[tokio::test]
    async fn test_existing_index_gets_mapping_only() {
        let client = Arc::new(InMemorySearchEngine {
            index_exists: AtomicBool::new(true),
            ..InMemorySearchEngine::default()
        });
        let loader = SearchLoader::new(client.clone());
        let mapping = build_mapping::<&str>("learningresource", &[]);

        let status = loader.ensure_schema(&mapping).await.unwrap();

        assert_eq!(status, SchemaStatus::MappingAdded);
        assert_eq!(client.create_index_calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.put_mapping_calls.load(Ordering::SeqCst), 1);
    }
}
