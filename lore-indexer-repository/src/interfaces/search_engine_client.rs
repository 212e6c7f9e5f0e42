//! Search engine client trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (OpenSearch, in-memory mocks, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::mapping::Mapping;
use lore_indexer_shared::LearningResourceDocument;

/// Abstract interface for search engine operations.
///
/// Implementations are bound to one target index at construction time, so
/// none of the operations take an index name.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>`. Callers use
/// [`SearchError::is_retryable`] to decide whether to retry.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Check whether the target index exists.
    async fn index_exists(&self) -> Result<bool, SearchError>;

    /// Create the target index with its settings and no field mapping.
    async fn create_index(&self) -> Result<(), SearchError>;

    /// Check whether the learning resource mapping has been provisioned.
    async fn mapping_exists(&self) -> Result<bool, SearchError>;

    /// Submit the field mapping.
    ///
    /// # Arguments
    ///
    /// * `mapping` - The mapping built from the field role table and vocabulary names
    async fn put_mapping(&self, mapping: &Mapping) -> Result<(), SearchError>;

    /// Upsert multiple documents in a single bulk operation.
    ///
    /// Each document is written under its [`LearningResourceDocument::document_id`],
    /// replacing any previous version.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If all documents were indexed successfully
    /// * `Err(SearchError::BulkIndexError)` - If any document failed to index
    async fn bulk_index(&self, documents: &[LearningResourceDocument]) -> Result<(), SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
