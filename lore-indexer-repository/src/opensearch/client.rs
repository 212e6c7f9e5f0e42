//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesGetMappingParts, IndicesPutMappingParts},
    BulkParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::SearchIndexConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::mapping::Mapping;
use crate::opensearch::index_config::{get_index_settings, get_mapping_body, has_named_mapping};
use lore_indexer_shared::LearningResourceDocument;

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let config = SearchIndexConfig::new("haystack");
/// let client = OpenSearchClient::new("http://localhost:9200", config).await?;
///
/// if !client.index_exists().await? {
///     client.create_index().await?;
/// }
/// client.bulk_index(&documents).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    config: SearchIndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `config` - The target index, mapping name and batch limit
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub async fn new(url: &str, config: SearchIndexConfig) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %config.index_name,
            mapping = %config.mapping_name,
            "Created OpenSearch client"
        );

        Ok(Self { client, config })
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Build the NDJSON bulk body: one index action and one source per document.
    ///
    /// `_id` is a metadata field in OpenSearch, so it is moved from the
    /// document source into the action line.
    fn build_bulk_lines(documents: &[LearningResourceDocument]) -> Result<Vec<Value>, SearchError> {
        let mut body = Vec::with_capacity(documents.len() * 2);

        for doc in documents {
            let mut source = serde_json::to_value(doc)
                .map_err(|e| SearchError::serialization(e.to_string()))?;
            if let Some(fields) = source.as_object_mut() {
                fields.remove("_id");
            }

            body.push(json!({ "index": { "_id": doc.document_id() } }));
            body.push(source);
        }

        Ok(body)
    }

    /// Inspect a bulk response for item failures.
    ///
    /// Returns `Ok(())` when no item failed. When every failed item was
    /// rejected with 429 the whole batch is reported as retryable.
    fn check_bulk_response(response: &Value) -> Result<(), SearchError> {
        if !response["errors"].as_bool().unwrap_or(false) {
            return Ok(());
        }

        let failed: Vec<&Value> = response["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| &item["index"])
                    .filter(|action| action.get("error").is_some())
                    .collect()
            })
            .unwrap_or_default();

        if failed.is_empty() {
            return Err(SearchError::bulk_index(
                "Bulk response reported errors without failed items",
            ));
        }

        let first_reason = failed[0]["error"]["reason"]
            .as_str()
            .unwrap_or("unknown reason");
        let msg = format!(
            "{} documents failed, first error (id {}): {}",
            failed.len(),
            failed[0]["_id"].as_str().unwrap_or("?"),
            first_reason
        );

        if failed.iter().all(|action| action["status"].as_u64() == Some(429)) {
            Err(SearchError::unavailable(msg))
        } else {
            Err(SearchError::bulk_index(msg))
        }
    }

    /// Turn a non-success response into an error, reading its body for context.
    async fn error_from_response(
        response: Response,
        terminal: impl FnOnce(String) -> SearchError,
    ) -> SearchError {
        let status = response.status_code();
        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, "OpenSearch request failed");
        SearchError::from_status(status.as_u16(), &error_body, terminal)
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    async fn index_exists(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.config.index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(Self::error_from_response(response, SearchError::IndexCreationError).await),
        }
    }

    #[instrument(skip(self), fields(index = %self.config.index_name))]
    async fn create_index(&self) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.config.index_name))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(
                Self::error_from_response(response, SearchError::IndexCreationError).await,
            );
        }

        info!(index = %self.config.index_name, "Created index");
        Ok(())
    }

    #[instrument(skip(self), fields(index = %self.config.index_name))]
    async fn mapping_exists(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[self.config.index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(Self::error_from_response(response, SearchError::MappingError).await);
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(has_named_mapping(&body, &self.config.mapping_name))
    }

    #[instrument(skip(self, mapping), fields(index = %self.config.index_name, fields = mapping.len()))]
    async fn put_mapping(&self, mapping: &Mapping) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[self.config.index_name.as_str()]))
            .body(get_mapping_body(mapping))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(Self::error_from_response(response, SearchError::MappingError).await);
        }

        info!(mapping = %mapping.name(), "Created mapping");
        Ok(())
    }

    async fn bulk_index(&self, documents: &[LearningResourceDocument]) -> Result<(), SearchError> {
        if documents.is_empty() {
            return Ok(());
        }
        self.validate_batch_size(documents.len())?;

        let body: Vec<JsonBody<Value>> = Self::build_bulk_lines(documents)?
            .into_iter()
            .map(Into::into)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(&self.config.index_name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(Self::error_from_response(response, SearchError::BulkIndexError).await);
        }

        let response_body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Self::check_bulk_response(&response_body)?;

        debug!(count = documents.len(), "Bulk indexed documents");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(matches!(body["status"].as_str(), Some("green") | Some("yellow")))
    }
}
