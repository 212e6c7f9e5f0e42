//! Dependency initialization and wiring for the indexer.

use std::sync::Arc;
use tracing::info;

use super::Config;
use crate::IndexingError;
use lore_indexer_pipeline::checkpoint::CheckpointStore;
use lore_indexer_pipeline::orchestrator::{Orchestrator, OrchestratorConfig};
use lore_indexer_pipeline::retry::RetryPolicy;
use lore_indexer_repository::{OpenSearchClient, SearchEngineClient, SearchIndexConfig};
use lore_indexer_source::{LoreSource, PostgresSource};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Connect to the database and the search engine and wire the pipeline.
    ///
    /// Both connections are verified before any work starts.
    pub async fn new(config: &Config) -> Result<Self, IndexingError> {
        info!(
            haystack_url = %config.haystack_url,
            haystack_index = %config.haystack_index,
            page_size = config.page_size,
            max_retries = config.max_retries,
            "Initializing dependencies"
        );

        // Initialize the relational source
        let source = PostgresSource::connect(&config.database_url).await?;
        source.health_check().await?;

        info!("Database connection verified");

        // Initialize OpenSearch client; one page is one bulk request
        let index_config = SearchIndexConfig::new(&config.haystack_index)
            .with_max_batch_size(config.page_size);
        let search_client = OpenSearchClient::new(&config.haystack_url, index_config).await?;

        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("Search engine health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("Search engine cluster is unhealthy"));
        }

        info!("Search engine connection verified");

        let orchestrator_config = OrchestratorConfig {
            page_size: config.page_size,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                ..RetryPolicy::default()
            },
            ..OrchestratorConfig::default()
        };

        let source: Arc<dyn LoreSource> = Arc::new(source);
        let client: Arc<dyn SearchEngineClient> = Arc::new(search_client);
        let mut orchestrator = Orchestrator::with_config(source, client, orchestrator_config);

        if let Some(path) = &config.checkpoint_path {
            info!(path = %path.display(), "Resume checkpoints enabled");
            orchestrator = orchestrator.with_checkpoints(CheckpointStore::new(path.clone()));
        }

        Ok(Self { orchestrator })
    }
}
