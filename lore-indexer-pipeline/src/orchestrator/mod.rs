//! Orchestrator module for the search indexer pipeline.
//!
//! Coordinates the taxonomy, fetcher, processor, and loader components.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::checkpoint::{Checkpoint, CheckpointStore, CoursePosition};
use crate::errors::PipelineError;
use crate::fetcher::{ResourceFetcher, DEFAULT_PAGE_SIZE};
use crate::loader::SearchLoader;
use crate::processor::{DocumentBuilder, TermAnnotator};
use crate::retry::RetryPolicy;
use crate::taxonomy::TaxonomyResolver;
use lore_indexer_repository::config::MAPPING_NAME;
use lore_indexer_repository::{build_mapping, SearchEngineClient};
use lore_indexer_shared::{Course, Repository, ResourceId, ResourceTypes};
use lore_indexer_source::LoreSource;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Resources per page and documents per bulk request.
    pub page_size: usize,
    /// Name recorded in the mapping metadata.
    pub mapping_name: String,
    /// Retry policy for source reads and search engine writes.
    pub retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            mapping_name: MAPPING_NAME.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Counts for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub repositories: usize,
    pub courses: usize,
    pub pages: usize,
    /// Documents indexed by this run.
    pub resources: usize,
    /// Documents indexed by earlier interrupted runs, when resuming.
    pub resumed: usize,
}

impl IndexSummary {
    /// Documents indexed across this run and the runs it resumed.
    pub fn total(&self) -> usize {
        self.resources + self.resumed
    }
}

/// Orchestrator that drives a full indexing run.
///
/// Repositories, courses and resources are processed in ascending id order,
/// one page at a time: fetch, annotate, build, bulk index. Any error that
/// escapes the retrying stages aborts the run.
pub struct Orchestrator {
    taxonomy: TaxonomyResolver,
    fetcher: ResourceFetcher,
    annotator: TermAnnotator,
    loader: SearchLoader,
    config: OrchestratorConfig,
    checkpoints: Option<CheckpointStore>,
}

impl Orchestrator {
    /// Create a new orchestrator with the default configuration.
    pub fn new(source: Arc<dyn LoreSource>, client: Arc<dyn SearchEngineClient>) -> Self {
        Self::with_config(source, client, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        source: Arc<dyn LoreSource>,
        client: Arc<dyn SearchEngineClient>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            taxonomy: TaxonomyResolver::new(source.clone(), config.retry.clone()),
            fetcher: ResourceFetcher::new(source.clone(), config.retry.clone(), config.page_size),
            annotator: TermAnnotator::new(source, config.retry.clone()),
            loader: SearchLoader::with_retry(client, config.retry.clone()),
            config,
            checkpoints: None,
        }
    }

    /// Persist progress after every page and resume from it on the next run.
    pub fn with_checkpoints(mut self, store: CheckpointStore) -> Self {
        self.checkpoints = Some(store);
        self
    }

    /// Check that the search engine is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, PipelineError> {
        self.loader.health_check().await
    }

    /// Index every learning resource of every repository.
    #[instrument(skip(self), fields(page_size = self.config.page_size))]
    pub async fn run(&self) -> Result<IndexSummary, PipelineError> {
        info!("Starting LORE indexing run");

        let checkpoint = match &self.checkpoints {
            Some(store) => store.load().await?,
            None => None,
        };
        let mut summary = IndexSummary::default();
        if let Some(cp) = &checkpoint {
            info!(
                repository_id = cp.repository_id,
                course_id = cp.course_id,
                last_resource_id = cp.last_resource_id,
                indexed = cp.indexed,
                "Resuming from checkpoint"
            );
            summary.resumed = cp.indexed;
        }

        let resource_types = self.taxonomy.load_resource_types().await?;

        let vocabulary_names = self.taxonomy.load_vocabulary_names().await?;
        let mapping = build_mapping(&self.config.mapping_name, &vocabulary_names);
        self.loader.ensure_schema(&mapping).await?;

        for row in self.taxonomy.load_repository_rows().await? {
            if checkpoint.as_ref().is_some_and(|cp| cp.repository_done(row.id)) {
                debug!(repository_id = row.id, "Skipping repository indexed before checkpoint");
                continue;
            }

            let repository = self.taxonomy.load_repository(row).await?;
            self.index_repository(&repository, &resource_types, checkpoint.as_ref(), &mut summary)
                .await?;
            summary.repositories += 1;
        }

        if let Some(store) = &self.checkpoints {
            store.clear().await?;
        }

        info!(
            repositories = summary.repositories,
            courses = summary.courses,
            pages = summary.pages,
            resources = summary.resources,
            total = summary.total(),
            "Indexing run complete"
        );
        Ok(summary)
    }

    #[instrument(skip_all, fields(repository = %repository.slug))]
    async fn index_repository(
        &self,
        repository: &Repository,
        resource_types: &ResourceTypes,
        checkpoint: Option<&Checkpoint>,
        summary: &mut IndexSummary,
    ) -> Result<(), PipelineError> {
        for course in self.fetcher.courses(repository.id).await? {
            let start_after = match checkpoint
                .map(|cp| cp.course_position(repository.id, course.id))
                .unwrap_or(CoursePosition::Fresh)
            {
                CoursePosition::Done => continue,
                CoursePosition::ResumeAfter(id) => id,
                CoursePosition::Fresh => 0,
            };

            let indexed = self
                .index_course(repository, &course, resource_types, start_after, summary)
                .await?;
            summary.courses += 1;

            info!(
                course = %course.course_number,
                run = %course.run,
                indexed,
                total = summary.total(),
                "Indexed course"
            );
        }
        Ok(())
    }

    /// Index one course page by page. Returns the number of documents written.
    async fn index_course(
        &self,
        repository: &Repository,
        course: &Course,
        resource_types: &ResourceTypes,
        start_after: ResourceId,
        summary: &mut IndexSummary,
    ) -> Result<usize, PipelineError> {
        let builder = DocumentBuilder::new(resource_types);
        let mut pages = self.fetcher.pages(course, start_after);
        let mut indexed = 0;

        while let Some(mut page) = pages.next_page().await? {
            self.annotator.annotate(repository, &mut page).await?;
            let documents = builder.build_page(&page, course, repository)?;
            let written = self.loader.load(&documents).await?;

            indexed += written;
            summary.pages += 1;
            summary.resources += written;

            if let Some(store) = &self.checkpoints {
                let checkpoint =
                    Checkpoint::new(repository.id, course.id, pages.cursor(), summary.total());
                store.save(&checkpoint).await?;
            }
        }

        Ok(indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySearchEngine, InMemorySource};
    use lore_indexer_repository::{FieldRole, SearchError};
    use std::sync::atomic::Ordering;

    fn config(page_size: usize) -> OrchestratorConfig {
        OrchestratorConfig {
            page_size,
            retry: RetryPolicy::none(),
            ..OrchestratorConfig::default()
        }
    }

    /// Repository 1 with vocabularies A {t1, t2} and B {t3}, one course and
    /// one resource tagged t1 and t3.
    fn tagged_source() -> InMemorySource {
        let mut source = InMemorySource {
            resource_types: vec![(1, "problem".to_string())],
            ..InMemorySource::default()
        };
        source.add_repository(1, "Physics", "physics");
        source.add_vocabulary(1, 10, "A");
        source.add_vocabulary(1, 20, "B");
        source.add_term(10, 1, "t1-label");
        source.add_term(10, 2, "t2-label");
        source.add_term(20, 3, "t3-label");
        source.add_course(1, 5, "8.01");
        source.add_resource(5, 42, "Kinematics");
        source.associate(1, 42);
        source.associate(3, 42);
        source
    }

    fn paged_source(courses: &[(i64, i64)]) -> InMemorySource {
        let mut source = InMemorySource {
            resource_types: vec![(1, "problem".to_string())],
            ..InMemorySource::default()
        };
        source.add_repository(1, "Physics", "physics");
        for (course_id, count) in courses {
            source.add_course(1, *course_id, &format!("8.0{}", course_id));
            for i in 1..=*count {
                source.add_resource(*course_id, course_id * 1000 + i, &format!("R{}", i));
            }
        }
        source
    }

    #[tokio::test]
    async fn test_end_to_end_document() {
        let source = Arc::new(tagged_source());
        let client = Arc::new(InMemorySearchEngine::default());
        let orchestrator = Orchestrator::with_config(source, client.clone(), config(250));

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(
            summary,
            IndexSummary {
                repositories: 1,
                courses: 1,
                pages: 1,
                resources: 1,
                resumed: 0,
            }
        );

        let doc = client.document("42").unwrap();
        assert_eq!(doc.vocabularies["A"], vec!["t1-label"]);
        assert_eq!(doc.vocabularies["B"], vec!["t3-label"]);
        assert_eq!(doc.course, "8.01");
        assert_eq!(doc.repository, "physics");
        assert_eq!(doc.resource_type, "problem");
        assert_eq!(doc.content_stripped, "Kinematics");
        assert_eq!(doc.titlesort, "0Kinematics");

        let mapping = client.mapping.lock().unwrap().clone().unwrap();
        assert_eq!(mapping.name(), "learningresource");
        assert_eq!(mapping.role("A"), Some(FieldRole::Exact));
        assert_eq!(mapping.role("B"), Some(FieldRole::Exact));
    }

    #[tokio::test]
    async fn test_second_run_overwrites_without_schema_writes() {
        let source = Arc::new(tagged_source());
        let client = Arc::new(InMemorySearchEngine::default());
        let orchestrator = Orchestrator::with_config(source, client.clone(), config(250));

        orchestrator.run().await.unwrap();
        let writes = client.writes();
        orchestrator.run().await.unwrap();

        assert_eq!(client.writes(), writes);
        assert_eq!(client.document_count(), 1);
        assert_eq!(client.bulk_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pages_become_bulk_requests() {
        let source = Arc::new(paged_source(&[(4, 600), (5, 3)]));
        let client = Arc::new(InMemorySearchEngine::default());
        let orchestrator = Orchestrator::with_config(source.clone(), client.clone(), config(250));

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.courses, 2);
        assert_eq!(summary.pages, 4);
        assert_eq!(summary.resources, 603);
        assert_eq!(client.document_count(), 603);
        assert_eq!(client.bulk_calls.load(Ordering::SeqCst), 4);
        // Three pages plus the empty one for course 4, one plus the empty one for course 5.
        assert_eq!(source.page_requests().len(), 6);
    }

    #[tokio::test]
    async fn test_resume_skips_indexed_resources() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        store.save(&Checkpoint::new(1, 5, 5003, 13)).await.unwrap();

        let source = Arc::new(paged_source(&[(4, 10), (5, 6), (6, 2)]));
        let client = Arc::new(InMemorySearchEngine::default());
        let orchestrator = Orchestrator::with_config(source.clone(), client.clone(), config(2))
            .with_checkpoints(store.clone());

        let summary = orchestrator.run().await.unwrap();

        assert_eq!(summary.resources, 5);
        assert_eq!(summary.resumed, 13);
        assert_eq!(summary.total(), 18);
        assert!(client.document("4001").is_none());
        assert!(client.document("5003").is_none());
        assert!(client.document("5004").is_some());
        assert!(client.document("6002").is_some());
        // Course 4 is never read.
        assert_eq!(source.page_requests(), vec![5003, 5005, 5006, 0, 6002]);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_run_keeps_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let source = Arc::new(paged_source(&[(4, 4), (5, 2)]));
        let client = Arc::new(InMemorySearchEngine::default());
        client.fail_bulk_from(3, SearchError::bulk_index("mapper_parsing_exception"));
        let orchestrator = Orchestrator::with_config(source.clone(), client.clone(), config(2))
            .with_checkpoints(store.clone());

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, PipelineError::SearchError(SearchError::BulkIndexError(_))));

        let checkpoint = store.load().await.unwrap().unwrap();
        assert_eq!(checkpoint.course_id, 4);
        assert_eq!(checkpoint.last_resource_id, 4004);
        assert_eq!(checkpoint.indexed, 4);

        // Once the engine recovers, the next run only writes course 5.
        *client.failing_from.lock().unwrap() = None;
        let summary = orchestrator.run().await.unwrap();
        assert_eq!(summary.resources, 2);
        assert_eq!(summary.total(), 6);
        assert_eq!(client.document_count(), 6);
    }

    #[tokio::test]
    async fn test_unknown_term_aborts_run() {
        let mut source = tagged_source();
        source.associate(99, 42);
        let client = Arc::new(InMemorySearchEngine::default());
        let orchestrator = Orchestrator::with_config(Arc::new(source), client.clone(), config(250));

        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, PipelineError::TaxonomyError(_)));
        assert_eq!(client.document_count(), 0);
    }
}
