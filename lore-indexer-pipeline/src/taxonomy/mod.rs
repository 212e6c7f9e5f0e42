//! Resource type and repository taxonomy loading.
//!
//! Both lookups are loaded once and handed to the stages that need them by
//! reference; nothing here is cached globally.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use lore_indexer_shared::{Repository, ResourceTypes, Term};
use lore_indexer_source::{LoreSource, RepositoryRow};

/// Loads resource types and per-repository vocabularies and terms.
pub struct TaxonomyResolver {
    source: Arc<dyn LoreSource>,
    retry: RetryPolicy,
}

impl TaxonomyResolver {
    pub fn new(source: Arc<dyn LoreSource>, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    /// Load the resource type lookup.
    pub async fn load_resource_types(&self) -> Result<ResourceTypes, PipelineError> {
        let rows = self
            .retry
            .run("resource_types", || self.source.resource_types())
            .await?;

        debug!(count = rows.len(), "Loaded resource types");
        Ok(rows.into_iter().collect())
    }

    /// Load all repository rows, ordered by id.
    pub async fn load_repository_rows(&self) -> Result<Vec<RepositoryRow>, PipelineError> {
        Ok(self
            .retry
            .run("repositories", || self.source.repositories())
            .await?)
    }

    /// Display names of every vocabulary, used to build the mapping.
    pub async fn load_vocabulary_names(&self) -> Result<Vec<String>, PipelineError> {
        Ok(self
            .retry
            .run("vocabulary_names", || self.source.vocabulary_names())
            .await?)
    }

    /// Load a repository together with all of its vocabularies and terms.
    #[instrument(skip(self, row), fields(repository = %row.slug))]
    pub async fn load_repository(&self, row: RepositoryRow) -> Result<Repository, PipelineError> {
        let vocabulary_rows = self
            .retry
            .run("vocabularies", || self.source.vocabularies(row.id))
            .await?;

        let mut vocabularies = BTreeMap::new();
        let mut terms = HashMap::new();

        for vocabulary in vocabulary_rows {
            let term_rows = self
                .retry
                .run("terms", || self.source.terms(vocabulary.id))
                .await?;

            // The term query is per vocabulary, so the vocabulary id is known here.
            for term in term_rows {
                terms.insert(term.id, Term::new(term.label, vocabulary.id));
            }
            vocabularies.insert(vocabulary.id, vocabulary.name);
        }

        let repository = Repository::new(row.id, row.name, row.slug, vocabularies, terms);

        debug!(
            vocabularies = repository.vocabulary_count(),
            terms = repository.term_count(),
            "Loaded repository taxonomy"
        );
        Ok(repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemorySource;

    #[tokio::test]
    async fn test_load_repository_taxonomy() {
        let mut source = InMemorySource::default();
        source.add_repository(1, "Physics", "physics");
        source.add_vocabulary(1, 10, "Subject");
        source.add_vocabulary(1, 20, "Level");
        source.add_term(10, 100, "Mechanics");
        source.add_term(10, 101, "Optics");
        source.add_term(20, 200, "Intro");

        let source: Arc<dyn LoreSource> = Arc::new(source);
        let resolver = TaxonomyResolver::new(source, RetryPolicy::none());

        let rows = resolver.load_repository_rows().await.unwrap();
        let repo = resolver.load_repository(rows[0].clone()).await.unwrap();

        assert_eq!(repo.slug, "physics");
        assert_eq!(repo.vocabulary_ids().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(repo.vocabulary_name(20).unwrap(), "Level");
        assert_eq!(repo.term(101).unwrap(), &Term::new("Optics", 10));
        assert_eq!(repo.term(200).unwrap().vocabulary_id, 20);
        assert_eq!(repo.term_count(), 3);
    }

    #[tokio::test]
    async fn test_load_resource_types() {
        let source = InMemorySource {
            resource_types: vec![(1, "chapter".to_string()), (2, "problem".to_string())],
            ..InMemorySource::default()
        };

        let resolver = TaxonomyResolver::new(Arc::new(source), RetryPolicy::none());
        let types = resolver.load_resource_types().await.unwrap();

        assert_eq!(types.len(), 2);
        assert_eq!(types.name(2), Some("problem"));
    }
}
