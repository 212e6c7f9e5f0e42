//! Term annotation for a page of learning resources.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::retry::RetryPolicy;
use lore_indexer_shared::{LearningResource, Repository, TermSet};
use lore_indexer_source::{LoreSource, TermAssociation};

/// Fills each resource's term set from the term association table.
pub struct TermAnnotator {
    source: Arc<dyn LoreSource>,
    retry: RetryPolicy,
}

impl TermAnnotator {
    pub fn new(source: Arc<dyn LoreSource>, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    /// Annotate a non-empty page of resources from one repository.
    ///
    /// Issues a single range query covering the page's id span.
    #[instrument(skip(self, repository, page), fields(repository = %repository.slug, resources = page.len()))]
    pub async fn annotate(
        &self,
        repository: &Repository,
        page: &mut [LearningResource],
    ) -> Result<(), PipelineError> {
        let (min_id, max_id) = match (
            page.iter().map(|r| r.id).min(),
            page.iter().map(|r| r.id).max(),
        ) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(PipelineError::EmptyPage("term annotator")),
        };

        let associations = self
            .retry
            .run("term_associations", || {
                self.source.term_associations(min_id, max_id)
            })
            .await?;

        debug!(
            min_id,
            max_id,
            associations = associations.len(),
            "Fetched term associations"
        );

        apply_associations(repository, page, &associations)
    }
}

/// Assign term sets to `page` from already fetched associations.
///
/// Every resource gets a bucket for each repository vocabulary. Associations
/// for resources outside the page are dropped before any taxonomy lookup.
pub fn apply_associations(
    repository: &Repository,
    page: &mut [LearningResource],
    associations: &[TermAssociation],
) -> Result<(), PipelineError> {
    let mut by_resource: HashMap<i64, TermSet> = page
        .iter()
        .map(|r| (r.id, repository.empty_term_set()))
        .collect();

    for association in associations {
        let Some(terms) = by_resource.get_mut(&association.resource_id) else {
            continue;
        };
        let term = repository.term(association.term_id)?;
        terms.push(term.vocabulary_id, association.term_id);
    }

    for resource in page.iter_mut() {
        resource.terms = by_resource
            .remove(&resource.id)
            .unwrap_or_else(|| repository.empty_term_set());
    }

    Ok(())
}
