//! Relational source trait definition.
//!
//! Each method corresponds to one fixed query contract. Implementations must
//! return rows in the stated order; the pipeline relies on it for cursor
//! pagination and for resuming from a checkpoint.

use async_trait::async_trait;

use crate::errors::SourceError;
use lore_indexer_shared::{
    Course, LearningResource, RepositoryId, ResourceId, ResourceTypeId, TermId, VocabularyId,
};

/// A repository row, before its taxonomy is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRow {
    pub id: RepositoryId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyRow {
    pub id: VocabularyId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRow {
    pub id: TermId,
    pub label: String,
}

/// One row of the term to learning resource crosswalk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermAssociation {
    pub term_id: TermId,
    pub resource_id: ResourceId,
}

/// Abstract interface over the LORE relational store.
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait LoreSource: Send + Sync {
    /// All learning resource types as `(id, name)`, ordered by id.
    async fn resource_types(&self) -> Result<Vec<(ResourceTypeId, String)>, SourceError>;

    /// All repositories, ordered by id.
    async fn repositories(&self) -> Result<Vec<RepositoryRow>, SourceError>;

    /// Vocabularies of one repository.
    async fn vocabularies(
        &self,
        repository_id: RepositoryId,
    ) -> Result<Vec<VocabularyRow>, SourceError>;

    /// Display names of every vocabulary in every repository.
    async fn vocabulary_names(&self) -> Result<Vec<String>, SourceError>;

    /// Terms of one vocabulary.
    async fn terms(&self, vocabulary_id: VocabularyId) -> Result<Vec<TermRow>, SourceError>;

    /// Courses of one repository, ordered by id.
    async fn courses(&self, repository_id: RepositoryId) -> Result<Vec<Course>, SourceError>;

    /// One page of a course's learning resources.
    ///
    /// Returns at most `limit` resources with id strictly greater than
    /// `after_id`, ordered ascending by id. An empty result means the course
    /// is exhausted. Returned resources carry the course and repository ids
    /// and an empty term set.
    async fn learning_resources(
        &self,
        course: &Course,
        after_id: ResourceId,
        limit: usize,
    ) -> Result<Vec<LearningResource>, SourceError>;

    /// Term associations whose resource id lies in `[min_id, max_id]`.
    async fn term_associations(
        &self,
        min_id: ResourceId,
        max_id: ResourceId,
    ) -> Result<Vec<TermAssociation>, SourceError>;

    /// Check that the source is reachable.
    async fn health_check(&self) -> Result<(), SourceError>;
}
