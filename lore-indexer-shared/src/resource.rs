//! Courses, learning resources and the lookups they reference.

use std::collections::{BTreeMap, HashMap};

use crate::{CourseId, RepositoryId, ResourceId, ResourceTypeId, TermId, VocabularyId};

/// A container of learning resources within a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub repository_id: RepositoryId,
    pub org: String,
    pub run: String,
    pub course_number: String,
}

/// Per-resource mapping from vocabulary id to the associated term ids.
///
/// Buckets keep the order in which terms were appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSet(BTreeMap<VocabularyId, Vec<TermId>>);

impl TermSet {
    /// Create a term set with an empty bucket for each vocabulary.
    pub fn for_vocabularies(vocabulary_ids: impl IntoIterator<Item = VocabularyId>) -> Self {
        Self(
            vocabulary_ids
                .into_iter()
                .map(|id| (id, Vec::new()))
                .collect(),
        )
    }

    /// Append a term to its vocabulary's bucket, creating the bucket if needed.
    pub fn push(&mut self, vocabulary_id: VocabularyId, term_id: TermId) {
        self.0.entry(vocabulary_id).or_default().push(term_id);
    }

    pub fn get(&self, vocabulary_id: VocabularyId) -> Option<&[TermId]> {
        self.0.get(&vocabulary_id).map(Vec::as_slice)
    }

    pub fn vocabulary_ids(&self) -> impl Iterator<Item = VocabularyId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VocabularyId, &[TermId])> {
        self.0.iter().map(|(id, terms)| (*id, terms.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The indexable content unit (page, video, problem, ...).
///
/// Ownership is expressed through `course_id` and `repository_id`; the
/// owning records are passed alongside the resource where they are needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningResource {
    pub id: ResourceId,
    pub course_id: CourseId,
    pub repository_id: RepositoryId,
    pub title: String,
    pub description: String,
    pub description_path: String,
    pub content_xml: String,
    pub resource_type_id: ResourceTypeId,
    pub xa_nr_views: i64,
    pub xa_nr_attempts: i64,
    pub xa_avg_grade: f64,
    pub preview_url: String,
    /// Filled in by the term annotator; empty until then.
    pub terms: TermSet,
}

/// Lookup from resource type code to its display name.
#[derive(Debug, Clone, Default)]
pub struct ResourceTypes {
    names: HashMap<ResourceTypeId, String>,
}

impl ResourceTypes {
    pub fn name(&self, id: ResourceTypeId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(ResourceTypeId, String)> for ResourceTypes {
    fn from_iter<I: IntoIterator<Item = (ResourceTypeId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
