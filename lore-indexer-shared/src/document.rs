//! The flat, search-ready learning resource document.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::{CourseId, RepositoryId, ResourceId, ResourceTypeId};

/// Field names with a fixed meaning. A vocabulary may not reuse one of them.
///
/// Covers every serialized document key plus fields that only exist in the
/// index mapping.
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    "_id",
    "course",
    "run",
    "repository",
    "resource_type",
    "title",
    "description",
    "description_path",
    "content_xml",
    "xa_nr_views",
    "xa_nr_attempts",
    "xa_avg_grade",
    "xa_histogram_grade",
    "preview_url",
    "content_stripped",
    "titlesort",
];

/// Errors raised while shaping a resource into a document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The resource type code has no entry in the lookup table.
    #[error("Unknown resource type {resource_type_id} for resource {resource_id}")]
    UnknownResourceType {
        resource_id: ResourceId,
        resource_type_id: ResourceTypeId,
    },

    /// The resource does not belong to the course or repository it was built with.
    #[error(
        "Resource {resource_id} belongs to course {course_id} in repository {repository_id}"
    )]
    OwnershipMismatch {
        resource_id: ResourceId,
        course_id: CourseId,
        repository_id: RepositoryId,
    },

    /// A vocabulary display name collides with a fixed document field.
    #[error("Vocabulary name '{0}' collides with a document field")]
    ReservedFieldName(String),

    /// A vocabulary display name cannot be used as a field name.
    #[error("Vocabulary name '{0}' is not a valid field name")]
    InvalidFieldName(String),
}

/// A learning resource denormalized for the search index.
///
/// Every vocabulary of the owning repository is present in `vocabularies`,
/// keyed by display name, even when the resource has no terms in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningResourceDocument {
    pub id: ResourceId,
    #[serde(rename = "_id")]
    pub doc_id: ResourceId,
    pub course: String,
    pub run: String,
    pub repository: String,
    pub resource_type: String,
    pub title: String,
    pub description: String,
    pub description_path: String,
    pub content_xml: String,
    pub xa_nr_views: i64,
    pub xa_nr_attempts: i64,
    pub xa_avg_grade: f64,
    pub preview_url: String,
    pub content_stripped: String,
    pub titlesort: String,
    #[serde(flatten)]
    pub vocabularies: BTreeMap<String, Vec<String>>,
}

impl LearningResourceDocument {
    /// Identity used for upserts: the resource id as a string.
    pub fn document_id(&self) -> String {
        self.doc_id.to_string()
    }
}
