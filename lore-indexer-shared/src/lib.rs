//! # LORE Indexer Shared
//!
//! Shared types for the LORE search indexer: the relational data model
//! (repositories, taxonomy, courses, learning resources) and the flat
//! document that is written to the search index.

pub mod document;
pub mod resource;
pub mod taxonomy;

pub use document::{DocumentError, LearningResourceDocument, RESERVED_FIELDS};
pub use resource::{Course, LearningResource, ResourceTypes, TermSet};
pub use taxonomy::{Repository, TaxonomyError, Term};

/// Primary key of a repository row.
pub type RepositoryId = i64;
/// Primary key of a course row.
pub type CourseId = i64;
/// Primary key of a learning resource row. Also the search document id.
pub type ResourceId = i64;
/// Primary key of a vocabulary row.
pub type VocabularyId = i64;
/// Primary key of a term row.
pub type TermId = i64;
/// Primary key of a learning resource type row.
pub type ResourceTypeId = i64;
