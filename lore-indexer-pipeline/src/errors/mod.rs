//! Error types for the search indexer pipeline.

use lore_indexer_repository::SearchError;
use lore_indexer_shared::{CourseId, DocumentError, ResourceId, TaxonomyError};
use lore_indexer_source::SourceError;
use thiserror::Error;

/// Errors that can occur in the search indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from the relational source.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// Error from the search engine.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// A resource references taxonomy that was not loaded for its repository.
    #[error("Taxonomy error: {0}")]
    TaxonomyError(#[from] TaxonomyError),

    /// A resource could not be shaped into a document.
    #[error("Document error: {0}")]
    DocumentError(#[from] DocumentError),

    /// An empty page was handed to a stage that requires resources.
    #[error("Empty page passed to {0}")]
    EmptyPage(&'static str),

    /// The source returned a page that does not advance the cursor.
    #[error("Cursor stalled for course {course_id}: page starting at {first_id} is not after {cursor}")]
    CursorStalled {
        course_id: CourseId,
        cursor: ResourceId,
        first_id: ResourceId,
    },

    /// Failed to read or write the resume checkpoint.
    #[error("Checkpoint error: {0}")]
    CheckpointError(String),
}

impl PipelineError {
    /// Create a checkpoint error.
    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::CheckpointError(msg.into())
    }

    /// Whether the failure is transient and the failed step may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::SourceError(e) => e.is_retryable(),
            Self::SearchError(e) => e.is_retryable(),
            Self::TaxonomyError(_)
            | Self::DocumentError(_)
            | Self::EmptyPage(_)
            | Self::CursorStalled { .. }
            | Self::CheckpointError(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_delegates() {
        assert!(PipelineError::from(SourceError::connection("reset")).is_retryable());
        assert!(PipelineError::from(SearchError::unavailable("429")).is_retryable());
        assert!(!PipelineError::from(SearchError::mapping("bad")).is_retryable());
        assert!(!PipelineError::EmptyPage("annotator").is_retryable());
        assert!(!PipelineError::from(TaxonomyError::UnknownTerm {
            repository: "physics".to_string(),
            term_id: 1,
        })
        .is_retryable());
    }
}
