//! Search error types.
//!
//! This module defines the error types that can occur during search engine
//! operations, split into transient failures worth retrying and terminal ones.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// Failed to reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The search engine answered but is overloaded or unavailable (429, 502, 503, 504).
    #[error("Search engine unavailable: {0}")]
    UnavailableError(String),

    /// Bulk indexing operation had failures.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to check or create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to check or submit the field mapping.
    #[error("Mapping error: {0}")]
    MappingError(String),

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::UnavailableError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a mapping error.
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::MappingError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Whether the failure is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionError(_) | Self::UnavailableError(_))
    }

    /// Classify a non-success HTTP status from the search engine.
    ///
    /// Overload and gateway statuses become [`SearchError::UnavailableError`];
    /// anything else is built with `terminal`.
    pub fn from_status(
        status: u16,
        body: &str,
        terminal: impl FnOnce(String) -> Self,
    ) -> Self {
        let msg = format!("status {}: {}", status, body);
        match status {
            429 | 502 | 503 | 504 => Self::UnavailableError(msg),
            _ => terminal(msg),
        }
    }
}
