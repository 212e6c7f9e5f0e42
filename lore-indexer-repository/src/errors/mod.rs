//! Error types for the search indexer repository.

mod search_error;

pub use search_error::SearchError;
