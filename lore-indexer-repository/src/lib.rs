//! # LORE Indexer Repository
//!
//! This crate provides the search engine side of the indexer: the
//! `SearchEngineClient` trait, the field mapping builder, error types, and a
//! concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod mapping;
pub mod opensearch;

pub use config::SearchIndexConfig;
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use mapping::{build_mapping, fixed_fields, FieldRole, Mapping};
pub use opensearch::OpenSearchClient;
