//! # LORE Indexer
//!
//! Main library for the LORE learning resource search indexer.
//!
//! This crate provides the entry point and configuration for running
//! a full indexing pass from the LORE database into the search engine.

pub mod config;

pub use config::{Config, Dependencies};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] lore_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] lore_indexer_repository::SearchError),

    /// Source error.
    #[error("Source error: {0}")]
    SourceError(#[from] lore_indexer_source::SourceError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
