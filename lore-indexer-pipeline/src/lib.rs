//! # LORE Indexer Pipeline
//!
//! This crate provides the batch pipeline that reads learning resources from
//! the LORE database and indexes them into the search engine.
//!
//! ## Architecture
//!
//! The pipeline follows the Fetcher-Processor-Loader pattern:
//!
//! 1. **Taxonomy**: Loads resource types and each repository's vocabularies and terms
//! 2. **Fetcher**: Pages through a course's resources with an id cursor
//! 3. **Processor**: Annotates resources with terms and builds search documents
//! 4. **Loader**: Provisions the mapping and bulk indexes documents
//! 5. **Orchestrator**: Drives repositories, courses and pages in order

pub mod checkpoint;
pub mod errors;
pub mod fetcher;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod retry;
pub mod taxonomy;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::PipelineError;
