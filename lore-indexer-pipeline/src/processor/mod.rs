//! Processor module for the search indexer pipeline.
//!
//! Annotates resources with their terms and transforms them into search documents.

mod document_builder;
mod markup;
mod term_annotator;

pub use document_builder::{title_sort_key, DocumentBuilder};
pub use markup::strip_tags;
pub use term_annotator::{apply_associations, TermAnnotator};
