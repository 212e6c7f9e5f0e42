//! # LORE Indexer Source
//!
//! This crate provides the relational side of the indexer: the `LoreSource`
//! trait describing the fixed query contracts the pipeline consumes, the
//! row types it returns, and a PostgreSQL implementation backed by `sqlx`.

pub mod errors;
pub mod interfaces;
pub mod postgres;

pub use errors::SourceError;
pub use interfaces::{LoreSource, RepositoryRow, TermAssociation, TermRow, VocabularyRow};
pub use postgres::PostgresSource;
