//! Interface definitions for the relational source.

mod lore_source;

pub use lore_source::{LoreSource, RepositoryRow, TermAssociation, TermRow, VocabularyRow};
