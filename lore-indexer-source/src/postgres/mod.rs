//! PostgreSQL implementation of the relational source.

mod queries;
mod source;

pub use source::{database_url, PostgresSource};
