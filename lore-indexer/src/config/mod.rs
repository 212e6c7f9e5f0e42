//! Configuration and dependency wiring for the indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{Config, LogFormat};
