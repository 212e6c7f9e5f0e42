//! Settings read from the environment.

use std::path::PathBuf;

use crate::IndexingError;
use lore_indexer_pipeline::fetcher::DEFAULT_PAGE_SIZE;
use lore_indexer_repository::config::DEFAULT_INDEX_NAME;

/// Default search engine URL.
const DEFAULT_HAYSTACK_URL: &str = "http://localhost:9200";

/// Default number of retries for transient failures.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Indexer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// PostgreSQL URL, with `sslmode=disable` appended when requested.
    pub database_url: String,
    pub haystack_url: String,
    pub haystack_index: String,
    pub page_size: usize,
    pub max_retries: u32,
    pub checkpoint_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL URL (required)
    /// - `LORE_DB_DISABLE_SSL`: `True` to connect without TLS
    /// - `HAYSTACK_URL`: search engine URL (default: http://localhost:9200)
    /// - `HAYSTACK_INDEX`: index name (default: haystack)
    /// - `INDEXER_PAGE_SIZE`: resources per page and bulk request (default: 250)
    /// - `INDEXER_MAX_RETRIES`: retries for transient failures (default: 3)
    /// - `INDEXER_CHECKPOINT_PATH`: enables resumable runs
    /// - `LOG_FORMAT`: `json` for JSON log lines
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| IndexingError::config("DATABASE_URL must be set"))?;
        let disable_ssl = lookup("LORE_DB_DISABLE_SSL").is_some_and(|v| is_truthy(&v));

        let page_size = match lookup("INDEXER_PAGE_SIZE") {
            Some(v) => parse_number::<usize>("INDEXER_PAGE_SIZE", &v)?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 {
            return Err(IndexingError::config("INDEXER_PAGE_SIZE must be positive"));
        }

        let max_retries = match lookup("INDEXER_MAX_RETRIES") {
            Some(v) => parse_number::<u32>("INDEXER_MAX_RETRIES", &v)?,
            None => DEFAULT_MAX_RETRIES,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            database_url: lore_indexer_source::postgres::database_url(&database_url, disable_ssl),
            haystack_url: lookup("HAYSTACK_URL").unwrap_or_else(|| DEFAULT_HAYSTACK_URL.to_string()),
            haystack_index: lookup("HAYSTACK_INDEX")
                .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            page_size,
            max_retries,
            checkpoint_path: lookup("INDEXER_CHECKPOINT_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            log_format,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, IndexingError> {
    value
        .trim()
        .parse()
        .map_err(|_| IndexingError::config(format!("{} must be a non-negative integer, got '{}'", name, value)))
}
