//! Configuration types for the search index.

/// Default index name.
pub const DEFAULT_INDEX_NAME: &str = "haystack";

/// Name of the learning resource mapping.
pub const MAPPING_NAME: &str = "learningresource";

/// Configuration for the search index targeted by the indexer.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Index (or alias) the documents are written to.
    pub index_name: String,
    /// Name recorded in the mapping metadata, used to detect a provisioned mapping.
    pub mapping_name: String,
    /// Maximum number of documents allowed in a single bulk request.
    /// Set to None to disable the limit (not recommended for production).
    pub max_batch_size: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            mapping_name: MAPPING_NAME.to_string(),
            max_batch_size: Some(1000),
        }
    }
}

impl SearchIndexConfig {
    /// Create a config for the given index with default limits.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            ..Self::default()
        }
    }

    /// Set a custom batch size limit.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = Some(max_batch_size);
        self
    }

    /// Remove the batch size limit (use with caution).
    pub fn unlimited(mut self) -> Self {
        self.max_batch_size = None;
        self
    }
}
