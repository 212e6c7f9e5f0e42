//! Error types for the relational source.

use thiserror::Error;

/// Errors that can occur while reading from the relational source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Failed to reach the database, or the connection was lost mid-query.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The query was rejected or failed to execute.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A row did not match the expected shape.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl SourceError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Whether the failure is transient and the read may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}

impl From<sqlx::Error> for SourceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::WorkerCrashed => Self::ConnectionError(err.to_string()),
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => Self::DecodeError(err.to_string()),
            _ => Self::QueryError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_error_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: SourceError = sqlx::Error::Io(io).into();
        assert!(matches!(err, SourceError::ConnectionError(_)));
        assert!(err.is_retryable());

        let err: SourceError = sqlx::Error::PoolTimedOut.into();
        assert!(err.is_retryable());

        let err: SourceError = sqlx::Error::ColumnNotFound("slug".to_string()).into();
        assert!(matches!(err, SourceError::DecodeError(_)));
        assert!(!err.is_retryable());

        let err: SourceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, SourceError::QueryError(_)));
        assert!(!err.is_retryable());
    }
}
