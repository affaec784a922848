//! Durable storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = RepositoryError::NotFound("target 7".to_string());
        let display = err.to_string();
        assert!(display.contains("not found"));
        assert!(display.contains("target 7"));
    }

    #[test]
    fn test_query_error() {
        let err = RepositoryError::Query("no such table".to_string());
        assert!(err.to_string().contains("Query error"));
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<RepositoryError> = vec![
            RepositoryError::NotFound("a".to_string()),
            RepositoryError::Query("b".to_string()),
            RepositoryError::Connection("c".to_string()),
            RepositoryError::Serialization("d".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
