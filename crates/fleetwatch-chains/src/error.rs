//! Chain errors.

use std::fmt;

use thiserror::Error;

use fleetwatch_protocols::{RepositoryError, RequestSection};

/// Which rule a rejected chain broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Body,
    Query,
    Params,
    Path,
    Structure,
}

impl From<RequestSection> for ValidationKind {
    fn from(section: RequestSection) -> Self {
        match section {
            RequestSection::Body => ValidationKind::Body,
            RequestSection::Query => ValidationKind::Query,
            RequestSection::Params => ValidationKind::Params,
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationKind::Body => "body",
            ValidationKind::Query => "query",
            ValidationKind::Params => "params",
            ValidationKind::Path => "path",
            ValidationKind::Structure => "structure",
        };
        f.write_str(name)
    }
}

/// Chain errors.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The chain was rejected and nothing was stored.
    #[error("Invalid chain ({kind}): {message}")]
    Validation { kind: ValidationKind, message: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ChainError {
    pub fn validation(kind: ValidationKind, message: impl Into<String>) -> Self {
        ChainError::Validation {
            kind,
            message: message.into(),
        }
    }

    /// Rejected rule, if this is a validation error.
    pub fn kind(&self) -> Option<ValidationKind> {
        match self {
            ChainError::Validation { kind, .. } => Some(*kind),
            ChainError::Repository(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_kind() {
        let err = ChainError::validation(ValidationKind::Query, "field 'q' missing");
        assert_eq!(err.to_string(), "Invalid chain (query): field 'q' missing");
        assert_eq!(err.kind(), Some(ValidationKind::Query));
    }

    #[test]
    fn test_section_maps_to_kind() {
        assert_eq!(ValidationKind::from(RequestSection::Params), ValidationKind::Params);
    }
}
