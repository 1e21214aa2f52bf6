//! Unified error types for the gridyn crates
//!
//! [`GridynError`] covers the fatal paths of a decode session: unreadable or
//! oversized sources, malformed structured syntax, and invalid schemas.
//! Field-level data problems are never errors; they are recorded as
//! [`crate::ValidationIssue`]s instead.

use thiserror::Error;

use crate::schema::FieldType;

/// Unified error type for gridyn operations.
#[derive(Error, Debug)]
pub enum GridynError {
    /// I/O errors (file access, directory traversal)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source syntax that cannot be framed into records
    #[error("Parse error: {0}")]
    Parse(String),

    /// Structurally invalid schema definition
    #[error("Schema error: {0}")]
    Schema(String),

    /// Source rejected by the size guard before decoding
    #[error("File size {size} bytes exceeds maximum {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// Value coercion failure surfaced outside the decoder
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Output rendering errors (TOML, JSON, Arrow)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using GridynError.
pub type GridynResult<T> = Result<T, GridynError>;

/// A raw value that could not be coerced into the requested field type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot convert '{raw}' to {target}: {reason}")]
pub struct ConversionError {
    pub target: FieldType,
    pub raw: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(target: FieldType, raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target,
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GridynError::Schema("duplicate field 'H'".into());
        assert!(err.to_string().contains("Schema error"));
        assert!(err.to_string().contains("duplicate field 'H'"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GridynError = io_err.into();
        assert!(matches!(err, GridynError::Io(_)));
    }

    #[test]
    fn test_conversion_error_display() {
        let err = ConversionError::new(FieldType::Integer, "abc", "invalid digit");
        assert_eq!(
            err.to_string(),
            "cannot convert 'abc' to integer: invalid digit"
        );
        let wrapped: GridynError = err.into();
        assert!(matches!(wrapped, GridynError::Conversion(_)));
    }

    #[test]
    fn test_file_too_large_display() {
        let err = GridynError::FileTooLarge { size: 2048, max: 1024 };
        assert_eq!(
            err.to_string(),
            "File size 2048 bytes exceeds maximum 1024 bytes"
        );
    }
}
