//! Error types for pansql

use thiserror::Error;

/// Result type alias for pansql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, rendering or scanning statements
#[derive(Debug, Error)]
pub enum Error {
    /// Expressions are still pending; call `flush` before rendering.
    #[error("Statement has a dangling buffer, its flush method needs to be called")]
    NeedsFlush,

    /// The number of `?` placeholders does not match the number of arguments.
    #[error("Expected {expected} arguments, got {found}.")]
    ArgumentCountMismatch { expected: usize, found: usize },

    /// A field name did not resolve on the record type.
    ///
    /// This signals a bug in the calling code rather than a runtime condition.
    #[error("Field not found in type {record}: {field}")]
    FieldNotFound { record: &'static str, field: String },

    /// An insert statement was requested for zero records.
    #[error("Insert requires at least one record")]
    NoRecords,

    /// A scanned value could not be converted into its destination type.
    #[error("Cannot convert {found} value into {expected}")]
    Conversion {
        expected: &'static str,
        found: &'static str,
    },

    /// Row decode error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The row was scanned with a different number of destinations than it has columns.
    #[error("Row has {expected} columns, scan received {found} destinations")]
    ScanArity { expected: usize, found: usize },

    /// Error reported by the row source, passed through as-is.
    #[error(transparent)]
    Source(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an error coming from a row source
    pub fn from_source(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Source(err.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub(crate) fn conversion(expected: &'static str, found: &'static str) -> Self {
        Self::Conversion { expected, found }
    }

    /// Check if this is a needs-flush error
    pub fn is_needs_flush(&self) -> bool {
        matches!(self, Self::NeedsFlush)
    }

    /// Check if this is an argument count mismatch
    pub fn is_argument_count_mismatch(&self) -> bool {
        matches!(self, Self::ArgumentCountMismatch { .. })
    }

    /// Check if this is a field lookup failure
    pub fn is_field_not_found(&self) -> bool {
        matches!(self, Self::FieldNotFound { .. })
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Source(Box::new(err))
    }
}
