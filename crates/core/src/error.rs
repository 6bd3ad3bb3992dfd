//! Error types for the index advisor.

use thiserror::Error as ThisError;

/// Result type alias for advisor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by the advisor core, the engine and the synthesizer.
///
/// Variant names mirror the error kinds named in the system design rather
/// than any particular crate's vocabulary: callers match on these to decide
/// whether a failure is recoverable (`ParseError` during `submit_sql`) or
/// terminal (any error during `analyze`).
#[derive(Debug, ThisError)]
pub enum Error {
    /// The mirror database could not be created or the user schema could
    /// not be copied into it.
    #[error("failed to set up schema mirror: {0}")]
    SetupFailed(String),

    /// A submitted statement failed to prepare against the mirror.
    #[error("failed to parse statement: {0}")]
    ParseError(String),

    /// A table referenced by the workload has no primary-key column.
    #[error("table {0:?} has no primary key")]
    NoPrimaryKey(String),

    /// Introspection pragmas failed for some table.
    #[error("catalog lookup failed: {0}")]
    CatalogError(String),

    /// Installing a candidate index into the mirror failed.
    #[error("failed to create candidate index: {0}")]
    CreateIndexFailed(String),

    /// `EXPLAIN QUERY PLAN` failed against the mirror.
    #[error("failed to evaluate plan: {0}")]
    PlanError(String),

    /// Allocation failure. Never constructed in practice (the default
    /// global allocator aborts rather than returning), kept only for
    /// parity with the error-kind vocabulary of the system this mirrors.
    #[error("out of memory")]
    OutOfMemory,

    /// An API method was called while the session was in the wrong state
    /// (e.g. `submit_sql` after `analyze`, or `analyze` a second time).
    #[error("invalid operation for current session state")]
    MisuseError,

    /// I/O failure reading a workload file (CLI-only path).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A `rusqlite`/SQLite call failed in a way not already captured by a
    /// more specific variant above, preserved instead of stringified so
    /// callers can inspect the underlying driver error (e.g. its
    /// `sqlite3_errcode`).
    #[error("sqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

impl Error {
    /// Creates a [`Error::SetupFailed`].
    pub fn setup_failed(message: impl Into<String>) -> Self {
        Error::SetupFailed(message.into())
    }

    /// Creates a [`Error::ParseError`].
    pub fn parse_error(message: impl Into<String>) -> Self {
        Error::ParseError(message.into())
    }

    /// Creates a [`Error::NoPrimaryKey`].
    pub fn no_primary_key(table: impl Into<String>) -> Self {
        Error::NoPrimaryKey(table.into())
    }

    /// Creates a [`Error::CatalogError`].
    pub fn catalog_error(message: impl Into<String>) -> Self {
        Error::CatalogError(message.into())
    }

    /// Creates a [`Error::CreateIndexFailed`].
    pub fn create_index_failed(message: impl Into<String>) -> Self {
        Error::CreateIndexFailed(message.into())
    }

    /// Creates a [`Error::PlanError`].
    pub fn plan_error(message: impl Into<String>) -> Self {
        Error::PlanError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::no_primary_key("t1");
        assert_eq!(err.to_string(), "table \"t1\" has no primary key");

        let err = Error::MisuseError;
        assert!(err.to_string().contains("invalid operation"));
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::parse_error("near \"WHRE\": syntax error");
        match err {
            Error::ParseError(msg) => assert!(msg.contains("syntax error")),
            _ => panic!("wrong error variant"),
        }
    }

    #[test]
    fn test_rusqlite_error_preserved_via_from() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, Error::Rusqlite(_)));
    }
}

