//! Error types for the page resolver.

use thiserror::Error;

use crate::models::PageId;

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Resolver errors. Every variant is terminal for a run.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Configuration error (missing or malformed connection string, bad env value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The data source could not be opened or did not answer
    #[error("Cannot connect to database: {0}")]
    Connection(#[source] sqlx::Error),

    /// Startup relation read or row decode failure
    #[error("Cannot read {relation} row: {source}")]
    Load {
        relation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Caller-supplied query failed to execute or decode
    #[error("Cannot execute argument query: {0}")]
    Query(#[source] sqlx::Error),

    /// Caller-supplied query projects a different number of columns than requested
    #[error("Argument query returns {found} columns, expected {expected} (uid + nfields)")]
    QueryShape { expected: usize, found: usize },

    /// Parent pointers loop back on themselves without reaching a root
    #[error("Page tree contains a cycle: walking from {start} revisited {at}")]
    Cycle { start: PageId, at: PageId },

    #[error("No UIDs found")]
    NoSelection,

    #[error("Cannot write output: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    pub(crate) fn load(relation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Load { relation, source }
    }
}
