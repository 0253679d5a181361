//! Table store error types and result alias.
//!
//! This module defines the errors the fake table store can surface to the
//! code-under-test. The fake is deliberately permissive: most conditions the
//! production store would reject (deleting a missing row, upserting over an
//! existing row) are normalized to success. Only the conditions below
//! propagate to the caller.
//!
//! # Error Types
//!
//! - [`TableError::UnknownTable`] - Lookup of a table name that was never registered
//! - [`TableError::EntityTypeMismatch`] - Lookup with a row type other than the registered one
//! - [`TableError::TableAlreadyRegistered`] - A name was registered twice on one service
//! - [`TableError::FilterTranslation`] - A text filter could not be translated or evaluated
//! - [`TableError::EntityAlreadyExists`] - Duplicate add under [`DuplicateKeyPolicy::Reject`]
//! - [`TableError::Serialization`] - A row could not be converted to or from its property bag
//!
//! [`DuplicateKeyPolicy::Reject`]: crate::config::DuplicateKeyPolicy::Reject
//!
//! # Example
//!
//! ```
//! use activation_tables::{TableError, TableResult};
//!
//! fn lookup(name: &str) -> TableResult<()> {
//!     Err(TableError::unknown_table(name))
//! }
//!
//! assert!(matches!(lookup("ghost"), Err(TableError::UnknownTable { .. })));
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::filter::FilterError;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for table store operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors that can occur while resolving or operating on a fake table.
///
/// # Non-exhaustive
///
/// New variants may be added without a semver-breaking change. Downstream
/// match expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TableError {
    /// No table with this name was registered on the service.
    ///
    /// The fake only knows the tables the test seeded; it does not carry a
    /// full catalog of the production account.
    #[error("Unknown table: {name}")]
    UnknownTable {
        /// The table name that was requested.
        name: String,
    },

    /// The table exists but holds a different row type than the one requested.
    #[error("Table {table} holds {registered} rows, not {requested}")]
    EntityTypeMismatch {
        /// The table name that was requested.
        table: String,
        /// Type name of the row type the caller asked for.
        requested: &'static str,
        /// Type name of the row type the table was registered with.
        registered: &'static str,
    },

    /// A table with this name is already registered on the service.
    #[error("Table already registered: {name}")]
    TableAlreadyRegistered {
        /// The duplicated table name.
        name: String,
    },

    /// A text filter could not be rewritten, parsed or evaluated.
    ///
    /// Query calls are read-only, so the table is unchanged when this is
    /// returned.
    #[error("Failed to translate filter {filter:?}: {source}")]
    FilterTranslation {
        /// The filter text as supplied by the caller.
        filter: String,
        /// What went wrong in the translator.
        #[source]
        source: FilterError,
    },

    /// A row with the same partition and row key already exists.
    ///
    /// Only raised when the table is configured to reject duplicate adds.
    #[error("Entity already exists: ({partition_key}, {row_key})")]
    EntityAlreadyExists {
        /// Partition key of the conflicting row.
        partition_key: String,
        /// Row key of the conflicting row.
        row_key: String,
    },

    /// A row could not be converted to or from its property bag.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
        /// The underlying error that caused serialization to fail.
        #[source]
        source: Option<BoxError>,
    },
}

impl TableError {
    /// Creates a new `UnknownTable` error for the given name.
    #[must_use]
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Self::UnknownTable { name: name.into() }
    }

    /// Creates a new `TableAlreadyRegistered` error for the given name.
    #[must_use]
    pub fn already_registered(name: impl Into<String>) -> Self {
        Self::TableAlreadyRegistered { name: name.into() }
    }

    /// Creates a new `FilterTranslation` error for the given filter text.
    #[must_use]
    pub fn filter_translation(filter: impl Into<String>, source: FilterError) -> Self {
        Self::FilterTranslation { filter: filter.into(), source }
    }

    /// Creates a new `EntityAlreadyExists` error for the given key pair.
    #[must_use]
    pub fn already_exists(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self::EntityAlreadyExists { partition_key: partition_key.into(), row_key: row_key.into() }
    }

    /// Creates a new `Serialization` error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), source: None }
    }

    /// Creates a new `Serialization` error with a message and source error.
    #[must_use]
    pub fn serialization_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization { message: message.into(), source: Some(Arc::new(source)) }
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_with_source(err.to_string(), err)
    }
}
