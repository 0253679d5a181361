//! Shared test utilities for fake table testing.
//!
//! This module provides helpers for building rows and seeded tables, and
//! macros for asserting on [`TableResult`] values. It is feature-gated behind
//! `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! activation-tables = { path = "../tables", features = ["testutil"] }
//! ```
//!
//! Then import helpers:
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use activation_tables::testutil::{make_row, seeded_table};
//! ```

use crate::{
    entity::{DynamicEntity, TableEntity},
    error::{TableError, TableResult},
    memory::MemoryTableClient,
};

/// Create a row with the given key and no other properties.
#[must_use]
pub fn make_row(partition_key: &str, row_key: &str) -> DynamicEntity {
    DynamicEntity::new(partition_key, row_key)
}

/// Create a deterministic row key from an index.
///
/// Produces keys like `"000042"`, zero-padded so that lexicographic order
/// matches numeric order.
#[must_use]
pub fn make_row_key(idx: usize) -> String {
    format!("{idx:06}")
}

/// Create `count` rows in partition `partition_key`, each carrying an integer
/// `Priority` equal to its index.
#[must_use]
pub fn make_rows(partition_key: &str, count: usize) -> Vec<DynamicEntity> {
    (0..count)
        .map(|idx| make_row(partition_key, &make_row_key(idx)).with("Priority", idx as u64))
        .collect()
}

/// Create a [`MemoryTableClient`] named `name` preloaded with `rows`.
///
/// The rows are kept exactly as supplied, like seed rows.
pub fn seeded_table<T: TableEntity>(name: &str, rows: Vec<T>) -> MemoryTableClient<T> {
    MemoryTableClient::with_rows(name, rows)
}

/// Collect the `(partition_key, row_key)` pairs of `rows`, in order.
pub fn keys_of<'a, T: TableEntity>(rows: impl IntoIterator<Item = &'a T>) -> Vec<(String, String)> {
    rows.into_iter().map(|row| (row.partition_key().to_owned(), row.row_key().to_owned())).collect()
}

/// Assert that a [`TableResult`] is a [`TableError::UnknownTable`].
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use activation_tables::{assert_unknown_table, TableError, TableResult};
///
/// let result: TableResult<()> = Err(TableError::unknown_table("ghost"));
/// assert_unknown_table!(result);
/// ```
#[macro_export]
macro_rules! assert_unknown_table {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::TableError::UnknownTable { .. })),
            "expected TableError::UnknownTable, got: {:?}",
            $result,
        );
    };
    ($result:expr, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::TableError::UnknownTable { .. })),
            "{}: expected TableError::UnknownTable, got: {:?}",
            $msg,
            $result,
        );
    };
}

/// Assert that a [`TableResult`] is a [`TableError::FilterTranslation`].
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use activation_tables::{assert_filter_translation, filter::FilterError, TableError, TableResult};
///
/// let result: TableResult<()> =
///     Err(TableError::filter_translation("a eq", FilterError::UnexpectedEnd));
/// assert_filter_translation!(result);
/// ```
#[macro_export]
macro_rules! assert_filter_translation {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::TableError::FilterTranslation { .. })),
            "expected TableError::FilterTranslation, got: {:?}",
            $result,
        );
    };
    ($result:expr, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::TableError::FilterTranslation { .. })),
            "{}: expected TableError::FilterTranslation, got: {:?}",
            $msg,
            $result,
        );
    };
}

/// Assert that a [`TableResult`] is `Ok`.
///
/// Returns the inner value on success, panics with a descriptive message
/// on failure.
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use activation_tables::{assert_table_ok, TableResult};
///
/// let result: TableResult<i32> = Ok(42);
/// let value = assert_table_ok!(result);
/// assert_eq!(value, 42);
/// ```
#[macro_export]
macro_rules! assert_table_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got TableError: {e:?}"),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("{}: expected Ok, got TableError: {e:?}", $msg),
        }
    };
}

/// Helper to verify that a result is an `UnknownTable` error.
pub fn is_unknown_table<T>(result: &TableResult<T>) -> bool {
    matches!(result, Err(TableError::UnknownTable { .. }))
}

/// Helper to verify that a result is a `FilterTranslation` error.
pub fn is_filter_translation<T>(result: &TableResult<T>) -> bool {
    matches!(result, Err(TableError::FilterTranslation { .. }))
}
