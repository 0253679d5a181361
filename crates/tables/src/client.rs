//! Table client trait definition.
//!
//! [`TableClient`] is the per-table operation surface the code-under-test
//! uses, shaped after the production SDK's table client: add, upsert, delete,
//! and two kinds of query. [`MemoryTableClient`](crate::MemoryTableClient) is
//! the in-memory implementation.
//!
//! # Accepted but ignored
//!
//! Several arguments exist only so that calls written against the production
//! SDK carry over unchanged. The fake accepts them and does not act on them:
//!
//! | Argument | Production meaning | Fake |
//! |----------|--------------------|------|
//! | `if_match` on delete | Optimistic concurrency | Ignored |
//! | [`QueryOptions::max_per_page`] | Page size | All matches on one page |
//! | [`QueryOptions::select`] | Projection | All properties returned |
//! | [`QueryOptions::cancellation`] | Cancel a long query | Nothing to cancel |
//! | [`UpdateMode::Merge`] | Field-wise merge | See [`MergeBehavior`](crate::MergeBehavior) |

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    entity::{ETag, TableEntity},
    error::TableResult,
    pageable::Pageable,
};

/// HTTP status the production store answers writes with.
pub const STATUS_NO_CONTENT: u16 = 204;

/// How an upsert combines the incoming row with a stored one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    /// Merge the incoming properties into the stored row.
    #[default]
    Merge,
    /// Replace the stored row.
    Replace,
}

/// Options accepted by the query operations.
///
/// The fake ignores all of them; see the [module docs](self).
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct QueryOptions {
    /// Requested page size.
    pub max_per_page: Option<u32>,

    /// Properties to project.
    pub select: Option<Vec<String>>,

    /// Cancellation signal for the query.
    pub cancellation: Option<CancellationToken>,
}

impl QueryOptions {
    /// Returns `true` if any option is set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.max_per_page.is_some() || self.select.is_some() || self.cancellation.is_some()
    }
}

/// Acknowledgement of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableResponse {
    /// HTTP-style status code. Always [`STATUS_NO_CONTENT`] from the fake.
    pub status: u16,

    /// Version tag of the written row, or `None` for deletes and unstamped
    /// writes.
    pub etag: Option<ETag>,
}

impl TableResponse {
    /// A `204 No Content` acknowledgement.
    #[must_use]
    pub fn no_content(etag: Option<ETag>) -> Self {
        Self { status: STATUS_NO_CONTENT, etag }
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Operations on one named table of rows of type `T`.
///
/// # Key Operations
///
/// | Method | Description |
/// |--------|-------------|
/// | [`add_entity`](TableClient::add_entity) | Append a row |
/// | [`upsert_entity`](TableClient::upsert_entity) | Insert or overwrite by key |
/// | [`delete_entity`](TableClient::delete_entity) | Remove by key; absent rows are not an error |
/// | [`query`](TableClient::query) | Rows matching a typed predicate |
/// | [`query_filter`](TableClient::query_filter) | Rows matching an OData filter |
///
/// # Example
///
/// ```
/// use activation_tables::{DynamicEntity, MemoryTableClient, QueryOptions, TableClient};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let table = MemoryTableClient::<DynamicEntity>::new("stores");
/// table.add_entity(DynamicEntity::new("US", "001")).await.unwrap();
/// table.add_entity(DynamicEntity::new("CA", "001")).await.unwrap();
///
/// let us = table.query_filter("PartitionKey eq 'US'", QueryOptions::default()).await.unwrap();
/// assert_eq!(us.len(), 1);
/// # });
/// ```
#[async_trait]
pub trait TableClient<T: TableEntity>: Send + Sync {
    /// Name the table is registered under.
    fn name(&self) -> &str;

    /// Appends a row.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::EntityAlreadyExists`](crate::TableError::EntityAlreadyExists)
    /// if the key is taken and the table rejects duplicates.
    #[must_use = "table operations may fail and errors must be handled"]
    async fn add_entity(&self, entity: T) -> TableResult<TableResponse>;

    /// Writes a row, removing any stored row with the same key first.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Serialization`](crate::TableError::Serialization)
    /// if a field-wise merge cannot combine the rows.
    #[must_use = "table operations may fail and errors must be handled"]
    async fn upsert_entity(&self, entity: T, mode: UpdateMode) -> TableResult<TableResponse>;

    /// Removes the row with this key. Succeeds whether or not it exists.
    ///
    /// # Errors
    ///
    /// The in-memory implementation never fails.
    #[must_use = "table operations may fail and errors must be handled"]
    async fn delete_entity(
        &self,
        partition_key: &str,
        row_key: &str,
        if_match: Option<&ETag>,
    ) -> TableResult<TableResponse>;

    /// Returns every row for which `predicate` holds, in table order.
    ///
    /// # Errors
    ///
    /// The in-memory implementation never fails.
    #[must_use = "table operations may fail and errors must be handled"]
    async fn query<P>(&self, predicate: P, options: QueryOptions) -> TableResult<Pageable<T>>
    where
        P: Fn(&T) -> bool + Send + Sync;

    /// Returns every row matching an OData `filter`, in table order.
    ///
    /// An empty (or all-whitespace) filter matches every row.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::FilterTranslation`](crate::TableError::FilterTranslation)
    /// if the filter cannot be translated, or cannot be evaluated against a
    /// row. The table is unchanged either way.
    #[must_use = "table operations may fail and errors must be handled"]
    async fn query_filter(&self, filter: &str, options: QueryOptions) -> TableResult<Pageable<T>>;
}
