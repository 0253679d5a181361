//! In-memory table implementation.
//!
//! This module provides [`MemoryTableClient`], an in-memory implementation of
//! [`TableClient`] backed by an [`InMemoryTable`].
//!
//! # Features
//!
//! - **Stable handle**: rows live behind one [`Arc`]ed [`parking_lot::RwLock`] that every clone of
//!   the table shares and every operation mutates in place
//! - **Insertion order**: rows are kept in a `Vec`; scans return them in the order they were
//!   appended, after removals
//! - **Snapshot reads**: query results are copied out under the read lock, so later writes never
//!   change a result that was already returned
//! - **Write stamping**: writes assign a strictly increasing `Timestamp` and a matching `odata.etag`
//!   from a [`WriteClock`] shared by every table of a service
//!
//! # Example
//!
//! ```
//! use activation_tables::{
//!     DynamicEntity, MemoryTableClient, QueryOptions, TableClient, UpdateMode,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let table = MemoryTableClient::<DynamicEntity>::new("store-activation-state");
//!
//! table.add_entity(DynamicEntity::new("A", "X").with("Status", "Pending")).await.unwrap();
//! table
//!     .upsert_entity(DynamicEntity::new("A", "X").with("Status", "Active"), UpdateMode::Merge)
//!     .await
//!     .unwrap();
//!
//! let rows = table.query(|_| true, QueryOptions::default()).await.unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows.first().unwrap().get("Status"), Some(&"Active".into()));
//! # });
//! ```
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | add_entity | O(1), O(n) when rejecting duplicates |
//! | upsert_entity | O(n) |
//! | delete_entity | O(n) |
//! | query / query_filter | O(n) |

use std::{any, fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::{
    client::{QueryOptions, TableClient, TableResponse, UpdateMode},
    config::{DuplicateKeyPolicy, MergeBehavior, TableBehavior},
    entity::{ETag, TableEntity},
    error::{TableError, TableResult},
    filter,
    pageable::Pageable,
};

/// Source of write timestamps.
///
/// Every call to [`tick`](Self::tick) returns a timestamp strictly later than
/// the previous one, at microsecond resolution, even when the system clock
/// stands still or steps backwards.
#[derive(Debug, Default)]
pub struct WriteClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl WriteClock {
    /// Creates a clock that has not ticked yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next write timestamp.
    pub fn tick(&self) -> DateTime<Utc> {
        let mut last = self.last.lock();
        let now = Utc::now().trunc_subsecs(6);
        let next = match *last {
            Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}

/// An ordered collection of rows behind a shared lock.
///
/// Cloning yields another handle to the same rows.
pub struct InMemoryTable<T> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for InMemoryTable<T> {
    fn clone(&self) -> Self {
        Self { rows: Arc::clone(&self.rows) }
    }
}

impl<T> fmt::Debug for InMemoryTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTable").field("len", &self.rows.read().len()).finish()
    }
}

impl<T> Default for InMemoryTable<T> {
    fn default() -> Self {
        Self::from_rows(Vec::new())
    }
}

impl<T> InMemoryTable<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding `rows` in the given order, exactly as supplied.
    #[must_use]
    pub fn from_rows(rows: Vec<T>) -> Self {
        Self { rows: Arc::new(RwLock::new(rows)) }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns `true` if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl<T: TableEntity> InMemoryTable<T> {
    /// Copies out every row in table order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.rows.read().clone()
    }

    /// Number of rows with the given key. More than one is possible when
    /// duplicates are appended.
    #[must_use]
    pub fn count_key(&self, partition_key: &str, row_key: &str) -> usize {
        self.rows.read().iter().filter(|row| row.has_key(partition_key, row_key)).count()
    }
}

/// In-memory [`TableClient`] bound to one table name.
///
/// # Cloning
///
/// `MemoryTableClient` is cheaply cloneable. All clones share the same rows,
/// so a client handed to the code-under-test and a client kept by the test
/// observe each other's writes.
pub struct MemoryTableClient<T> {
    name: Arc<str>,
    table: InMemoryTable<T>,
    behavior: TableBehavior,
    clock: Arc<WriteClock>,
}

impl<T> Clone for MemoryTableClient<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            table: self.table.clone(),
            behavior: self.behavior,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T> fmt::Debug for MemoryTableClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTableClient")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl<T: TableEntity> MemoryTableClient<T> {
    /// Creates an empty table with default behavior and its own clock.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_rows(name, Vec::new())
    }

    /// Creates a table preloaded with `rows`, which are kept exactly as
    /// supplied (no stamping, no duplicate check).
    pub fn with_rows(name: impl Into<String>, rows: Vec<T>) -> Self {
        Self::from_parts(
            name,
            InMemoryTable::from_rows(rows),
            TableBehavior::default(),
            Arc::new(WriteClock::new()),
        )
    }

    /// Binds an existing table to `name`.
    pub fn from_parts(
        name: impl Into<String>,
        table: InMemoryTable<T>,
        behavior: TableBehavior,
        clock: Arc<WriteClock>,
    ) -> Self {
        let name: String = name.into();
        Self { name: name.into(), table, behavior, clock }
    }

    /// Replaces the behavior switches.
    #[must_use]
    pub fn with_behavior(mut self, behavior: TableBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// The behavior switches in effect.
    #[must_use]
    pub fn behavior(&self) -> TableBehavior {
        self.behavior
    }

    /// The underlying table handle.
    #[must_use]
    pub fn table(&self) -> &InMemoryTable<T> {
        &self.table
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Copies out every row in table order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.table.snapshot()
    }

    /// Assigns `Timestamp` and `odata.etag` if stamping is enabled.
    fn stamp(&self, entity: &mut T) -> Option<ETag> {
        if !self.behavior.stamp_writes {
            return None;
        }
        let timestamp = self.clock.tick();
        let etag = ETag::from_timestamp(timestamp);
        let metadata = entity.metadata_mut();
        metadata.timestamp = Some(timestamp);
        metadata.etag = Some(etag.clone());
        Some(etag)
    }

    fn log_ignored_options(&self, options: &QueryOptions) {
        if options.is_set() {
            debug!(
                table = %self.name,
                max_per_page = ?options.max_per_page,
                select = ?options.select,
                "query options are not applied by the in-memory table"
            );
        }
    }
}

/// Overlays `incoming` onto `existing`, keeping properties the incoming row
/// leaves absent or null.
fn merge_fieldwise<T: TableEntity>(existing: &T, incoming: &T) -> TableResult<T> {
    let mut merged = existing.properties()?;
    merged.merge_from(incoming.properties()?);
    merged.into_entity()
}

#[async_trait]
impl<T: TableEntity> TableClient<T> for MemoryTableClient<T> {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self, entity), fields(table = %self.name))]
    async fn add_entity(&self, mut entity: T) -> TableResult<TableResponse> {
        let mut rows = self.table.rows.write();

        let duplicate = rows.iter().any(|row| row.has_key(entity.partition_key(), entity.row_key()));
        if duplicate {
            match self.behavior.duplicate_keys {
                DuplicateKeyPolicy::Reject => {
                    return Err(TableError::already_exists(
                        entity.partition_key(),
                        entity.row_key(),
                    ));
                },
                DuplicateKeyPolicy::Append => {
                    debug!(
                        partition_key = entity.partition_key(),
                        row_key = entity.row_key(),
                        "appending row with an existing key"
                    );
                },
            }
        }

        let etag = self.stamp(&mut entity);
        rows.push(entity);
        Ok(TableResponse::no_content(etag))
    }

    #[tracing::instrument(skip(self, entity), fields(table = %self.name))]
    async fn upsert_entity(&self, entity: T, mode: UpdateMode) -> TableResult<TableResponse> {
        let mut rows = self.table.rows.write();

        let existing = rows.iter().find(|row| row.has_key(entity.partition_key(), entity.row_key()));
        let mut entity = match (mode, self.behavior.merge, existing) {
            (UpdateMode::Merge, MergeBehavior::FieldWise, Some(existing)) => {
                merge_fieldwise(existing, &entity)?
            },
            _ => entity,
        };

        let before = rows.len();
        rows.retain(|row| !row.has_key(entity.partition_key(), entity.row_key()));
        debug!(replaced = before - rows.len(), "upserting row");

        let etag = self.stamp(&mut entity);
        rows.push(entity);
        Ok(TableResponse::no_content(etag))
    }

    #[tracing::instrument(skip(self, if_match), fields(table = %self.name))]
    async fn delete_entity(
        &self,
        partition_key: &str,
        row_key: &str,
        if_match: Option<&ETag>,
    ) -> TableResult<TableResponse> {
        if let Some(etag) = if_match {
            debug!(%etag, "if-match is not enforced by the in-memory table");
        }

        let mut rows = self.table.rows.write();
        let before = rows.len();
        rows.retain(|row| !row.has_key(partition_key, row_key));
        debug!(removed = before - rows.len(), "deleted rows");

        Ok(TableResponse::no_content(None))
    }

    #[tracing::instrument(skip(self, predicate, options), fields(table = %self.name))]
    async fn query<P>(&self, predicate: P, options: QueryOptions) -> TableResult<Pageable<T>>
    where
        P: Fn(&T) -> bool + Send + Sync,
    {
        debug!(predicate = any::type_name::<P>(), "querying with predicate");
        self.log_ignored_options(&options);

        let rows = self.table.rows.read();
        let matches: Vec<T> = rows.iter().filter(|row| predicate(row)).cloned().collect();
        Ok(Pageable::new(matches))
    }

    #[tracing::instrument(skip(self, options), fields(table = %self.name))]
    async fn query_filter(&self, filter: &str, options: QueryOptions) -> TableResult<Pageable<T>> {
        self.log_ignored_options(&options);

        if filter.trim().is_empty() {
            return Ok(Pageable::new(self.table.snapshot()));
        }

        let translated =
            filter::translate(filter).map_err(|err| TableError::filter_translation(filter, err))?;
        debug!(expr = ?translated.expr(), "translated filter");

        let rows = self.table.rows.read();
        let mut matches = Vec::new();
        for row in rows.iter() {
            if translated.matches(row).map_err(|err| TableError::filter_translation(filter, err))? {
                matches.push(row.clone());
            }
        }
        Ok(Pageable::new(matches))
    }
}
