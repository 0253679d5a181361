//! Service-level table lookup.
//!
//! [`TableServiceClient`] mirrors the production SDK's service client: the
//! code-under-test asks it for a table by name and gets back a
//! [`TableClient`]. [`MemoryTableService`] answers from a fixed set of tables
//! registered before the service is handed out.

use std::{
    any::{self, Any},
    collections::BTreeMap,
    fmt,
    sync::Arc,
};

use tracing::debug;

use crate::{
    client::TableClient,
    config::TableBehavior,
    entity::TableEntity,
    error::{TableError, TableResult},
    memory::{InMemoryTable, MemoryTableClient, WriteClock},
};

/// Resolves table clients by name.
pub trait TableServiceClient: Send + Sync {
    /// The client type handed out for tables of `T` rows.
    type Table<T: TableEntity>: TableClient<T>;

    /// Returns the client for table `name`.
    ///
    /// Repeated lookups of one name return clients over the same rows.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownTable`] if no such table exists.
    fn get_table_client<T: TableEntity>(&self, name: &str) -> TableResult<Self::Table<T>>;
}

struct RegisteredTable {
    row_type: &'static str,
    client: Box<dyn Any + Send + Sync>,
}

/// In-memory [`TableServiceClient`].
///
/// Tables are registered up front with [`register`](Self::register); after
/// that the set of names is fixed. Each registered table holds rows of a
/// single type, and lookups must name that type.
///
/// # Example
///
/// ```
/// use activation_tables::{DynamicEntity, MemoryTableService, TableError, TableServiceClient};
///
/// let mut service = MemoryTableService::default();
/// service.register("valid-stores", vec![DynamicEntity::new("US", "001")]).unwrap();
///
/// let stores = service.get_table_client::<DynamicEntity>("valid-stores").unwrap();
/// assert_eq!(stores.len(), 1);
///
/// let missing = service.get_table_client::<DynamicEntity>("ghost");
/// assert!(matches!(missing, Err(TableError::UnknownTable { .. })));
/// ```
pub struct MemoryTableService {
    behavior: TableBehavior,
    clock: Arc<WriteClock>,
    tables: BTreeMap<String, RegisteredTable>,
}

impl fmt::Debug for MemoryTableService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTableService")
            .field("behavior", &self.behavior)
            .field("tables", &self.tables.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryTableService {
    fn default() -> Self {
        Self::new(TableBehavior::default())
    }
}

impl MemoryTableService {
    /// Creates a service with no tables. Every table registered later uses
    /// `behavior` and shares one [`WriteClock`].
    #[must_use]
    pub fn new(behavior: TableBehavior) -> Self {
        Self { behavior, clock: Arc::new(WriteClock::new()), tables: BTreeMap::new() }
    }

    /// The behavior switches applied to every table.
    #[must_use]
    pub fn behavior(&self) -> TableBehavior {
        self.behavior
    }

    /// Registers table `name` holding `rows`, kept exactly as supplied.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::TableAlreadyRegistered`] if `name` is taken.
    pub fn register<T: TableEntity>(
        &mut self,
        name: impl Into<String>,
        rows: Vec<T>,
    ) -> TableResult<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(TableError::already_registered(name));
        }

        debug!(table = %name, rows = rows.len(), row_type = any::type_name::<T>(), "registering table");
        let client = MemoryTableClient::from_parts(
            name.clone(),
            InMemoryTable::from_rows(rows),
            self.behavior,
            Arc::clone(&self.clock),
        );
        self.tables.insert(name, RegisteredTable {
            row_type: any::type_name::<T>(),
            client: Box::new(client),
        });
        Ok(())
    }

    /// Registered table names, in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Returns `true` if a table named `name` is registered.
    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}

impl TableServiceClient for MemoryTableService {
    type Table<T: TableEntity> = MemoryTableClient<T>;

    /// # Errors
    ///
    /// Returns [`TableError::UnknownTable`] if no such table was registered,
    /// or [`TableError::EntityTypeMismatch`] if it holds rows other than `T`.
    #[tracing::instrument(skip(self))]
    fn get_table_client<T: TableEntity>(&self, name: &str) -> TableResult<MemoryTableClient<T>> {
        let registered = self.tables.get(name).ok_or_else(|| TableError::unknown_table(name))?;
        registered.client.downcast_ref::<MemoryTableClient<T>>().cloned().ok_or_else(|| {
            TableError::EntityTypeMismatch {
                table: name.to_owned(),
                requested: any::type_name::<T>(),
                registered: registered.row_type,
            }
        })
    }
}
