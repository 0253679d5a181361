//! In-memory fake of a cloud table store, for hermetic service tests.
//!
//! Production code talks to a key-partitioned row store through a service
//! client (look up a table by name) and a table client (add, upsert, delete,
//! query). This crate provides in-memory implementations of both, so that
//! code written against those two traits can run in unit tests without a
//! network and against whatever rows the test seeds.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Code under test                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TableServiceClient::get_table_client::<T>(name)            │
//! │                 MemoryTableService                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TableClient<T>: add / upsert / delete / query / filter     │
//! │                 MemoryTableClient<T>                        │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  InMemoryTable<T>            │  filter::translate           │
//! │  (rows in insertion order)   │  (OData → expression tree)   │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use activation_tables::{
//!     DynamicEntity, MemoryTableService, QueryOptions, TableClient, TableServiceClient,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut service = MemoryTableService::default();
//!     service.register(
//!         "valid-stores",
//!         vec![
//!             DynamicEntity::new("US", "001"),
//!             DynamicEntity::new("US", "002"),
//!             DynamicEntity::new("CA", "001"),
//!         ],
//!     )?;
//!
//!     let stores = service.get_table_client::<DynamicEntity>("valid-stores")?;
//!     let us = stores.query_filter("PartitionKey eq 'US'", QueryOptions::default()).await?;
//!     assert_eq!(us.len(), 2);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Fidelity
//!
//! The fake is permissive where the production store is strict. Deleting a
//! missing row succeeds, optimistic-concurrency tags are never checked, and
//! paging and projection options are ignored. Duplicate adds and merge
//! upserts follow [`TableBehavior`]; see [`config`] for the switches.
//!
//! # Error Handling
//!
//! All operations return [`TableResult<T>`]. Only unknown tables, mismatched
//! row types, untranslatable filters and (when configured) duplicate keys
//! surface as [`TableError`]s.
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module (row builders, seeded tables, assertion macros)
//!   and the `conformance` suite. Enable this in `[dev-dependencies]` for integration tests.

#![deny(unsafe_code)]

pub mod client;
pub mod config;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod conformance;
pub mod entity;
pub mod error;
pub mod filter;
pub mod memory;
pub mod pageable;
pub mod service;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;

// Re-export primary types at crate root for convenience
pub use client::{QueryOptions, STATUS_NO_CONTENT, TableClient, TableResponse, UpdateMode};
pub use config::{DuplicateKeyPolicy, MergeBehavior, TableBehavior};
pub use entity::{DynamicEntity, ETag, EntityMetadata, EntityProperties, TableEntity};
pub use error::{BoxError, TableError, TableResult};
pub use filter::{Filter, FilterError};
pub use memory::{InMemoryTable, MemoryTableClient, WriteClock};
pub use pageable::{Page, Pageable};
pub use service::{MemoryTableService, TableServiceClient};
