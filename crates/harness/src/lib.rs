//! Feature-activation test harness.
//!
//! Service-layer code for feature activation reads and writes nine tables in
//! a partitioned cloud table store and calls a project-activation directory
//! service. This crate builds hermetic stand-ins for both: it routes a flat
//! list of seed rows into typed fake tables from [`activation_tables`], binds
//! each table to its production name, and optionally adds a fake directory
//! client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  seed: Vec<ActivationEntity>       facilities (optional)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SeedDispatcher ── by EntityKind ──► SeedPartitions         │
//! │                                      (order kept per kind)  │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  MemoryTableService          │  FakeProjectActivationClient │
//! │  (one table per binding)     │                              │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │                       TestServices                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use activation_harness::{
//!     ActivationStatus, StoreActivationRequestEntity, TestServices, tables,
//! };
//! use activation_tables::{QueryOptions, TableClient, TableServiceClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pending = StoreActivationRequestEntity::new("001", "r1");
//!     let active = StoreActivationRequestEntity {
//!         status: ActivationStatus::Active,
//!         ..StoreActivationRequestEntity::new("001", "r2")
//!     };
//!     let services = TestServices::builder().seed(vec![pending.into(), active.into()]).build()?;
//!
//!     let requests = services
//!         .table_service()
//!         .get_table_client::<StoreActivationRequestEntity>(tables::STORE_ACTIVATION_REQUESTS)?;
//!     let found = requests.query_filter("Status eq 'Active'", QueryOptions::default()).await?;
//!     assert_eq!(found.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Building and lookups return [`HarnessResult<T>`]. Table failures pass
//! through as [`HarnessError::Table`].

#![deny(unsafe_code)]

pub mod config;
pub mod entities;
pub mod error;
pub mod facility;
pub mod logging;
pub mod provider;
pub mod seed;
pub mod tables;

pub use config::{HarnessConfig, UnboundSeedPolicy};
pub use entities::{
    ActivationEntity, ActivationScope, ActivationStatus, BrandAccessControlEntity,
    BrandLevelActivationRequestEntity, ContractTypeAccessControlEntity,
    ContractTypeLevelActivationRequestEntity, EntityKind, FeatureActivationRequestEntity,
    StoreAccessControlEntity, StoreActivationRequestEntity, StoreActivationStateEntity,
    ValidStoreEntity,
};
pub use error::{HarnessError, HarnessResult};
pub use facility::{
    FAKE_SECURITY_GROUP_ID, FakeProjectActivationClient, PilotStore, ProjectActivationClient,
    ProjectFacility, SecurityGroup,
};
pub use logging::init_test_logging;
pub use provider::TestServices;
pub use seed::{SeedDispatcher, SeedPartitions};
