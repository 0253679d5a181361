//! The container handed to code-under-test.
//!
//! [`TestServices`] plays the part of the dependency-injection container a
//! test builds: it seeds the fake table service, optionally adds the
//! project-activation fake, and hands both out behind `Arc`s. Build a fresh
//! one per test; instances share nothing.
//!
//! # Example
//!
//! ```
//! use activation_harness::{
//!     ProjectActivationClient, ProjectFacility, TestServices, ValidStoreEntity, tables,
//! };
//! use activation_tables::{QueryOptions, TableClient, TableServiceClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let services = TestServices::builder()
//!         .seed(vec![ValidStoreEntity::new("US", "001").into()])
//!         .facilities(vec![ProjectFacility::new("001", "TX")])
//!         .build()?;
//!
//!     let stores = services
//!         .table_service()
//!         .get_table_client::<ValidStoreEntity>(tables::VALID_STORES)?;
//!     let us = stores.query_filter("PartitionKey eq 'US'", QueryOptions::default()).await?;
//!     assert_eq!(us.len(), 1);
//!
//!     let facilities = services.activation_client()?.get_all_project_facilities().await?;
//!     assert_eq!(facilities.len(), 1);
//!     Ok(())
//! }
//! ```

use std::{fmt, sync::Arc};

use activation_tables::{
    MemoryTableClient, MemoryTableService, TableEntity, TableError, TableServiceClient,
};
use tracing::debug;

use crate::{
    config::HarnessConfig,
    entities::{ActivationEntity, EntityKind},
    error::{HarnessError, HarnessResult},
    facility::{FakeProjectActivationClient, ProjectActivationClient, ProjectFacility},
    logging::init_test_logging,
    seed::SeedDispatcher,
};

/// Fakes for one test, ready to hand to the code-under-test.
pub struct TestServices {
    config: HarnessConfig,
    table_service: Arc<MemoryTableService>,
    activation_client: Option<Arc<dyn ProjectActivationClient>>,
}

impl fmt::Debug for TestServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestServices")
            .field("config", &self.config)
            .field("table_service", &self.table_service)
            .field("activation_client", &self.activation_client.is_some())
            .finish()
    }
}

#[bon::bon]
impl TestServices {
    /// Builds the fakes.
    ///
    /// Initializes test logging, routes `seed` into one table per bound
    /// kind, and registers the project-activation fake only if `facilities`
    /// is set.
    ///
    /// # Optional Fields
    ///
    /// * `seed` - Rows to preload (default: none; every bound table is still created).
    /// * `facilities` - Facilities for the project-activation fake (default: no fake).
    /// * `config` - Harness configuration (default: [`HarnessConfig::default`]).
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnboundSeedKind`] if a seed row cannot be
    /// placed and the configuration rejects unbound seeds.
    #[builder]
    pub fn new(
        #[builder(default)] seed: Vec<ActivationEntity>,
        facilities: Option<Vec<ProjectFacility>>,
        #[builder(default)] config: HarnessConfig,
    ) -> HarnessResult<Self> {
        init_test_logging();

        let partitions = SeedDispatcher::new(&config).dispatch(seed)?;
        let mut service = MemoryTableService::new(config.table_behavior());
        partitions.register_into(&mut service, config.bindings())?;

        let activation_client = facilities.map(|facilities| {
            Arc::new(FakeProjectActivationClient::new(facilities))
                as Arc<dyn ProjectActivationClient>
        });

        debug!(
            tables = config.bindings().len(),
            activation_client = activation_client.is_some(),
            "built test services"
        );
        Ok(Self { config, table_service: Arc::new(service), activation_client })
    }

    /// The fake table service.
    #[must_use]
    pub fn table_service(&self) -> Arc<MemoryTableService> {
        Arc::clone(&self.table_service)
    }

    /// The table client for `kind`, resolved through its configured binding.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Table`] if `kind` is unbound or `T` is not the
    /// row type of that table.
    pub fn table<T: TableEntity>(&self, kind: EntityKind) -> HarnessResult<MemoryTableClient<T>> {
        let name = self
            .config
            .table_name(kind)
            .ok_or_else(|| TableError::unknown_table(kind.default_table_name()))?;
        Ok(self.table_service.get_table_client::<T>(name)?)
    }

    /// The project-activation fake.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ServiceNotRegistered`] if the services were
    /// built without facilities.
    pub fn activation_client(&self) -> HarnessResult<Arc<dyn ProjectActivationClient>> {
        self.activation_client
            .clone()
            .ok_or_else(|| HarnessError::service_not_registered("ProjectActivationClient"))
    }

    /// The configuration the services were built with.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }
}
