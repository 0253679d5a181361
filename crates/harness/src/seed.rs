//! Routing of seed rows into typed tables.
//!
//! A test supplies one flat list of [`ActivationEntity`] rows. The
//! [`SeedDispatcher`] splits it by [`EntityKind`], keeping the input order
//! within each kind, and the resulting [`SeedPartitions`] registers one
//! table per bound kind on a [`MemoryTableService`].
//!
//! Seed rows are not checked for duplicate keys and are stored exactly as
//! supplied, without write stamps.

use std::collections::BTreeMap;

use activation_tables::{MemoryTableService, TableEntity};
use tracing::debug;

use crate::{
    config::{HarnessConfig, UnboundSeedPolicy},
    entities::{
        ActivationEntity, BrandAccessControlEntity, BrandLevelActivationRequestEntity,
        ContractTypeAccessControlEntity, ContractTypeLevelActivationRequestEntity, EntityKind,
        FeatureActivationRequestEntity, StoreAccessControlEntity, StoreActivationRequestEntity,
        StoreActivationStateEntity, ValidStoreEntity,
    },
    error::{HarnessError, HarnessResult},
};

/// Splits seed rows by kind according to a [`HarnessConfig`].
#[derive(Debug, Clone, Copy)]
pub struct SeedDispatcher<'a> {
    config: &'a HarnessConfig,
}

impl<'a> SeedDispatcher<'a> {
    /// Creates a dispatcher using the bindings and unbound-seed policy of `config`.
    #[must_use]
    pub fn new(config: &'a HarnessConfig) -> Self {
        Self { config }
    }

    /// Partitions `seed` by kind, preserving input order within each kind.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnboundSeedKind`] for the first row whose kind
    /// has no table binding, if the configuration rejects unbound seeds.
    pub fn dispatch<I>(&self, seed: I) -> HarnessResult<SeedPartitions>
    where
        I: IntoIterator<Item = ActivationEntity>,
    {
        let mut partitions = SeedPartitions::default();
        for row in seed {
            let kind = row.kind();
            if self.config.table_name(kind).is_none() {
                match self.config.unbound_seeds() {
                    UnboundSeedPolicy::Ignore => {
                        debug!(
                            %kind,
                            partition_key = row.partition_key(),
                            row_key = row.row_key(),
                            "ignoring seed row with no table binding"
                        );
                        partitions.ignored += 1;
                        continue;
                    },
                    UnboundSeedPolicy::Reject => return Err(HarnessError::UnboundSeedKind { kind }),
                }
            }
            partitions.push(row);
        }

        debug!(rows = partitions.total(), ignored = partitions.ignored, "dispatched seed rows");
        Ok(partitions)
    }
}

/// Seed rows grouped by kind, ready to become tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedPartitions {
    valid_stores: Vec<ValidStoreEntity>,
    brand_level_activation_requests: Vec<BrandLevelActivationRequestEntity>,
    brand_access_controls: Vec<BrandAccessControlEntity>,
    contract_type_level_activation_requests: Vec<ContractTypeLevelActivationRequestEntity>,
    contract_type_access_controls: Vec<ContractTypeAccessControlEntity>,
    store_activation_state: Vec<StoreActivationStateEntity>,
    store_activation_requests: Vec<StoreActivationRequestEntity>,
    store_access_controls: Vec<StoreAccessControlEntity>,
    feature_activation_requests: Vec<FeatureActivationRequestEntity>,
    ignored: usize,
}

impl SeedPartitions {
    fn push(&mut self, row: ActivationEntity) {
        match row {
            ActivationEntity::ValidStore(e) => self.valid_stores.push(e),
            ActivationEntity::BrandLevelActivationRequest(e) => {
                self.brand_level_activation_requests.push(e);
            },
            ActivationEntity::BrandAccessControl(e) => self.brand_access_controls.push(e),
            ActivationEntity::ContractTypeLevelActivationRequest(e) => {
                self.contract_type_level_activation_requests.push(e);
            },
            ActivationEntity::ContractTypeAccessControl(e) => {
                self.contract_type_access_controls.push(e);
            },
            ActivationEntity::StoreActivationState(e) => self.store_activation_state.push(e),
            ActivationEntity::StoreActivationRequest(e) => self.store_activation_requests.push(e),
            ActivationEntity::StoreAccessControl(e) => self.store_access_controls.push(e),
            ActivationEntity::FeatureActivationRequest(e) => {
                self.feature_activation_requests.push(e);
            },
        }
    }

    /// Number of rows of `kind`.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::ValidStore => self.valid_stores.len(),
            EntityKind::BrandLevelActivationRequest => self.brand_level_activation_requests.len(),
            EntityKind::BrandAccessControl => self.brand_access_controls.len(),
            EntityKind::ContractTypeLevelActivationRequest => {
                self.contract_type_level_activation_requests.len()
            },
            EntityKind::ContractTypeAccessControl => self.contract_type_access_controls.len(),
            EntityKind::StoreActivationState => self.store_activation_state.len(),
            EntityKind::StoreActivationRequest => self.store_activation_requests.len(),
            EntityKind::StoreAccessControl => self.store_access_controls.len(),
            EntityKind::FeatureActivationRequest => self.feature_activation_requests.len(),
        }
    }

    /// Number of placed rows across all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        EntityKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    /// Number of rows dropped because their kind had no binding.
    #[must_use]
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Registers one table per kind in `bindings` on `service`.
    ///
    /// Every bound kind gets a table, including kinds with no seed rows, so
    /// the code-under-test can write to any known table.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Table`] if a bound name is already registered
    /// on `service`.
    pub fn register_into(
        self,
        service: &mut MemoryTableService,
        bindings: &BTreeMap<EntityKind, String>,
    ) -> HarnessResult<()> {
        register(service, bindings, EntityKind::ValidStore, self.valid_stores)?;
        register(
            service,
            bindings,
            EntityKind::BrandLevelActivationRequest,
            self.brand_level_activation_requests,
        )?;
        register(service, bindings, EntityKind::BrandAccessControl, self.brand_access_controls)?;
        register(
            service,
            bindings,
            EntityKind::ContractTypeLevelActivationRequest,
            self.contract_type_level_activation_requests,
        )?;
        register(
            service,
            bindings,
            EntityKind::ContractTypeAccessControl,
            self.contract_type_access_controls,
        )?;
        register(service, bindings, EntityKind::StoreActivationState, self.store_activation_state)?;
        register(
            service,
            bindings,
            EntityKind::StoreActivationRequest,
            self.store_activation_requests,
        )?;
        register(service, bindings, EntityKind::StoreAccessControl, self.store_access_controls)?;
        register(
            service,
            bindings,
            EntityKind::FeatureActivationRequest,
            self.feature_activation_requests,
        )?;
        Ok(())
    }
}

fn register<T: TableEntity>(
    service: &mut MemoryTableService,
    bindings: &BTreeMap<EntityKind, String>,
    kind: EntityKind,
    rows: Vec<T>,
) -> HarnessResult<()> {
    match bindings.get(&kind) {
        Some(name) => service.register(name.clone(), rows)?,
        None => debug!(%kind, "no table binding, skipping"),
    }
    Ok(())
}
