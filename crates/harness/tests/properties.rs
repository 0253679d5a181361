//! Property tests for seed dispatch.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use activation_harness::{
    ActivationEntity, BrandAccessControlEntity, BrandLevelActivationRequestEntity,
    ContractTypeAccessControlEntity, ContractTypeLevelActivationRequestEntity, EntityKind,
    FeatureActivationRequestEntity, HarnessConfig, SeedDispatcher, StoreAccessControlEntity,
    StoreActivationRequestEntity, StoreActivationStateEntity, ValidStoreEntity,
};
use activation_tables::{MemoryTableService, TableEntity, TableServiceClient};
use proptest::prelude::*;

fn make(kind: EntityKind, partition_key: String, row_key: String) -> ActivationEntity {
    match kind {
        EntityKind::ValidStore => ValidStoreEntity::new(partition_key, row_key).into(),
        EntityKind::BrandLevelActivationRequest => {
            BrandLevelActivationRequestEntity::new(partition_key, row_key).into()
        },
        EntityKind::BrandAccessControl => {
            BrandAccessControlEntity::new(partition_key, row_key).into()
        },
        EntityKind::ContractTypeLevelActivationRequest => {
            ContractTypeLevelActivationRequestEntity::new(partition_key, row_key).into()
        },
        EntityKind::ContractTypeAccessControl => {
            ContractTypeAccessControlEntity::new(partition_key, row_key).into()
        },
        EntityKind::StoreActivationState => {
            StoreActivationStateEntity::new(partition_key, row_key).into()
        },
        EntityKind::StoreActivationRequest => {
            StoreActivationRequestEntity::new(partition_key, row_key).into()
        },
        EntityKind::StoreAccessControl => {
            StoreAccessControlEntity::new(partition_key, row_key).into()
        },
        EntityKind::FeatureActivationRequest => {
            FeatureActivationRequestEntity::new(partition_key, row_key).into()
        },
    }
}

fn arb_row() -> impl Strategy<Value = ActivationEntity> {
    (0..EntityKind::ALL.len(), "[A-C]", "[0-9]{1,2}")
        .prop_map(|(idx, pk, rk)| make(EntityKind::ALL[idx], pk, rk))
}

fn keys_of_kind(seed: &[ActivationEntity], kind: EntityKind) -> Vec<(String, String)> {
    seed.iter()
        .filter(|row| row.kind() == kind)
        .map(|row| (row.partition_key().to_owned(), row.row_key().to_owned()))
        .collect()
}

fn table_keys<T: TableEntity>(service: &MemoryTableService, name: &str) -> Vec<(String, String)> {
    let client = service.get_table_client::<T>(name).unwrap();
    client
        .snapshot()
        .iter()
        .map(|row| (row.partition_key().to_owned(), row.row_key().to_owned()))
        .collect()
}

fn registered_keys(service: &MemoryTableService, kind: EntityKind) -> Vec<(String, String)> {
    let name = kind.default_table_name();
    match kind {
        EntityKind::ValidStore => table_keys::<ValidStoreEntity>(service, name),
        EntityKind::BrandLevelActivationRequest => {
            table_keys::<BrandLevelActivationRequestEntity>(service, name)
        },
        EntityKind::BrandAccessControl => table_keys::<BrandAccessControlEntity>(service, name),
        EntityKind::ContractTypeLevelActivationRequest => {
            table_keys::<ContractTypeLevelActivationRequestEntity>(service, name)
        },
        EntityKind::ContractTypeAccessControl => {
            table_keys::<ContractTypeAccessControlEntity>(service, name)
        },
        EntityKind::StoreActivationState => table_keys::<StoreActivationStateEntity>(service, name),
        EntityKind::StoreActivationRequest => {
            table_keys::<StoreActivationRequestEntity>(service, name)
        },
        EntityKind::StoreAccessControl => table_keys::<StoreAccessControlEntity>(service, name),
        EntityKind::FeatureActivationRequest => {
            table_keys::<FeatureActivationRequestEntity>(service, name)
        },
    }
}

proptest! {
    /// Every seed row lands in exactly one table, the one bound to its kind,
    /// in input order.
    #[test]
    fn prop_dispatch_is_total_and_order_preserving(
        seed in prop::collection::vec(arb_row(), 0..40),
    ) {
        let config = HarnessConfig::default();
        let partitions = SeedDispatcher::new(&config).dispatch(seed.clone()).unwrap();
        prop_assert_eq!(partitions.total(), seed.len());
        prop_assert_eq!(partitions.ignored(), 0);

        let mut service = MemoryTableService::new(config.table_behavior());
        partitions.register_into(&mut service, config.bindings()).unwrap();

        for kind in EntityKind::ALL {
            prop_assert_eq!(registered_keys(&service, kind), keys_of_kind(&seed, kind));
        }
    }

    /// Under the default policy, rows of unbound kinds are counted as
    /// ignored and nothing else changes.
    #[test]
    fn prop_unbound_rows_are_ignored(
        seed in prop::collection::vec(arb_row(), 0..40),
        unbound in prop::collection::btree_set(0..EntityKind::ALL.len(), 0..4),
    ) {
        let mut bindings = HarnessConfig::default_bindings();
        for idx in &unbound {
            bindings.remove(&EntityKind::ALL[*idx]);
        }
        let config = HarnessConfig::builder().bindings(bindings).build().unwrap();
        let partitions = SeedDispatcher::new(&config).dispatch(seed.clone()).unwrap();

        let dropped = seed
            .iter()
            .filter(|row| config.table_name(row.kind()).is_none())
            .count();
        prop_assert_eq!(partitions.ignored(), dropped);
        prop_assert_eq!(partitions.total() + dropped, seed.len());
        for idx in &unbound {
            prop_assert_eq!(partitions.count(EntityKind::ALL[*idx]), 0);
        }
    }
}
