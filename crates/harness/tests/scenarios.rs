//! End-to-end scenarios: seed through [`TestServices`], then drive the fake
//! tables the way the activation services do.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use activation_harness::{
    ActivationEntity, ActivationStatus, BrandAccessControlEntity,
    BrandLevelActivationRequestEntity, EntityKind, FeatureActivationRequestEntity, HarnessConfig,
    HarnessError, ProjectActivationClient, ProjectFacility, StoreAccessControlEntity,
    StoreActivationStateEntity, TestServices, UnboundSeedPolicy, ValidStoreEntity, tables,
};
use activation_tables::{
    MergeBehavior, QueryOptions, STATUS_NO_CONTENT, TableBehavior, TableClient, TableEntity,
    TableError, TableServiceClient, UpdateMode, assert_filter_translation, assert_unknown_table,
    testutil::keys_of,
};
use chrono::{TimeZone, Utc};

// ============================================================================
// Test Helpers
// ============================================================================

fn state(
    partition_key: &str,
    row_key: &str,
    status: ActivationStatus,
) -> StoreActivationStateEntity {
    StoreActivationStateEntity { status, ..StoreActivationStateEntity::new(partition_key, row_key) }
}

fn key_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(p, r)| ((*p).to_owned(), (*r).to_owned())).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_partition_lookup() {
    let services = TestServices::builder()
        .seed(vec![
            ValidStoreEntity::new("US", "001").into(),
            ValidStoreEntity::new("US", "002").into(),
            ValidStoreEntity::new("CA", "001").into(),
        ])
        .build()
        .unwrap();

    let stores = services
        .table_service()
        .get_table_client::<ValidStoreEntity>(tables::VALID_STORES)
        .unwrap();
    let us = stores.query_filter("PartitionKey eq 'US'", QueryOptions::default()).await.unwrap();

    let row_keys: Vec<_> = us.iter().map(|s| s.row_key()).collect();
    assert_eq!(row_keys, ["001", "002"]);
}

#[tokio::test]
async fn test_upsert_replaces() {
    let services = TestServices::builder().build().unwrap();
    let states = services
        .table::<StoreActivationStateEntity>(EntityKind::StoreActivationState)
        .unwrap();
    assert!(states.is_empty());

    states.add_entity(state("A", "X", ActivationStatus::Pending)).await.unwrap();
    states
        .upsert_entity(state("A", "X", ActivationStatus::Active), UpdateMode::Merge)
        .await
        .unwrap();

    let rows = states.query(|_| true, QueryOptions::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.first().map(|r| r.status), Some(ActivationStatus::Active));
}

#[tokio::test]
async fn test_delete_missing() {
    let services = TestServices::builder().build().unwrap();
    let controls = services
        .table_service()
        .get_table_client::<StoreAccessControlEntity>(tables::STORE_ACCESS_CONTROLS)
        .unwrap();

    let response = controls.delete_entity("A", "X", None).await.unwrap();
    assert_eq!(response.status, STATUS_NO_CONTENT);
    assert!(controls.is_empty());
}

#[tokio::test]
async fn test_guid_literal_is_stripped() {
    let id = "e7f1a2b3-4c5d-4e6f-8a9b-0c1d2e3f4a5b";
    let request = FeatureActivationRequestEntity {
        request_id: id.to_owned(),
        ..FeatureActivationRequestEntity::new("feature", "r1")
    };
    let services = TestServices::builder().seed(vec![request.into()]).build().unwrap();

    let requests = services
        .table::<FeatureActivationRequestEntity>(EntityKind::FeatureActivationRequest)
        .unwrap();
    let found = requests
        .query_filter(&format!("RequestId eq guid'{id}'"), QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.first().map(|r| r.request_id.as_str()), Some(id));
}

#[tokio::test]
async fn test_ordering_comparator() {
    let seed: Vec<ActivationEntity> = (1..=4)
        .map(|priority| {
            ActivationEntity::from(BrandLevelActivationRequestEntity {
                priority,
                ..BrandLevelActivationRequestEntity::new("brand", priority.to_string())
            })
        })
        .collect();
    let services = TestServices::builder().seed(seed).build().unwrap();

    let requests = services
        .table::<BrandLevelActivationRequestEntity>(EntityKind::BrandLevelActivationRequest)
        .unwrap();
    let found = requests.query_filter("priority ge 3", QueryOptions::default()).await.unwrap();

    let priorities: Vec<_> = found.iter().map(|r| r.priority).collect();
    assert_eq!(priorities, [3, 4]);
}

#[tokio::test]
async fn test_cross_kind_isolation() {
    let services = TestServices::builder()
        .seed(vec![
            ValidStoreEntity::new("US", "001").into(),
            BrandAccessControlEntity::new("brand", "g1").into(),
        ])
        .build()
        .unwrap();

    let stores = services.table::<ValidStoreEntity>(EntityKind::ValidStore).unwrap();
    let controls =
        services.table::<BrandAccessControlEntity>(EntityKind::BrandAccessControl).unwrap();

    let store_rows = stores.query(|_| true, QueryOptions::default()).await.unwrap();
    let control_rows = controls.query(|_| true, QueryOptions::default()).await.unwrap();
    assert_eq!(keys_of(&store_rows), key_pairs(&[("US", "001")]));
    assert_eq!(keys_of(&control_rows), key_pairs(&[("brand", "g1")]));
}

// ============================================================================
// Container behavior
// ============================================================================

#[tokio::test]
async fn test_every_bound_table_is_registered() {
    let services = TestServices::builder().build().unwrap();
    let service = services.table_service();
    for kind in EntityKind::ALL {
        assert!(service.contains_table(kind.default_table_name()), "missing table for {kind}");
    }
}

#[tokio::test]
async fn test_unknown_table_lookup_fails() {
    let services = TestServices::builder().build().unwrap();
    let result = services.table_service().get_table_client::<ValidStoreEntity>("stores");
    assert_unknown_table!(result);
}

#[tokio::test]
async fn test_wrong_row_type_is_a_mismatch() {
    let services = TestServices::builder().build().unwrap();
    let service = services.table_service();
    let result = service.get_table_client::<ValidStoreEntity>(tables::BRAND_ACCESS_CONTROLS);
    assert!(matches!(result, Err(TableError::EntityTypeMismatch { .. })));
}

#[tokio::test]
async fn test_writes_are_visible_to_later_lookups() {
    let services = TestServices::builder().build().unwrap();
    let writer = services.table::<ValidStoreEntity>(EntityKind::ValidStore).unwrap();
    writer.add_entity(ValidStoreEntity::new("US", "009")).await.unwrap();

    let reader = services
        .table_service()
        .get_table_client::<ValidStoreEntity>(tables::VALID_STORES)
        .unwrap();
    let rows = reader.query(|_| true, QueryOptions::default()).await.unwrap();
    assert_eq!(keys_of(&rows), key_pairs(&[("US", "009")]));
    assert!(rows.first().and_then(|r| r.timestamp()).is_some());
}

#[tokio::test]
async fn test_seed_rows_are_not_stamped() {
    let services = TestServices::builder()
        .seed(vec![ValidStoreEntity::new("US", "001").into()])
        .build()
        .unwrap();
    let stores = services.table::<ValidStoreEntity>(EntityKind::ValidStore).unwrap();
    let rows = stores.snapshot();
    assert_eq!(rows[0].timestamp(), None);
    assert_eq!(rows[0].etag(), None);
}

#[tokio::test]
async fn test_instances_share_nothing() {
    let first = TestServices::builder().build().unwrap();
    let second = TestServices::builder().build().unwrap();

    let stores = first.table::<ValidStoreEntity>(EntityKind::ValidStore).unwrap();
    stores.add_entity(ValidStoreEntity::new("US", "001")).await.unwrap();

    let other = second.table::<ValidStoreEntity>(EntityKind::ValidStore).unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn test_renamed_binding() {
    let mut bindings = HarnessConfig::default_bindings();
    bindings.insert(EntityKind::ValidStore, "stores-v2".to_owned());
    let config = HarnessConfig::builder().bindings(bindings).build().unwrap();
    let services = TestServices::builder()
        .seed(vec![ValidStoreEntity::new("US", "001").into()])
        .config(config)
        .build()
        .unwrap();

    let service = services.table_service();
    assert!(!service.contains_table(tables::VALID_STORES));
    let stores = service.get_table_client::<ValidStoreEntity>("stores-v2").unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(services.table::<ValidStoreEntity>(EntityKind::ValidStore).unwrap().len(), 1);
}

#[tokio::test]
async fn test_unbound_kind_lookup_fails() {
    let mut bindings = HarnessConfig::default_bindings();
    bindings.remove(&EntityKind::ValidStore);
    let config = HarnessConfig::builder().bindings(bindings).build().unwrap();
    let services = TestServices::builder()
        .seed(vec![ValidStoreEntity::new("US", "001").into()])
        .config(config)
        .build()
        .unwrap();

    let result = services.table::<ValidStoreEntity>(EntityKind::ValidStore);
    assert!(matches!(result, Err(HarnessError::Table(TableError::UnknownTable { .. }))));
}

#[tokio::test]
async fn test_unbound_seed_rejected() {
    let mut bindings = HarnessConfig::default_bindings();
    bindings.remove(&EntityKind::ValidStore);
    let config = HarnessConfig::builder()
        .bindings(bindings)
        .unbound_seeds(UnboundSeedPolicy::Reject)
        .build()
        .unwrap();

    let result = TestServices::builder()
        .seed(vec![ValidStoreEntity::new("US", "001").into()])
        .config(config)
        .build();
    assert!(matches!(result, Err(HarnessError::UnboundSeedKind { kind: EntityKind::ValidStore })));
}

#[tokio::test]
async fn test_fieldwise_merge_keeps_unset_attributes() {
    let activated_on = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let behavior = TableBehavior::builder().merge(MergeBehavior::FieldWise).build();
    let config = HarnessConfig::builder().table_behavior(behavior).build().unwrap();
    let seeded = StoreActivationStateEntity {
        activated_on: Some(activated_on),
        ..state("001", "feature", ActivationStatus::Active)
    };
    let services =
        TestServices::builder().seed(vec![seeded.into()]).config(config).build().unwrap();

    let states = services
        .table::<StoreActivationStateEntity>(EntityKind::StoreActivationState)
        .unwrap();
    states
        .upsert_entity(state("001", "feature", ActivationStatus::Inactive), UpdateMode::Merge)
        .await
        .unwrap();

    let rows = states.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, ActivationStatus::Inactive);
    assert_eq!(rows[0].activated_on, Some(activated_on));
}

#[tokio::test]
async fn test_fieldwise_merge_overwrites_plain_attributes() {
    let behavior = TableBehavior::builder().merge(MergeBehavior::FieldWise).build();
    let config = HarnessConfig::builder().table_behavior(behavior).build().unwrap();
    let seeded = ValidStoreEntity {
        brand: "Acme".to_owned(),
        is_active: true,
        ..ValidStoreEntity::new("US", "001")
    };
    let services =
        TestServices::builder().seed(vec![seeded.into()]).config(config).build().unwrap();

    let stores = services.table::<ValidStoreEntity>(EntityKind::ValidStore).unwrap();
    stores.upsert_entity(ValidStoreEntity::new("US", "001"), UpdateMode::Merge).await.unwrap();

    // Empty strings and `false` are written, not skipped as null.
    let rows = stores.snapshot();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_active);
    assert_eq!(rows[0].brand, "");
}

#[tokio::test]
async fn test_invalid_filter_surfaces_translation_error() {
    let services = TestServices::builder().build().unwrap();
    let stores = services.table::<ValidStoreEntity>(EntityKind::ValidStore).unwrap();
    let result = stores.query_filter("StoreNumber eq", QueryOptions::default()).await;
    assert_filter_translation!(result);
}

#[tokio::test]
async fn test_enum_attributes_filter_as_text() {
    let services = TestServices::builder()
        .seed(vec![
            state("001", "a", ActivationStatus::Active).into(),
            state("001", "b", ActivationStatus::Pending).into(),
            state("002", "a", ActivationStatus::Active).into(),
        ])
        .build()
        .unwrap();

    let states = services
        .table::<StoreActivationStateEntity>(EntityKind::StoreActivationState)
        .unwrap();
    let found = states
        .query_filter(
            "PartitionKey eq '001' and Status eq 'Active' and Scope eq 'Store'",
            QueryOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(keys_of(&found), key_pairs(&[("001", "a")]));
}

// ============================================================================
// Project-activation fake
// ============================================================================

#[tokio::test]
async fn test_activation_client_requires_facilities() {
    let services = TestServices::builder().build().unwrap();
    let result = services.activation_client();
    assert!(matches!(result, Err(HarnessError::ServiceNotRegistered { .. })));
}

#[tokio::test]
async fn test_activation_client_with_facilities() {
    let services = TestServices::builder()
        .facilities(vec![ProjectFacility::new("001", "TX"), ProjectFacility::new("002", "TX")])
        .build()
        .unwrap();

    let client = services.activation_client().unwrap();
    assert_eq!(client.get_all_project_facilities().await.unwrap().len(), 2);
    assert_eq!(
        client.get_project_facilities("002", "TX").await.unwrap(),
        [ProjectFacility::new("002", "TX")]
    );
}

#[tokio::test]
async fn test_empty_facility_list_still_registers_client() {
    let services = TestServices::builder().maybe_facilities(Some(Vec::new())).build().unwrap();
    let client = services.activation_client().unwrap();
    assert!(client.get_all_project_facilities().await.unwrap().is_empty());
}
