//! Conformance test suite for `MemoryTableClient`.
//!
//! Each test function corresponds to a single conformance check, providing
//! fine-grained failure reporting. The `run_all` test exercises the full
//! suite as a one-liner to verify no tests are accidentally omitted.

#![allow(clippy::expect_used, clippy::panic)]

use activation_tables::{
    DynamicEntity, MemoryTableClient, MemoryTableService, TableServiceClient, conformance,
};

fn table() -> MemoryTableClient<DynamicEntity> {
    MemoryTableClient::new("conformance")
}

// ============================================================================
// Write (6 tests)
// ============================================================================

#[tokio::test]
async fn write_add_appends_in_order() {
    conformance::write_add_appends_in_order(&table()).await;
}

#[tokio::test]
async fn write_upsert_replaces_existing() {
    conformance::write_upsert_replaces_existing(&table()).await;
}

#[tokio::test]
async fn write_upsert_inserts_missing() {
    conformance::write_upsert_inserts_missing(&table()).await;
}

#[tokio::test]
async fn write_delete_removes_row() {
    conformance::write_delete_removes_row(&table()).await;
}

#[tokio::test]
async fn write_delete_missing_is_noop() {
    conformance::write_delete_missing_is_noop(&table()).await;
}

#[tokio::test]
async fn write_delete_is_idempotent() {
    conformance::write_delete_is_idempotent(&table()).await;
}

// ============================================================================
// Query (6 tests)
// ============================================================================

#[tokio::test]
async fn query_predicate_is_sound_and_complete() {
    conformance::query_predicate_is_sound_and_complete(&table()).await;
}

#[tokio::test]
async fn query_filter_matches_predicate() {
    conformance::query_filter_matches_predicate(&table()).await;
}

#[tokio::test]
async fn query_empty_filter_returns_all() {
    conformance::query_empty_filter_returns_all(&table()).await;
}

#[tokio::test]
async fn query_results_are_snapshots() {
    conformance::query_results_are_snapshots(&table()).await;
}

#[tokio::test]
async fn query_returns_single_page() {
    conformance::query_returns_single_page(&table()).await;
}

#[tokio::test]
async fn query_guid_literal_matches_string() {
    conformance::query_guid_literal_matches_string(&table()).await;
}

// ============================================================================
// Error semantics (2 tests)
// ============================================================================

#[tokio::test]
async fn error_invalid_filter_is_translation_error() {
    conformance::error_invalid_filter_is_translation_error(&table()).await;
}

#[tokio::test]
async fn error_invalid_filter_leaves_table_unchanged() {
    conformance::error_invalid_filter_leaves_table_unchanged(&table()).await;
}

// ============================================================================
// Full suite
// ============================================================================

#[tokio::test]
async fn run_all_conformance_tests() {
    conformance::run_all(table).await;
}

#[tokio::test]
async fn run_all_through_service_lookup() {
    conformance::run_all(|| {
        let mut service = MemoryTableService::default();
        service.register::<DynamicEntity>("conformance", Vec::new()).expect("register");
        service.get_table_client::<DynamicEntity>("conformance").expect("lookup")
    })
    .await;
}
