//! Conformance test suite for [`TableClient`] implementations.
//!
//! This module provides a set of async check functions that validate whether
//! a [`TableClient`] implementation behaves like the permissive fake table:
//! append-order scans, replace-on-upsert, idempotent deletes, and text
//! filters that agree with typed predicates.
//!
//! Every function expects a fresh, empty table over [`DynamicEntity`] rows,
//! configured with the default [`TableBehavior`](crate::TableBehavior).
//!
//! # Usage
//!
//! Enable the `testutil` feature and call each conformance function with a
//! fresh table:
//!
//! ```no_run
//! use activation_tables::{conformance, DynamicEntity, MemoryTableClient};
//!
//! #[tokio::test]
//! async fn write_add_appends_in_order() {
//!     conformance::write_add_appends_in_order(&MemoryTableClient::<DynamicEntity>::new("t")).await;
//! }
//! ```
//!
//! # Test Categories
//!
//! | Category | Functions | Contract aspect |
//! |----------|-----------|-----------------|
//! | Write | 6 tests | add / upsert / delete semantics |
//! | Query | 6 tests | Predicate and filter queries |
//! | Error semantics | 2 tests | Translation failures |

use serde_json::json;

use crate::{
    assert_filter_translation,
    client::{QueryOptions, TableClient, UpdateMode},
    entity::{DynamicEntity, TableEntity},
    testutil::keys_of,
};

fn row(partition_key: &str, row_key: &str) -> DynamicEntity {
    DynamicEntity::new(partition_key, row_key)
}

async fn scan<C: TableClient<DynamicEntity>>(table: &C) -> Vec<DynamicEntity> {
    table.query(|_| true, QueryOptions::default()).await.expect("scan should succeed").into_vec()
}

async fn seed<C: TableClient<DynamicEntity>>(table: &C, rows: Vec<DynamicEntity>) {
    for entity in rows {
        table.add_entity(entity).await.expect("seed add should succeed");
    }
}

fn key_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(p, r)| ((*p).to_owned(), (*r).to_owned())).collect()
}

// ============================================================================
// Write: add / upsert / delete semantics (6 tests)
// ============================================================================

/// `add_entity` appends; a scan returns rows in insertion order.
pub async fn write_add_appends_in_order<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, vec![row("US", "002"), row("CA", "001"), row("US", "001")]).await;
    let rows = scan(table).await;
    assert_eq!(
        keys_of(&rows),
        key_pairs(&[("US", "002"), ("CA", "001"), ("US", "001")]),
        "scan must follow insertion order"
    );
}

/// `upsert_entity` over an existing key leaves exactly one row, equal to the
/// incoming one.
pub async fn write_upsert_replaces_existing<C: TableClient<DynamicEntity>>(table: &C) {
    table.add_entity(row("A", "X").with("Status", "Pending")).await.expect("add");
    table
        .upsert_entity(row("A", "X").with("Status", "Active"), UpdateMode::Merge)
        .await
        .expect("upsert");

    let rows = scan(table).await;
    assert_eq!(rows.len(), 1, "upsert must not duplicate the key");
    assert_eq!(rows[0].get("Status"), Some(&json!("Active")));
}

/// `upsert_entity` of a new key inserts it.
pub async fn write_upsert_inserts_missing<C: TableClient<DynamicEntity>>(table: &C) {
    table.upsert_entity(row("A", "X"), UpdateMode::Replace).await.expect("upsert");
    assert_eq!(keys_of(&scan(table).await), key_pairs(&[("A", "X")]));
}

/// `delete_entity` removes the row and nothing else.
pub async fn write_delete_removes_row<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, vec![row("A", "X"), row("A", "Y")]).await;
    table.delete_entity("A", "X", None).await.expect("delete");
    assert_eq!(keys_of(&scan(table).await), key_pairs(&[("A", "Y")]));
}

/// `delete_entity` of a missing key succeeds and changes nothing.
pub async fn write_delete_missing_is_noop<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, vec![row("A", "Y")]).await;
    let response = table.delete_entity("A", "X", None).await;
    assert!(response.is_ok(), "delete of a missing row should not error: {response:?}");
    assert!(response.expect("checked above").is_success());
    assert_eq!(scan(table).await.len(), 1);
}

/// Deleting twice leaves the same state as deleting once.
pub async fn write_delete_is_idempotent<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, vec![row("A", "X"), row("A", "Y")]).await;
    table.delete_entity("A", "X", None).await.expect("first delete");
    let once = scan(table).await;
    table.delete_entity("A", "X", None).await.expect("second delete");
    assert_eq!(scan(table).await, once);
}

// ============================================================================
// Query: predicate and filter queries (6 tests)
// ============================================================================

/// `query` returns exactly the rows the predicate accepts, in table order.
pub async fn query_predicate_is_sound_and_complete<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, (1..=6).map(|i| row("P", &i.to_string()).with("Priority", i)).collect()).await;

    let is_even = |r: &DynamicEntity| {
        r.get("Priority").and_then(serde_json::Value::as_i64).is_some_and(|p| p % 2 == 0)
    };
    let even = table.query(is_even, QueryOptions::default()).await.expect("query");
    let keys: Vec<_> = even.iter().map(|r| r.row_key().to_owned()).collect();
    assert_eq!(keys, ["2", "4", "6"]);
}

/// A text filter returns the same rows as the equivalent predicate.
pub async fn query_filter_matches_predicate<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, vec![
        row("US", "001").with("Priority", 1),
        row("US", "002").with("Priority", 5),
        row("CA", "001").with("Priority", 5),
    ])
    .await;

    let by_filter = table
        .query_filter("PartitionKey eq 'US' and Priority ge 3", QueryOptions::default())
        .await
        .expect("query_filter");
    let by_predicate = table
        .query(
            |r| r.partition_key() == "US" && r.get("Priority").and_then(|v| v.as_i64()) >= Some(3),
            QueryOptions::default(),
        )
        .await
        .expect("query");
    assert_eq!(by_filter, by_predicate);
    assert_eq!(by_filter.len(), 1);
}

/// An empty filter returns every row in insertion order.
pub async fn query_empty_filter_returns_all<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, vec![row("B", "1"), row("A", "1"), row("C", "1")]).await;
    let all = table.query_filter("", QueryOptions::default()).await.expect("query_filter");
    assert_eq!(all.into_vec(), scan(table).await);
}

/// Query results do not change when the table is written afterwards.
pub async fn query_results_are_snapshots<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, vec![row("A", "1")]).await;
    let before = table.query_filter("", QueryOptions::default()).await.expect("query_filter");
    table.add_entity(row("A", "2")).await.expect("add");
    table.delete_entity("A", "1", None).await.expect("delete");
    assert_eq!(keys_of(&before), key_pairs(&[("A", "1")]));
}

/// Query results are one page with no continuation token.
pub async fn query_returns_single_page<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, (0..10).map(|i| row("A", &i.to_string())).collect()).await;
    let options = QueryOptions::builder().max_per_page(3).build();
    let results = table.query(|_| true, options).await.expect("query");

    let pages: Vec<_> = results.as_pages().collect();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].values().len(), 10);
    assert_eq!(pages[0].continuation_token(), None);
}

/// `guid'…'` literals compare as plain strings.
pub async fn query_guid_literal_matches_string<C: TableClient<DynamicEntity>>(table: &C) {
    let id = "e7f1c0de-0000-4000-8000-000000000001";
    seed(table, vec![row("A", "1").with("RequestId", id), row("A", "2").with("RequestId", "other")])
        .await;
    let found = table
        .query_filter(&format!("RequestId eq guid'{id}'"), QueryOptions::default())
        .await
        .expect("query_filter");
    assert_eq!(keys_of(&found), key_pairs(&[("A", "1")]));
}

// ============================================================================
// Error semantics: translation failures (2 tests)
// ============================================================================

/// An unparseable filter fails with `FilterTranslation`.
pub async fn error_invalid_filter_is_translation_error<C: TableClient<DynamicEntity>>(table: &C) {
    let result = table.query_filter("PartitionKey eq 'US", QueryOptions::default()).await;
    assert_filter_translation!(result);
}

/// A failed query leaves the table unchanged.
pub async fn error_invalid_filter_leaves_table_unchanged<C: TableClient<DynamicEntity>>(table: &C) {
    seed(table, vec![row("A", "1"), row("A", "2")]).await;
    let before = scan(table).await;
    let result = table.query_filter("(PartitionKey eq 'A'", QueryOptions::default()).await;
    assert_filter_translation!(result);
    assert_eq!(scan(table).await, before);
}

// ============================================================================
// Runner
// ============================================================================

/// Runs every check, each against a fresh table from `make_table`.
pub async fn run_all<C, F>(make_table: F)
where
    C: TableClient<DynamicEntity>,
    F: Fn() -> C,
{
    write_add_appends_in_order(&make_table()).await;
    write_upsert_replaces_existing(&make_table()).await;
    write_upsert_inserts_missing(&make_table()).await;
    write_delete_removes_row(&make_table()).await;
    write_delete_missing_is_noop(&make_table()).await;
    write_delete_is_idempotent(&make_table()).await;

    query_predicate_is_sound_and_complete(&make_table()).await;
    query_filter_matches_predicate(&make_table()).await;
    query_empty_filter_returns_all(&make_table()).await;
    query_results_are_snapshots(&make_table()).await;
    query_returns_single_page(&make_table()).await;
    query_guid_literal_matches_string(&make_table()).await;

    error_invalid_filter_is_translation_error(&make_table()).await;
    error_invalid_filter_leaves_table_unchanged(&make_table()).await;
}
