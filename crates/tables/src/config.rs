//! Behavior switches for fake tables.
//!
//! The production store and the permissive fake differ in a few places. The
//! defaults here reproduce the permissive fake; each switch can be flipped to
//! the production behavior for tests that need it.
//!
//! | Switch | Default | Alternative |
//! |--------|---------|-------------|
//! | [`duplicate_keys`](TableBehavior::duplicate_keys) | [`Append`](DuplicateKeyPolicy::Append) | [`Reject`](DuplicateKeyPolicy::Reject) |
//! | [`merge`](TableBehavior::merge) | [`Replace`](MergeBehavior::Replace) | [`FieldWise`](MergeBehavior::FieldWise) |
//! | [`stamp_writes`](TableBehavior::stamp_writes) | `true` | `false` |

use serde::{Deserialize, Serialize};

/// What `add_entity` does when a row with the same key already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKeyPolicy {
    /// Append the row anyway; the table then holds two rows with one key.
    #[default]
    Append,
    /// Fail with [`EntityAlreadyExists`](crate::TableError::EntityAlreadyExists).
    Reject,
}

/// What `upsert_entity` does with [`UpdateMode::Merge`](crate::UpdateMode::Merge).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeBehavior {
    /// Replace the stored row wholesale, exactly like `UpdateMode::Replace`.
    #[default]
    Replace,
    /// Overlay the incoming row's non-null properties onto the stored row.
    ///
    /// Only `Option` fields of a typed row serialize as null. Plain `bool`
    /// and integer fields are always written, so `IsActive: false` or
    /// `Priority: 0` from a partial row overwrite the stored value. For
    /// those fields a field-wise merge behaves like [`Replace`](Self::Replace).
    #[serde(rename = "fieldwise")]
    FieldWise,
}

/// Behavior switches shared by the tables of one service.
///
/// # Example
///
/// ```
/// use activation_tables::{DuplicateKeyPolicy, MergeBehavior, TableBehavior};
///
/// let strict = TableBehavior::builder()
///     .duplicate_keys(DuplicateKeyPolicy::Reject)
///     .merge(MergeBehavior::FieldWise)
///     .build();
/// assert!(strict.stamp_writes);
///
/// let loaded: TableBehavior = serde_json::from_str(r#"{ "stamp_writes": false }"#).unwrap();
/// assert_eq!(loaded.duplicate_keys, DuplicateKeyPolicy::Append);
/// assert!(!loaded.stamp_writes);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, bon::Builder, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableBehavior {
    /// Handling of duplicate keys on add.
    #[serde(default)]
    #[builder(default)]
    pub duplicate_keys: DuplicateKeyPolicy,

    /// Handling of merge-mode upserts.
    #[serde(default)]
    #[builder(default)]
    pub merge: MergeBehavior,

    /// Whether writes assign `Timestamp` and `odata.etag`.
    #[serde(default = "default_stamp_writes")]
    #[builder(default = default_stamp_writes())]
    pub stamp_writes: bool,
}

fn default_stamp_writes() -> bool {
    true
}

impl Default for TableBehavior {
    fn default() -> Self {
        Self {
            duplicate_keys: DuplicateKeyPolicy::default(),
            merge: MergeBehavior::default(),
            stamp_writes: default_stamp_writes(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_default_impl() {
        assert_eq!(TableBehavior::builder().build(), TableBehavior::default());
    }

    #[test]
    fn test_default_is_permissive() {
        let behavior = TableBehavior::default();
        assert_eq!(behavior.duplicate_keys, DuplicateKeyPolicy::Append);
        assert_eq!(behavior.merge, MergeBehavior::Replace);
        assert!(behavior.stamp_writes);
    }

    #[test]
    fn test_deserialize_empty_object_uses_defaults() {
        let behavior: TableBehavior = serde_json::from_str("{}").unwrap();
        assert_eq!(behavior, TableBehavior::default());
    }

    #[test]
    fn test_deserialize_all_fields() {
        let json = r#"{ "duplicate_keys": "reject", "merge": "fieldwise", "stamp_writes": false }"#;
        let behavior: TableBehavior = serde_json::from_str(json).unwrap();
        assert_eq!(behavior.duplicate_keys, DuplicateKeyPolicy::Reject);
        assert_eq!(behavior.merge, MergeBehavior::FieldWise);
        assert!(!behavior.stamp_writes);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result = serde_json::from_str::<TableBehavior>(r#"{ "etag_checks": true }"#);
        assert!(result.is_err());
    }
}
