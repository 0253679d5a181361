//! Row model shared by every table.
//!
//! Every row carries the same four system properties, grouped in
//! [`EntityMetadata`]:
//!
//! | Property | Wire name | Meaning |
//! |----------|-----------|---------|
//! | `partition_key` | `PartitionKey` | First half of the primary key |
//! | `row_key` | `RowKey` | Second half of the primary key |
//! | `timestamp` | `Timestamp` | Set by the store on every write |
//! | `etag` | `odata.etag` | Opaque version tag, set on every write |
//!
//! Concrete row kinds are plain `serde` structs that embed the metadata with
//! `#[serde(flatten)]` and implement [`TableEntity`]. The remaining fields form
//! the row's open property bag, exposed to the filter translator as
//! [`EntityProperties`].
//!
//! # Example
//!
//! ```
//! use activation_tables::{EntityMetadata, TableEntity};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Widget {
//!     #[serde(flatten)]
//!     metadata: EntityMetadata,
//!     colour: String,
//! }
//!
//! impl TableEntity for Widget {
//!     fn metadata(&self) -> &EntityMetadata {
//!         &self.metadata
//!     }
//!
//!     fn metadata_mut(&mut self) -> &mut EntityMetadata {
//!         &mut self.metadata
//!     }
//! }
//!
//! let widget = Widget { metadata: EntityMetadata::new("shop", "1"), colour: "red".into() };
//! let props = widget.properties().unwrap();
//! assert_eq!(props.get("colour"), Some(&serde_json::json!("red")));
//! assert_eq!(props.get("PartitionKey"), Some(&serde_json::json!("shop")));
//! ```

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::{TableError, TableResult};

/// Opaque version tag assigned to a row on every write.
///
/// The fake produces the weak tag shape the production store uses,
/// `W/"datetime'<timestamp>'"`, but never compares tags: optimistic
/// concurrency is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ETag(String);

impl ETag {
    /// Wraps an existing tag value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The wildcard tag, matching any version.
    #[must_use]
    pub fn all() -> Self {
        Self("*".to_owned())
    }

    /// Builds the tag the store would assign to a write at `timestamp`.
    #[must_use]
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Self {
        let stamp = timestamp.to_rfc3339_opts(SecondsFormat::Micros, true).replace(':', "%3A");
        Self(format!("W/\"datetime'{stamp}'\""))
    }

    /// Returns the raw tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// System properties common to every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityMetadata {
    /// First half of the primary key.
    pub partition_key: String,

    /// Second half of the primary key.
    pub row_key: String,

    /// Time of the last write, assigned by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Version tag of the last write, assigned by the store.
    #[serde(rename = "odata.etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<ETag>,
}

impl EntityMetadata {
    /// Creates metadata for a row that has not been written yet.
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            timestamp: None,
            etag: None,
        }
    }

    /// Returns `true` if this row has the given primary key.
    #[must_use]
    pub fn has_key(&self, partition_key: &str, row_key: &str) -> bool {
        self.partition_key == partition_key && self.row_key == row_key
    }
}

/// A row that can live in a fake table.
///
/// Implementors embed an [`EntityMetadata`] and hand out references to it;
/// everything else is provided. The `serde` representation of the row is its
/// property bag: field names in that representation are the names a text
/// filter refers to.
pub trait TableEntity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The row's system properties.
    fn metadata(&self) -> &EntityMetadata;

    /// Mutable access to the row's system properties.
    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Partition key of this row.
    fn partition_key(&self) -> &str {
        &self.metadata().partition_key
    }

    /// Row key of this row.
    fn row_key(&self) -> &str {
        &self.metadata().row_key
    }

    /// Time of the last write, if the row has been written by the store.
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.metadata().timestamp
    }

    /// Version tag of the last write, if the row has been written by the store.
    fn etag(&self) -> Option<&ETag> {
        self.metadata().etag.as_ref()
    }

    /// Returns `true` if this row has the given primary key.
    fn has_key(&self, partition_key: &str, row_key: &str) -> bool {
        self.metadata().has_key(partition_key, row_key)
    }

    /// Converts the row into its property bag.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Serialization`] if the row does not serialize to
    /// a JSON object.
    fn properties(&self) -> TableResult<EntityProperties> {
        EntityProperties::from_entity(self)
    }
}

/// The open property bag of a row.
///
/// Holds the row's JSON object form. Lookups by name are case-insensitive,
/// with an exact match preferred when two properties differ only by case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityProperties {
    values: Map<String, Value>,
}

impl EntityProperties {
    /// Builds the property bag of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Serialization`] if the entity does not serialize
    /// to a JSON object.
    pub fn from_entity<T: Serialize>(entity: &T) -> TableResult<Self> {
        match serde_json::to_value(entity)? {
            Value::Object(values) => Ok(Self { values }),
            other => Err(TableError::serialization(format!(
                "entity serialized to {} instead of an object",
                json_kind(&other)
            ))),
        }
    }

    /// Converts the property bag back into a typed row.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Serialization`] if the properties do not fit `T`.
    pub fn into_entity<T: DeserializeOwned>(self) -> TableResult<T> {
        Ok(serde_json::from_value(Value::Object(self.values))?)
    }

    /// Looks up a property by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).or_else(|| {
            self.values.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, v)| v)
        })
    }

    /// Overlays `other` onto these properties.
    ///
    /// Properties present in `other` overwrite those here; properties that
    /// are absent or `null` in `other` keep their current value.
    pub fn merge_from(&mut self, other: EntityProperties) {
        for (key, value) in other.values {
            if !value.is_null() {
                self.values.insert(key, value);
            }
        }
    }

    /// Number of properties, system properties included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the bag holds no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A row with no fixed shape.
///
/// Useful when a test wants a table without declaring a row type, and as the
/// row type the conformance suite runs against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicEntity {
    /// System properties.
    #[serde(flatten)]
    pub metadata: EntityMetadata,

    /// Every other property, by name.
    #[serde(flatten)]
    pub properties: BTreeMap<String, Value>,
}

impl DynamicEntity {
    /// Creates an empty row with the given key.
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self { metadata: EntityMetadata::new(partition_key, row_key), properties: BTreeMap::new() }
    }

    /// Adds or replaces a property.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Returns a property value by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

impl TableEntity for DynamicEntity {
    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }
}
