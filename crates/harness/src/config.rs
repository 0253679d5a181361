//! Configuration for the activation harness.
//!
//! [`HarnessConfig`] decides which table each row kind lives in, what the
//! seed dispatcher does with rows whose kind has no table, and the
//! [`TableBehavior`] every fake table is created with. The defaults bind all
//! nine kinds to their production table names and reproduce the permissive
//! fake.
//!
//! # Example
//!
//! ```
//! use activation_harness::{EntityKind, HarnessConfig, UnboundSeedPolicy};
//!
//! let mut bindings = HarnessConfig::default_bindings();
//! bindings.remove(&EntityKind::FeatureActivationRequest);
//!
//! let config = HarnessConfig::builder()
//!     .bindings(bindings)
//!     .unbound_seeds(UnboundSeedPolicy::Reject)
//!     .build()?;
//! assert_eq!(config.table_name(EntityKind::FeatureActivationRequest), None);
//! assert_eq!(config.table_name(EntityKind::ValidStore), Some("valid-stores"));
//! # Ok::<(), activation_harness::HarnessError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};

use activation_tables::TableBehavior;
use serde::{Deserialize, Serialize};

use crate::{
    entities::EntityKind,
    error::{HarnessError, HarnessResult},
};

/// What the seed dispatcher does with a row whose kind has no table binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnboundSeedPolicy {
    /// Drop the row and log it at debug level.
    #[default]
    Ignore,
    /// Fail with [`HarnessError::UnboundSeedKind`].
    Reject,
}

/// Configuration for [`TestServices`](crate::TestServices).
///
/// When loaded from JSON, a `bindings` object replaces the default bindings
/// as a whole; kinds it leaves out are unbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Behavior switches for every fake table.
    #[serde(default)]
    table_behavior: TableBehavior,

    /// Handling of seed rows with no table binding.
    #[serde(default)]
    unbound_seeds: UnboundSeedPolicy,

    /// Table name of each bound row kind.
    #[serde(default = "HarnessConfig::default_bindings")]
    bindings: BTreeMap<EntityKind, String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            table_behavior: TableBehavior::default(),
            unbound_seeds: UnboundSeedPolicy::default(),
            bindings: Self::default_bindings(),
        }
    }
}

#[bon::bon]
impl HarnessConfig {
    /// Creates a new configuration, validating the table bindings.
    ///
    /// # Optional Fields
    ///
    /// * `table_behavior` - Switches for every fake table (default: permissive).
    /// * `unbound_seeds` - Handling of unbound seed rows (default: ignore).
    /// * `bindings` - Table name per row kind (default: the production names).
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] if:
    /// - A table name is empty or only whitespace
    /// - Two kinds are bound to the same table name
    #[builder]
    pub fn new(
        #[builder(default)] table_behavior: TableBehavior,
        #[builder(default)] unbound_seeds: UnboundSeedPolicy,
        #[builder(default = HarnessConfig::default_bindings())]
        bindings: BTreeMap<EntityKind, String>,
    ) -> HarnessResult<Self> {
        let config = Self { table_behavior, unbound_seeds, bindings };
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from JSON.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] if the text is not a valid
    /// configuration.
    pub fn from_json(json: &str) -> HarnessResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| HarnessError::config(format!("invalid harness configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Every kind bound to its production table name.
    #[must_use]
    pub fn default_bindings() -> BTreeMap<EntityKind, String> {
        EntityKind::ALL.iter().map(|kind| (*kind, kind.default_table_name().to_owned())).collect()
    }

    fn validate(&self) -> HarnessResult<()> {
        let mut seen = BTreeSet::new();
        for (kind, name) in &self.bindings {
            if name.trim().is_empty() {
                return Err(HarnessError::config(format!("table name for {kind} cannot be empty")));
            }
            if !seen.insert(name.as_str()) {
                return Err(HarnessError::config(format!(
                    "table name {name:?} is bound to more than one kind"
                )));
            }
        }
        Ok(())
    }

    /// Returns the behavior switches for every fake table.
    #[must_use]
    pub fn table_behavior(&self) -> TableBehavior {
        self.table_behavior
    }

    /// Returns the handling of unbound seed rows.
    #[must_use]
    pub fn unbound_seeds(&self) -> UnboundSeedPolicy {
        self.unbound_seeds
    }

    /// Returns the table name of each bound kind.
    #[must_use]
    pub fn bindings(&self) -> &BTreeMap<EntityKind, String> {
        &self.bindings
    }

    /// Returns the table name `kind` is bound to, if any.
    #[must_use]
    pub fn table_name(&self, kind: EntityKind) -> Option<&str> {
        self.bindings.get(&kind).map(String::as_str)
    }
}
