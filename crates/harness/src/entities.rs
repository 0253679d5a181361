//! Row kinds of the feature-activation tables.
//!
//! Each table holds rows of exactly one kind. The nine kinds are plain
//! `serde` structs embedding [`EntityMetadata`]; their PascalCase field names
//! are the property names text filters refer to (`Status eq 'Active'`).
//!
//! [`ActivationEntity`] is the closed union of all kinds and is what a test
//! hands to the harness as seed data. Its discriminator is [`EntityKind`].

use std::fmt;

use activation_tables::{EntityMetadata, TableEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tables;

/// Lifecycle state of an activation request or store activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationStatus {
    /// Raised but not yet acted on.
    #[default]
    Pending,
    /// Approved and in effect.
    Active,
    /// Turned off after having been active.
    Inactive,
    /// Declined.
    Rejected,
}

/// Level at which a feature was activated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationScope {
    /// Every store of a brand.
    Brand,
    /// Every store under a contract type.
    ContractType,
    /// A single store.
    #[default]
    Store,
}

/// A store eligible for feature activation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ValidStoreEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Store number, unique within a state.
    pub store_number: String,
    /// Two-letter state code.
    pub state_code: String,
    /// Brand the store trades under.
    pub brand: String,
    /// Contract type the store operates under.
    pub contract_type: String,
    /// Whether the store is trading.
    pub is_active: bool,
}

/// A request to activate a feature for every store of a brand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BrandLevelActivationRequestEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Identifier of the request, usually a GUID.
    pub request_id: String,
    /// Feature the request or state refers to.
    pub feature_name: String,
    /// Brand the store trades under.
    pub brand: String,
    /// Current lifecycle state.
    pub status: ActivationStatus,
    /// Processing priority; higher goes first.
    pub priority: i32,
    /// Who raised the request.
    pub requested_by: String,
}

/// Grants a security group rights over a brand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BrandAccessControlEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Brand the store trades under.
    pub brand: String,
    /// Directory security group granted access.
    pub security_group: String,
    /// Whether the grant is in effect.
    pub is_enabled: bool,
}

/// A request to activate a feature for every store under a contract type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContractTypeLevelActivationRequestEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Identifier of the request, usually a GUID.
    pub request_id: String,
    /// Feature the request or state refers to.
    pub feature_name: String,
    /// Contract type the store operates under.
    pub contract_type: String,
    /// Current lifecycle state.
    pub status: ActivationStatus,
    /// Processing priority; higher goes first.
    pub priority: i32,
    /// Who raised the request.
    pub requested_by: String,
}

/// Grants a security group rights over a contract type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContractTypeAccessControlEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Contract type the store operates under.
    pub contract_type: String,
    /// Directory security group granted access.
    pub security_group: String,
    /// Whether the grant is in effect.
    pub is_enabled: bool,
}

/// Whether a feature is active in a store, and at which level it was turned on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StoreActivationStateEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Store number, unique within a state.
    pub store_number: String,
    /// Feature the request or state refers to.
    pub feature_name: String,
    /// Current lifecycle state.
    pub status: ActivationStatus,
    /// Level the feature was activated at.
    pub scope: ActivationScope,
    /// When the feature became active, if it has.
    pub activated_on: Option<DateTime<Utc>>,
}

/// A request to activate a feature for one store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StoreActivationRequestEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Identifier of the request, usually a GUID.
    pub request_id: String,
    /// Store number, unique within a state.
    pub store_number: String,
    /// Feature the request or state refers to.
    pub feature_name: String,
    /// Current lifecycle state.
    pub status: ActivationStatus,
    /// Processing priority; higher goes first.
    pub priority: i32,
    /// Who raised the request.
    pub requested_by: String,
}

/// Grants a security group rights over a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct StoreAccessControlEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Store number, unique within a state.
    pub store_number: String,
    /// Directory security group granted access.
    pub security_group: String,
    /// Whether the grant is in effect.
    pub is_enabled: bool,
}

/// A feature-level activation request, at any scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FeatureActivationRequestEntity {
    /// Key and write stamps.
    #[serde(flatten)]
    pub metadata: EntityMetadata,
    /// Identifier of the request, usually a GUID.
    pub request_id: String,
    /// Feature the request or state refers to.
    pub feature_name: String,
    /// Level the feature was activated at.
    pub scope: ActivationScope,
    /// Current lifecycle state.
    pub status: ActivationStatus,
    /// Processing priority; higher goes first.
    pub priority: i32,
    /// Who raised the request.
    pub requested_by: String,
    /// Free-text note from the requester.
    pub comment: Option<String>,
}

/// Discriminator of [`ActivationEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    ValidStore,
    BrandLevelActivationRequest,
    BrandAccessControl,
    ContractTypeLevelActivationRequest,
    ContractTypeAccessControl,
    StoreActivationState,
    StoreActivationRequest,
    StoreAccessControl,
    FeatureActivationRequest,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [EntityKind; 9] = [
        Self::ValidStore,
        Self::BrandLevelActivationRequest,
        Self::BrandAccessControl,
        Self::ContractTypeLevelActivationRequest,
        Self::ContractTypeAccessControl,
        Self::StoreActivationState,
        Self::StoreActivationRequest,
        Self::StoreAccessControl,
        Self::FeatureActivationRequest,
    ];

    /// The kebab-case name of this kind, as used in configuration files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidStore => "valid-store",
            Self::BrandLevelActivationRequest => "brand-level-activation-request",
            Self::BrandAccessControl => "brand-access-control",
            Self::ContractTypeLevelActivationRequest => "contract-type-level-activation-request",
            Self::ContractTypeAccessControl => "contract-type-access-control",
            Self::StoreActivationState => "store-activation-state",
            Self::StoreActivationRequest => "store-activation-request",
            Self::StoreAccessControl => "store-access-control",
            Self::FeatureActivationRequest => "feature-activation-request",
        }
    }

    /// The production table this kind lives in.
    #[must_use]
    pub fn default_table_name(self) -> &'static str {
        match self {
            Self::ValidStore => tables::VALID_STORES,
            Self::BrandLevelActivationRequest => tables::BRAND_LEVEL_ACTIVATION_REQUESTS,
            Self::BrandAccessControl => tables::BRAND_ACCESS_CONTROLS,
            Self::ContractTypeLevelActivationRequest => {
                tables::CONTRACT_TYPE_LEVEL_ACTIVATION_REQUESTS
            },
            Self::ContractTypeAccessControl => tables::CONTRACT_TYPE_ACCESS_CONTROLS,
            Self::StoreActivationState => tables::STORE_ACTIVATION_STATE,
            Self::StoreActivationRequest => tables::STORE_ACTIVATION_REQUESTS,
            Self::StoreAccessControl => tables::STORE_ACCESS_CONTROLS,
            Self::FeatureActivationRequest => tables::FEATURE_ACTIVATION_REQUESTS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A seed row of any kind.
///
/// Build one with `From`, e.g. `ValidStoreEntity::new("US", "001").into()`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationEntity {
    ValidStore(ValidStoreEntity),
    BrandLevelActivationRequest(BrandLevelActivationRequestEntity),
    BrandAccessControl(BrandAccessControlEntity),
    ContractTypeLevelActivationRequest(ContractTypeLevelActivationRequestEntity),
    ContractTypeAccessControl(ContractTypeAccessControlEntity),
    StoreActivationState(StoreActivationStateEntity),
    StoreActivationRequest(StoreActivationRequestEntity),
    StoreAccessControl(StoreAccessControlEntity),
    FeatureActivationRequest(FeatureActivationRequestEntity),
}

macro_rules! activation_entity {
    ($($variant:ident => $entity:ident),* $(,)?) => {
        $(
            impl TableEntity for $entity {
                fn metadata(&self) -> &EntityMetadata {
                    &self.metadata
                }

                fn metadata_mut(&mut self) -> &mut EntityMetadata {
                    &mut self.metadata
                }
            }

            impl $entity {
                /// Creates a row with the given key and default attributes.
                pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
                    Self { metadata: EntityMetadata::new(partition_key, row_key), ..Self::default() }
                }
            }

            impl From<$entity> for ActivationEntity {
                fn from(entity: $entity) -> Self {
                    Self::$variant(entity)
                }
            }
        )*

        impl ActivationEntity {
            /// The kind of this row.
            #[must_use]
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(Self::$variant(_) => EntityKind::$variant,)*
                }
            }

            /// The row's system properties.
            #[must_use]
            pub fn metadata(&self) -> &EntityMetadata {
                match self {
                    $(Self::$variant(entity) => &entity.metadata,)*
                }
            }
        }
    };
}

activation_entity! {
    ValidStore => ValidStoreEntity,
    BrandLevelActivationRequest => BrandLevelActivationRequestEntity,
    BrandAccessControl => BrandAccessControlEntity,
    ContractTypeLevelActivationRequest => ContractTypeLevelActivationRequestEntity,
    ContractTypeAccessControl => ContractTypeAccessControlEntity,
    StoreActivationState => StoreActivationStateEntity,
    StoreActivationRequest => StoreActivationRequestEntity,
    StoreAccessControl => StoreAccessControlEntity,
    FeatureActivationRequest => FeatureActivationRequestEntity,
}

impl ActivationEntity {
    /// Partition key of this row.
    #[must_use]
    pub fn partition_key(&self) -> &str {
        &self.metadata().partition_key
    }

    /// Row key of this row.
    #[must_use]
    pub fn row_key(&self) -> &str {
        &self.metadata().row_key
    }
}
