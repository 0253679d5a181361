//! Well-known table names.
//!
//! These are the names the activation services use in production, and the
//! names every [`EntityKind`](crate::EntityKind) is bound to by default.

/// Stores that may take part in feature activation.
pub const VALID_STORES: &str = "valid-stores";

/// Activation requests raised at brand level.
pub const BRAND_LEVEL_ACTIVATION_REQUESTS: &str = "brand-level-activation-requests";

/// Security groups allowed to act for a brand.
pub const BRAND_ACCESS_CONTROLS: &str = "brand-access-controls";

/// Activation requests raised at contract-type level.
pub const CONTRACT_TYPE_LEVEL_ACTIVATION_REQUESTS: &str =
    "contract-type-level-activation-requests";

/// Security groups allowed to act for a contract type.
pub const CONTRACT_TYPE_ACCESS_CONTROLS: &str = "contract-type-access-controls";

/// Current activation state of each feature in each store.
pub const STORE_ACTIVATION_STATE: &str = "store-activation-state";

/// Activation requests raised for a single store.
pub const STORE_ACTIVATION_REQUESTS: &str = "store-activation-requests";

/// Security groups allowed to act for a store.
pub const STORE_ACCESS_CONTROLS: &str = "store-access-controls";

/// Feature-level activation requests.
pub const FEATURE_ACTIVATION_REQUESTS: &str = "feature-activation-requests";

/// Every well-known name, in [`EntityKind::ALL`](crate::EntityKind::ALL) order.
pub const ALL: [&str; 9] = [
    VALID_STORES,
    BRAND_LEVEL_ACTIVATION_REQUESTS,
    BRAND_ACCESS_CONTROLS,
    CONTRACT_TYPE_LEVEL_ACTIVATION_REQUESTS,
    CONTRACT_TYPE_ACCESS_CONTROLS,
    STORE_ACTIVATION_STATE,
    STORE_ACTIVATION_REQUESTS,
    STORE_ACCESS_CONTROLS,
    FEATURE_ACTIVATION_REQUESTS,
];
