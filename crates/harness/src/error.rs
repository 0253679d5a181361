//! Error types for the activation harness.
//!
//! Harness errors arise while the container is being assembled (invalid
//! configuration, seed rows that cannot be placed) or when a test asks for a
//! collaborator it did not set up. Failures raised by the fake tables
//! themselves are carried through unchanged as [`HarnessError::Table`].

use activation_tables::TableError;
use thiserror::Error;

use crate::entities::EntityKind;

/// Result type alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while building or using a [`TestServices`](crate::TestServices).
///
/// # Non-exhaustive
///
/// New variants may be added without a semver-breaking change. Downstream
/// match expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HarnessError {
    /// A seed row's kind has no table binding and the configuration rejects
    /// unbound seeds.
    #[error("Seed row of kind {kind} has no table binding")]
    UnboundSeedKind {
        /// Kind of the row that could not be placed.
        kind: EntityKind,
    },

    /// The harness configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// The test asked for a collaborator that was not registered.
    #[error("Service not registered: {service}")]
    ServiceNotRegistered {
        /// Name of the missing collaborator.
        service: &'static str,
    },

    /// A fake table operation failed.
    #[error(transparent)]
    Table(#[from] TableError),
}

impl HarnessError {
    /// Creates a new `Config` error with the given message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Creates a new `ServiceNotRegistered` error for the given collaborator.
    #[must_use]
    pub fn service_not_registered(service: &'static str) -> Self {
        Self::ServiceNotRegistered { service }
    }
}
