//! Project-activation domain client and its fake.
//!
//! Besides the table store, the activation services call out to a directory
//! and project-management system: security-group lookups, facility listings
//! and SharePoint group assignments. [`ProjectActivationClient`] is that
//! seam; [`FakeProjectActivationClient`] answers from a fixed facility list
//! and succeeds at everything else.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HarnessResult;

/// Object id the fake reports for every security group.
pub const FAKE_SECURITY_GROUP_ID: &str = "somerandomstring";

/// A facility known to the project-management system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectFacility {
    /// Store number of the facility.
    pub facility_number: String,
    /// Two-letter state code.
    pub state: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl ProjectFacility {
    /// Creates a facility with the given number and state and an empty name.
    pub fn new(facility_number: impl Into<String>, state: impl Into<String>) -> Self {
        Self { facility_number: facility_number.into(), state: state.into(), name: String::new() }
    }
}

/// A directory security group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroup {
    /// Directory object id.
    pub object_id: String,
    /// Group display name.
    pub display_name: String,
    /// Whether the group is non-empty.
    pub has_at_least_one_member: bool,
}

/// A store's enrolment in the pilot program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PilotStore {
    /// Store number of the pilot store.
    pub store_number: String,
    /// Two-letter state code.
    pub state_code: String,
    /// Whether the store is enrolled in the pilot.
    pub is_pilot: bool,
}

/// Calls the activation services make outside the table store.
#[async_trait]
pub trait ProjectActivationClient: Send + Sync {
    /// Looks up the security group named `name`.
    async fn get_store_security_group(&self, name: &str) -> HarnessResult<SecurityGroup>;

    /// Lists every facility.
    async fn get_all_project_facilities(&self) -> HarnessResult<Vec<ProjectFacility>>;

    /// Lists the facilities with the given number in the given state.
    async fn get_project_facilities(
        &self,
        facility_number: &str,
        state_code: &str,
    ) -> HarnessResult<Vec<ProjectFacility>>;

    /// Creates or updates a pilot-store record, returning the stored record.
    async fn upsert_pilot_store(&self, record: PilotStore) -> HarnessResult<PilotStore>;

    /// Adds `security_group` to the SharePoint group `group` of `site`.
    async fn assign_security_group_to_sharepoint_group(
        &self,
        site: &str,
        group: &str,
        security_group: &str,
    ) -> HarnessResult<bool>;

    /// Removes `security_group` from the SharePoint group `group` of `site`.
    async fn unassign_security_group_from_sharepoint_group(
        &self,
        site: &str,
        group: &str,
        security_group: &str,
    ) -> HarnessResult<bool>;
}

/// In-memory [`ProjectActivationClient`].
///
/// Facility queries answer from the list given at construction. Every
/// security group exists and has members, pilot-store upserts echo their
/// input, and group assignments always succeed.
#[derive(Debug, Clone)]
pub struct FakeProjectActivationClient {
    facilities: Arc<[ProjectFacility]>,
}

impl Default for FakeProjectActivationClient {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FakeProjectActivationClient {
    /// Creates a fake that knows `facilities`.
    #[must_use]
    pub fn new(facilities: Vec<ProjectFacility>) -> Self {
        Self { facilities: facilities.into() }
    }

    /// The facilities this fake was created with.
    #[must_use]
    pub fn facilities(&self) -> &[ProjectFacility] {
        &self.facilities
    }
}

#[async_trait]
impl ProjectActivationClient for FakeProjectActivationClient {
    #[tracing::instrument(skip(self))]
    async fn get_store_security_group(&self, name: &str) -> HarnessResult<SecurityGroup> {
        Ok(SecurityGroup {
            object_id: FAKE_SECURITY_GROUP_ID.to_owned(),
            display_name: name.to_owned(),
            has_at_least_one_member: true,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn get_all_project_facilities(&self) -> HarnessResult<Vec<ProjectFacility>> {
        Ok(self.facilities.to_vec())
    }

    #[tracing::instrument(skip(self))]
    async fn get_project_facilities(
        &self,
        facility_number: &str,
        state_code: &str,
    ) -> HarnessResult<Vec<ProjectFacility>> {
        let matches: Vec<_> = self
            .facilities
            .iter()
            .filter(|f| f.facility_number == facility_number && f.state == state_code)
            .cloned()
            .collect();
        debug!(count = matches.len(), "matched facilities");
        Ok(matches)
    }

    #[tracing::instrument(skip(self))]
    async fn upsert_pilot_store(&self, record: PilotStore) -> HarnessResult<PilotStore> {
        Ok(record)
    }

    #[tracing::instrument(skip(self))]
    async fn assign_security_group_to_sharepoint_group(
        &self,
        site: &str,
        group: &str,
        security_group: &str,
    ) -> HarnessResult<bool> {
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    async fn unassign_security_group_from_sharepoint_group(
        &self,
        site: &str,
        group: &str,
        security_group: &str,
    ) -> HarnessResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn facilities() -> Vec<ProjectFacility> {
        vec![
            ProjectFacility::new("001", "TX"),
            ProjectFacility::new("001", "OK"),
            ProjectFacility::new("002", "TX"),
        ]
    }

    #[tokio::test]
    async fn test_security_group_echoes_name() {
        let client = FakeProjectActivationClient::default();
        let group = client.get_store_security_group("store-001-managers").await.unwrap();
        assert_eq!(group.object_id, FAKE_SECURITY_GROUP_ID);
        assert_eq!(group.display_name, "store-001-managers");
        assert!(group.has_at_least_one_member);
    }

    #[tokio::test]
    async fn test_all_facilities_in_order() {
        let client = FakeProjectActivationClient::new(facilities());
        assert_eq!(client.get_all_project_facilities().await.unwrap(), facilities());
    }

    #[tokio::test]
    async fn test_facilities_match_number_and_state() {
        let client = FakeProjectActivationClient::new(facilities());
        let found = client.get_project_facilities("001", "TX").await.unwrap();
        assert_eq!(found, [ProjectFacility::new("001", "TX")]);
        assert!(client.get_project_facilities("003", "TX").await.unwrap().is_empty());
        assert!(client.get_project_facilities("001", "tx").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_pilot_store_echoes() {
        let client = FakeProjectActivationClient::default();
        let record =
            PilotStore { store_number: "001".into(), state_code: "TX".into(), is_pilot: true };
        assert_eq!(client.upsert_pilot_store(record.clone()).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_group_assignment_always_succeeds() {
        let client: Arc<dyn ProjectActivationClient> =
            Arc::new(FakeProjectActivationClient::default());
        assert!(client.assign_security_group_to_sharepoint_group("s", "g", "sg").await.unwrap());
        assert!(
            client.unassign_security_group_from_sharepoint_group("s", "g", "sg").await.unwrap()
        );
    }
}
