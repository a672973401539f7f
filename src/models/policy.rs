//! Policy code tables (libraries, locations, item types)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{formats::PreferMany, serde_as, OneOrMany};
use utoipa::ToSchema;

/// A single `{policyID, policyDescription}` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCode {
    #[serde(rename = "policyID")]
    pub code: String,
    #[serde(rename = "policyDescription", default)]
    pub description: String,
}

/// One container of policy entries from a policy list response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyGroup {
    pub entries: Vec<PolicyCode>,
}

/// Wire shape of `admin/lookup*PolicyList`: every property holds a container of entries
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyListResponse(
    #[serde_as(as = "IndexMap<_, OneOrMany<_, PreferMany>>")] pub IndexMap<String, Vec<PolicyCode>>,
);

impl From<PolicyListResponse> for Vec<PolicyGroup> {
    fn from(response: PolicyListResponse) -> Self {
        response
            .0
            .into_values()
            .map(|entries| PolicyGroup { entries })
            .collect()
    }
}

/// Flat code -> description mapping, in remote order
pub type PolicyTable = IndexMap<String, String>;

/// The three disjoint policy tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Libraries,
    Locations,
    Types,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Libraries, PolicyKind::Locations, PolicyKind::Types];

    /// Session key suffix under which the table is memoized
    pub fn key_suffix(&self) -> &'static str {
        match self {
            PolicyKind::Libraries => "policies.libraries",
            PolicyKind::Locations => "policies.locations",
            PolicyKind::Types => "policies.types",
        }
    }
}

/// All tables needed to render holdings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Policies {
    pub libraries: PolicyTable,
    pub locations: PolicyTable,
    pub types: PolicyTable,
}

impl Policies {
    pub fn library(&self, code: &str) -> String {
        describe(&self.libraries, code)
    }

    pub fn location(&self, code: &str) -> String {
        describe(&self.locations, code)
    }

    pub fn material(&self, code: &str) -> String {
        describe(&self.types, code)
    }
}

/// Unmapped codes render as an empty description
fn describe(table: &PolicyTable, code: &str) -> String {
    table.get(code).cloned().unwrap_or_default()
}

/// Flatten one level of nesting into a single table; later duplicates win
pub fn flatten_policy_groups(groups: Vec<PolicyGroup>) -> PolicyTable {
    groups
        .into_iter()
        .flat_map(|group| group.entries)
        .map(|entry| (entry.code, entry.description))
        .collect()
}

/// Pickup location offered when placing a hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PickUpLocation {
    #[serde(rename = "locationID")]
    pub location_id: String,
    #[serde(rename = "locationDisplay")]
    pub location_display: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_list_flattens_containers() {
        let body = json!({
            "policyInfo": [
                { "policyID": "MAIN", "policyDescription": "Main Library" },
                { "policyID": "LAW", "policyDescription": "Law Library" }
            ]
        });
        let response: PolicyListResponse = serde_json::from_value(body).unwrap();
        let table = flatten_policy_groups(response.into());

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("MAIN").map(String::as_str), Some("Main Library"));
        assert_eq!(table.get_index(1).map(|(k, _)| k.as_str()), Some("LAW"));
    }

    #[test]
    fn test_containers_keep_remote_order() {
        let body = r#"{
            "zeta": { "policyID": "ZOO", "policyDescription": "Zoology Library" },
            "alpha": { "policyID": "ART", "policyDescription": "Art Library" }
        }"#;
        let response: PolicyListResponse = serde_json::from_str(body).unwrap();
        let table = flatten_policy_groups(response.into());
        let codes: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(codes, ["ZOO", "ART"]);
    }

    #[test]
    fn test_single_entry_container() {
        let body = json!({ "policyInfo": { "policyID": "BOOK", "policyDescription": "Book" } });
        let response: PolicyListResponse = serde_json::from_value(body).unwrap();
        let table = flatten_policy_groups(response.into());
        assert_eq!(table.get("BOOK").map(String::as_str), Some("Book"));
    }

    #[test]
    fn test_unmapped_code_is_empty() {
        let policies = Policies::default();
        assert_eq!(policies.library("NOPE"), "");
        assert_eq!(policies.location(""), "");
    }
}
