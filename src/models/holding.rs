//! Display-ready holding records

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum HoldingStatus {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Checked Out")]
    CheckedOut,
}

/// One physical holding as consumed by the catalog front-end templates.
///
/// Field names are part of the output contract and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Holding {
    /// Requested title id (not the bound-with parent)
    pub id: String,
    pub availability: bool,
    pub status: HoldingStatus,
    pub location: String,
    /// `Y` when the item sits in a reserve collection, `N` otherwise
    pub reserve: String,
    pub callnumber: String,
    pub duedate: Option<String>,
    /// 1-based position in the unfiltered call group
    pub number: u32,
    pub requests_placed: u32,
    pub barcode: String,
    pub notes: Vec<String>,
    pub summary: Vec<String>,
    pub is_holdable: bool,
    pub holdtype: String,
    #[serde(rename = "addLink")]
    pub add_link: bool,
    pub item_id: String,
    pub library: String,
    pub material: String,
    pub bound_with_id: Option<String>,
    pub bound_with_title: Option<String>,
    pub transit_source_library_id: Option<String>,
    pub transit_destination_library_id: Option<String>,
    pub transit_reason: Option<String>,
    pub transit_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(HoldingStatus::CheckedOut).unwrap(),
            serde_json::json!("Checked Out")
        );
        assert_eq!(
            serde_json::to_value(HoldingStatus::Available).unwrap(),
            serde_json::json!("Available")
        );
    }
}
