//! Catalog title records as returned by `standard/lookupTitleInfo`

use serde::{Deserialize, Deserializer};
use serde_with::{formats::PreferMany, serde_as, DefaultOnError, OneOrMany};

use super::de::{opt_string_or_number, string_or_number};

/// Envelope of a title lookup; empty when the title id is unknown
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupTitleInfoResponse {
    #[serde(rename = "TitleInfo", default)]
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    pub title_info: Vec<TitleRecord>,
}

/// Raw per-title catalog tree
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleRecord {
    #[serde(rename = "titleID", default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub base_call_number: Option<String>,
    #[serde(
        rename = "TitleAvailabilityInfo",
        default,
        deserialize_with = "holdable_flag"
    )]
    pub holdable: bool,
    #[serde(rename = "CallInfo", default)]
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    pub call_groups: Vec<CallGroup>,
    #[serde(rename = "BoundwithLinkInfo", default)]
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    pub bound_with_links: Vec<BoundWithLink>,
    #[serde(rename = "numberOfBoundwithLinks", default)]
    pub number_of_bound_with_links: u32,
}

#[derive(Deserialize)]
struct TitleAvailability {
    #[serde(default)]
    holdable: bool,
}

fn holdable_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let availability = Option::<TitleAvailability>::deserialize(deserializer)?;
    Ok(availability.map(|a| a.holdable).unwrap_or(false))
}

/// Items shelved under one call number at one library
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGroup {
    #[serde(default)]
    pub call_number: String,
    #[serde(rename = "libraryID", default)]
    pub library_code: String,
    /// Null or undecodable entries are kept as `None` so that sibling positions stay stable
    #[serde(rename = "ItemInfo", default)]
    #[serde_as(as = "OneOrMany<DefaultOnError, PreferMany>")]
    pub items: Vec<Option<ItemRecord>>,
}

/// One physical copy
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Barcode
    #[serde(rename = "itemID", default, deserialize_with = "opt_string_or_number")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub chargeable: bool,
    #[serde(rename = "currentLocationID", default)]
    pub current_location_code: String,
    #[serde(rename = "itemTypeID", default)]
    pub item_type_code: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(rename = "reserveCollectionID", default)]
    pub reserve_collection_id: Option<String>,
    #[serde(default)]
    pub number_of_holds: u32,
    #[serde(default)]
    pub public_note: Option<String>,
    #[serde(default)]
    pub staff_note: Option<String>,
    #[serde(rename = "transitSourceLibraryID", default)]
    pub transit_source_library_id: Option<String>,
    #[serde(rename = "transitDestinationLibraryID", default)]
    pub transit_destination_library_id: Option<String>,
    #[serde(default)]
    pub transit_reason: Option<String>,
    #[serde(default)]
    pub transit_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundWithLink {
    #[serde(default)]
    pub linked_as_parent: bool,
    #[serde(default)]
    pub call_number: String,
    #[serde(default)]
    pub linked_title: LinkedTitle,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LinkedTitle {
    #[serde(rename = "titleID", default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
}
