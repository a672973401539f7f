//! Patron account models: symws wire shapes and the records handed to the front-end

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{formats::PreferMany, serde_as, OneOrMany};
use utoipa::ToSchema;

use super::de::opt_string_or_number;

// ---------------------------------------------------------------------------
// Requests sent to symws
// ---------------------------------------------------------------------------

/// Query options for `patron/lookupMyAccountInfo`; unset options are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_patron_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_patron_address_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_patron_status_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_patron_hold_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_patron_checkout_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_fee_info: Option<String>,
}

/// Parameters of `patron/createMyHold`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HoldOptions {
    #[serde(rename = "itemID", skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(rename = "titleID", skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
    #[serde(rename = "pickupLibraryID", skip_serializing_if = "Option::is_none")]
    pub pickup_library_id: Option<String>,
    #[serde(rename = "expiresDate", skip_serializing_if = "Option::is_none")]
    pub expires_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses from symws
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserResponse {
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyAccountInfo {
    #[serde(default)]
    pub patron_info: Option<PatronInfo>,
    #[serde(default)]
    pub patron_address_info: Option<PatronAddressInfo>,
    #[serde(default)]
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    pub patron_hold_info: Vec<PatronHoldInfo>,
    #[serde(default)]
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    pub patron_checkout_info: Vec<PatronCheckoutInfo>,
    #[serde(default)]
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    pub fee_info: Vec<FeeInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatronInfo {
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "userID", default)]
    pub user_id: String,
    #[serde(rename = "groupID", default)]
    pub group_id: Option<String>,
}

impl PatronInfo {
    /// Split a `Last, First` display name into (lastname, firstname)
    pub fn split_name(&self) -> (String, String) {
        match self.display_name.split_once(", ") {
            Some((last, first)) => (last.to_string(), first.to_string()),
            None => (self.display_name.clone(), String::new()),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatronAddressInfo {
    #[serde(rename = "Address1Info", default)]
    #[serde_as(as = "OneOrMany<_, PreferMany>")]
    pub address1: Vec<AddressLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressLine {
    #[serde(rename = "addressPolicyID", default)]
    pub policy_id: Option<String>,
    #[serde(default)]
    pub address_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatronHoldInfo {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub title_key: Option<String>,
    #[serde(rename = "pickupLibraryID", default)]
    pub pickup_library_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub hold_key: Option<String>,
    #[serde(default)]
    pub expires_date: Option<String>,
    #[serde(default)]
    pub placed_date: Option<String>,
    #[serde(default)]
    pub queue_position: Option<u32>,
    #[serde(default)]
    pub available: bool,
    #[serde(rename = "itemID", default, deserialize_with = "opt_string_or_number")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Monetary amount, serialized by symws as `{"_": "1.50", "currencyCode": "USD"}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyAmount {
    #[serde(rename = "_", default)]
    pub value: Decimal,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeInfo {
    #[serde(default)]
    pub amount: MoneyAmount,
    #[serde(default)]
    pub amount_outstanding: MoneyAmount,
    #[serde(default)]
    pub bill_reason_description: Option<String>,
    #[serde(default)]
    pub fee_item_info: Option<FeeItemInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeItemInfo {
    #[serde(default)]
    pub checkout_date: Option<String>,
    #[serde(default)]
    pub date_billed: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub title_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatronCheckoutInfo {
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub title_key: Option<String>,
    #[serde(rename = "itemID", default, deserialize_with = "opt_string_or_number")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub renewals: u32,
    #[serde(default)]
    pub recall_notices_sent: u32,
    #[serde(default)]
    pub unseen_renewals_remaining: i32,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewMyCheckoutResponse {
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(rename = "itemID", default, deserialize_with = "opt_string_or_number")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Records returned to the front-end
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Patron {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub cat_username: String,
    pub email: Option<String>,
    pub major: Option<String>,
    pub college: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PatronHold {
    pub id: Option<String>,
    pub location: Option<String>,
    pub reqnum: Option<String>,
    pub expire: Option<String>,
    pub create: Option<String>,
    pub position: Option<u32>,
    pub available: bool,
    pub item_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Fine {
    /// Cents
    pub amount: i64,
    pub checkout: Option<String>,
    pub fine: Option<String>,
    /// Cents
    pub balance: i64,
    pub createdate: Option<String>,
    pub duedate: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Profile {
    pub lastname: String,
    pub firstname: String,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Transaction {
    pub duedate: Option<String>,
    pub id: Option<String>,
    pub barcode: Option<String>,
    pub renew: u32,
    pub request: u32,
    pub renewable: bool,
    pub title: Option<String>,
    pub item_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RenewalResult {
    pub success: bool,
    pub new_date: Option<String>,
    pub new_time: Option<String>,
    pub item_id: Option<String>,
    #[serde(rename = "sysMessage")]
    pub sys_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RenewalResults {
    /// Keyed by barcode, in request order
    #[schema(value_type = Object)]
    pub details: IndexMap<String, RenewalResult>,
}

/// Hold request coming from the front-end
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct HoldRequest {
    pub item_id: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "pickUpLocation")]
    pub pick_up_location: Option<String>,
    #[serde(rename = "requiredBy")]
    pub required_by: Option<String>,
}

impl From<HoldRequest> for HoldOptions {
    fn from(request: HoldRequest) -> Self {
        Self {
            item_id: request.item_id,
            title_id: request.id,
            pickup_library_id: request.pick_up_location,
            expires_date: request.required_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HoldResult {
    pub success: bool,
    #[serde(rename = "sysMessage")]
    pub sys_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CancelHoldItem {
    pub success: bool,
    pub status: String,
    #[serde(rename = "sysMessage", skip_serializing_if = "Option::is_none")]
    pub sys_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CancelHoldsResult {
    pub count: usize,
    /// Keyed by hold key, in request order
    #[schema(value_type = Object)]
    pub items: IndexMap<String, CancelHoldItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_display_name() {
        let info = PatronInfo {
            display_name: "Gillen, Michael".to_string(),
            ..Default::default()
        };
        assert_eq!(info.split_name(), ("Gillen".to_string(), "Michael".to_string()));

        let info = PatronInfo {
            display_name: "Cher".to_string(),
            ..Default::default()
        };
        assert_eq!(info.split_name(), ("Cher".to_string(), String::new()));
    }

    #[test]
    fn test_hold_options_skip_unset() {
        let options = HoldOptions::from(HoldRequest {
            id: Some("T1".to_string()),
            pick_up_location: Some("MAIN".to_string()),
            ..Default::default()
        });
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value, json!({ "titleID": "T1", "pickupLibraryID": "MAIN" }));
    }

    #[test]
    fn test_fee_amounts_decode() {
        let info: MyAccountInfo = serde_json::from_value(json!({
            "feeInfo": {
                "amount": { "_": "2.50", "currencyCode": "USD" },
                "amountOutstanding": { "_": 1.25 },
                "billReasonDescription": "Overdue"
            }
        }))
        .unwrap();
        assert_eq!(info.fee_info.len(), 1);
        assert_eq!(info.fee_info[0].amount.value, Decimal::new(250, 2));
        assert_eq!(info.fee_info[0].amount_outstanding.value, Decimal::new(125, 2));
    }
}
