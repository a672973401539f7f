//! Conversion of resolved call groups into display-ready holdings

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    config::BehaviorsConfig,
    models::{dates, CallGroup, Holding, HoldingStatus, ItemRecord, Policies},
    services::bound_with::ResolvedHoldings,
};

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));

/// Rendering requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Regular record pages
    #[default]
    Page,
    /// Machine-readable (`JSON`) rendering, e.g. AJAX status lookups
    Structured,
}

impl DisplayMode {
    /// Derive the mode from the front-end `action` indicator, keeping word characters only
    pub fn from_action(action: Option<&str>) -> Self {
        let action = action.unwrap_or("Home");
        if NON_WORD.replace_all(action, "") == "JSON" {
            DisplayMode::Structured
        } else {
            DisplayMode::Page
        }
    }
}

/// Flags that shape the rendered holdings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    pub show_base_call_number: bool,
    pub show_staff_notes: bool,
    pub display_mode: DisplayMode,
}

impl NormalizeOptions {
    pub fn new(behaviors: &BehaviorsConfig, display_mode: DisplayMode) -> Self {
        Self {
            show_base_call_number: behaviors.show_base_call_number,
            show_staff_notes: behaviors.show_staff_notes,
            display_mode,
        }
    }
}

/// Title-level context shared by every holding of one request
#[derive(Debug, Clone, Copy)]
pub struct TitleContext<'a> {
    /// Id the caller asked for
    pub requested_id: &'a str,
    pub base_call_number: Option<&'a str>,
    pub is_holdable: bool,
}

/// Build the holding list. Never fails: items without a barcode (absent or empty) and filtered
/// items are skipped, and `number` keeps the unfiltered 1-based position.
pub fn normalize(
    title: TitleContext<'_>,
    resolved: &ResolvedHoldings,
    policies: &Policies,
    options: &NormalizeOptions,
) -> Vec<Holding> {
    let mut holdings = Vec::new();

    for group in &resolved.call_groups {
        for (position, item) in group.items.iter().enumerate() {
            let number = position as u32 + 1;

            let Some(item) = item else { continue };
            let Some(barcode) = item.item_id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };

            if !is_included(group, resolved, title.requested_id) {
                tracing::debug!(
                    "Skipping item {} under {}: outside bound-with call number",
                    barcode,
                    group.call_number
                );
                continue;
            }

            holdings.push(build_holding(title, resolved, group, item, barcode, number, policies, options));
        }
    }

    holdings
}

fn is_included(group: &CallGroup, resolved: &ResolvedHoldings, requested_id: &str) -> bool {
    match resolved.filter_call_number.as_deref() {
        None => true,
        Some(filter) => {
            group.call_number == filter || resolved.parent_id.as_deref() == Some(requested_id)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_holding(
    title: TitleContext<'_>,
    resolved: &ResolvedHoldings,
    group: &CallGroup,
    item: &ItemRecord,
    barcode: &str,
    number: u32,
    policies: &Policies,
    options: &NormalizeOptions,
) -> Holding {
    let (availability, status, add_link) = if item.chargeable {
        (true, HoldingStatus::Available, false)
    } else {
        (false, HoldingStatus::CheckedOut, title.is_holdable)
    };

    let callnumber = match (options.display_mode, options.show_base_call_number) {
        (DisplayMode::Structured, true) => title.base_call_number.unwrap_or_default().to_string(),
        _ => group.call_number.clone(),
    };

    let mut notes = Vec::new();
    if let Some(note) = &item.public_note {
        notes.push(note.clone());
    }
    if let Some(note) = item.staff_note.as_ref().filter(|_| options.show_staff_notes) {
        notes.push(note.clone());
    }

    Holding {
        id: title.requested_id.to_string(),
        availability,
        status,
        location: policies.location(&item.current_location_code),
        reserve: if item.reserve_collection_id.is_some() { "Y" } else { "N" }.to_string(),
        callnumber,
        duedate: item.due_date.as_deref().map(dates::display_date),
        number,
        requests_placed: item.number_of_holds,
        barcode: barcode.to_string(),
        notes,
        summary: Vec::new(),
        is_holdable: title.is_holdable,
        holdtype: "hold".to_string(),
        add_link,
        item_id: barcode.to_string(),
        library: policies.library(&group.library_code),
        material: policies.material(&item.item_type_code),
        bound_with_id: resolved.parent_id.clone(),
        bound_with_title: resolved.parent_title.clone(),
        transit_source_library_id: item.transit_source_library_id.clone(),
        transit_destination_library_id: item.transit_destination_library_id.clone(),
        transit_reason: item.transit_reason.clone(),
        transit_date: item.transit_date.clone(),
    }
}
