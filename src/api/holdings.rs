//! Catalog holdings and status endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{Holding, PickUpLocation},
    services::{holdings::StatusLookup, normalizer::DisplayMode},
    AppState,
};

use super::SessionContext;

/// Rendering format indicator of the calling page
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RenderQuery {
    /// `JSON` for structured rendering; anything else renders for pages
    pub action: Option<String>,
}

impl RenderQuery {
    fn display_mode(&self) -> DisplayMode {
        DisplayMode::from_action(self.action.as_deref())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusesRequest {
    pub ids: Vec<String>,
}

/// Per-id outcome of a batch status lookup
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusEntry {
    pub id: String,
    /// Absent when the lookup for this id failed
    pub holdings: Option<Vec<Holding>>,
    pub error: Option<String>,
}

impl From<StatusLookup> for StatusEntry {
    fn from(lookup: StatusLookup) -> Self {
        match lookup.result {
            Ok(holdings) => StatusEntry {
                id: lookup.id,
                holdings: Some(holdings),
                error: None,
            },
            Err(e) => StatusEntry {
                id: lookup.id,
                holdings: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Holdings of one title
#[utoipa::path(
    get,
    path = "/holdings/{id}",
    tag = "catalog",
    params(
        ("id" = String, Path, description = "Title ID"),
        RenderQuery
    ),
    responses(
        (status = 200, description = "Holdings in shelf order", body = Vec<Holding>),
        (status = 404, description = "Title not found"),
        (status = 502, description = "symws unavailable")
    )
)]
pub async fn get_holding(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> AppResult<Json<Vec<Holding>>> {
    let holdings = state
        .services
        .holdings
        .get_holding(&session.id, &id, query.display_mode())
        .await?;
    Ok(Json(holdings))
}

/// Availability status of one title
#[utoipa::path(
    get,
    path = "/status/{id}",
    tag = "catalog",
    params(
        ("id" = String, Path, description = "Title ID"),
        RenderQuery
    ),
    responses(
        (status = 200, description = "Holdings in shelf order", body = Vec<Holding>),
        (status = 404, description = "Title not found")
    )
)]
pub async fn get_status(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> AppResult<Json<Vec<Holding>>> {
    let holdings = state
        .services
        .holdings
        .get_status(&session.id, &id, query.display_mode())
        .await?;
    Ok(Json(holdings))
}

/// Availability status of many titles; failures are reported per id
#[utoipa::path(
    post,
    path = "/statuses",
    tag = "catalog",
    params(RenderQuery),
    request_body = StatusesRequest,
    responses(
        (status = 200, description = "One entry per requested id, in request order", body = Vec<StatusEntry>)
    )
)]
pub async fn get_statuses(
    State(state): State<AppState>,
    session: SessionContext,
    Query(query): Query<RenderQuery>,
    Json(request): Json<StatusesRequest>,
) -> Json<Vec<StatusEntry>> {
    let statuses = state
        .services
        .holdings
        .get_statuses(&session.id, &request.ids, query.display_mode())
        .await;
    Json(statuses.into_iter().map(StatusEntry::from).collect())
}

/// Libraries available as hold pickup locations
#[utoipa::path(
    get,
    path = "/pickup-locations",
    tag = "catalog",
    responses(
        (status = 200, description = "Pickup locations", body = Vec<PickUpLocation>)
    )
)]
pub async fn get_pick_up_locations(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<Json<Vec<PickUpLocation>>> {
    let locations = state
        .services
        .holdings
        .get_pick_up_locations(&session.id)
        .await?;
    Ok(Json(locations))
}
