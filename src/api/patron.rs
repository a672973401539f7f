//! Patron account endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::patron::{
        CancelHoldsResult, Fine, HoldRequest, HoldResult, Patron, PatronHold, Profile,
        RenewalResults, Transaction,
    },
    AppState,
};

use super::SessionContext;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Send back as `X-Session-Id` on later requests
    pub session_id: String,
    pub patron: Patron,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenewRequest {
    /// Barcodes of the checkouts to renew
    #[validate(length(min = 1, message = "At least one barcode is required"))]
    pub details: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelHoldsRequest {
    /// Hold keys to cancel
    #[validate(length(min = 1, message = "At least one hold key is required"))]
    pub details: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginHiddenResponse {
    pub hidden: bool,
}

/// Log a patron in; anonymous callers get a fresh session id
#[utoipa::path(
    post,
    path = "/patron/login",
    tag = "patron",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let session_id = if session.anonymous {
        Uuid::new_v4().to_string()
    } else {
        session.id
    };

    let patron = state
        .services
        .patron
        .login(&session_id, &request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse { session_id, patron }))
}

/// End the session
#[utoipa::path(
    post,
    path = "/patron/logout",
    tag = "patron",
    responses(
        (status = 204, description = "Session cleared")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<StatusCode> {
    state.services.patron.logout(&session.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Whether the catalog should hide its login options
#[utoipa::path(
    get,
    path = "/patron/login-hidden",
    tag = "patron",
    responses(
        (status = 200, description = "Login visibility", body = LoginHiddenResponse)
    )
)]
pub async fn login_hidden(State(state): State<AppState>) -> Json<LoginHiddenResponse> {
    Json(LoginHiddenResponse {
        hidden: state.services.patron.login_is_hidden(),
    })
}

#[utoipa::path(
    get,
    path = "/patron/holds",
    tag = "patron",
    responses(
        (status = 200, description = "Active holds", body = Vec<PatronHold>),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn get_holds(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<Json<Vec<PatronHold>>> {
    Ok(Json(state.services.patron.get_my_holds(&session.id).await?))
}

#[utoipa::path(
    post,
    path = "/patron/holds",
    tag = "patron",
    request_body = HoldRequest,
    responses(
        (status = 200, description = "Hold outcome", body = HoldResult),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn place_hold(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<HoldRequest>,
) -> AppResult<Json<HoldResult>> {
    if request.id.is_none() && request.item_id.is_none() {
        return Err(AppError::BadRequest("A title id or item id is required".to_string()));
    }
    Ok(Json(state.services.patron.place_hold(&session.id, request).await?))
}

#[utoipa::path(
    post,
    path = "/patron/holds/cancel",
    tag = "patron",
    request_body = CancelHoldsRequest,
    responses(
        (status = 200, description = "Per-hold outcome", body = CancelHoldsResult),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn cancel_holds(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<CancelHoldsRequest>,
) -> AppResult<Json<CancelHoldsResult>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(Json(
        state
            .services
            .patron
            .cancel_holds(&session.id, &request.details)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/patron/fines",
    tag = "patron",
    responses(
        (status = 200, description = "Fines, amounts in cents", body = Vec<Fine>),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn get_fines(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<Json<Vec<Fine>>> {
    Ok(Json(state.services.patron.get_my_fines(&session.id).await?))
}

#[utoipa::path(
    get,
    path = "/patron/profile",
    tag = "patron",
    responses(
        (status = 200, description = "Patron profile", body = Profile),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<Json<Profile>> {
    Ok(Json(state.services.patron.get_my_profile(&session.id).await?))
}

#[utoipa::path(
    get,
    path = "/patron/transactions",
    tag = "patron",
    responses(
        (status = 200, description = "Current checkouts", body = Vec<Transaction>),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn get_transactions(
    State(state): State<AppState>,
    session: SessionContext,
) -> AppResult<Json<Vec<Transaction>>> {
    Ok(Json(state.services.patron.get_my_transactions(&session.id).await?))
}

#[utoipa::path(
    post,
    path = "/patron/renewals",
    tag = "patron",
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Per-barcode outcome", body = RenewalResults),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn renew_items(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<RenewRequest>,
) -> AppResult<Json<RenewalResults>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(Json(
        state
            .services
            .patron
            .renew_my_items(&session.id, &request.details)
            .await?,
    ))
}
