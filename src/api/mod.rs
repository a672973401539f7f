//! API handlers for the symws bridge REST endpoints

pub mod health;
pub mod holdings;
pub mod openapi;
pub mod patron;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, services::session::ANONYMOUS_SESSION, AppState};

pub const SESSION_HEADER: &str = "x-session-id";

/// Session the request belongs to, from the `X-Session-Id` header
pub struct SessionContext {
    pub id: String,
    pub anonymous: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(SESSION_HEADER) else {
            return Ok(SessionContext {
                id: ANONYMOUS_SESSION.to_string(),
                anonymous: true,
            });
        };

        let id = value
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid session header".to_string()))?;

        // Session ids become part of store keys
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(AppError::BadRequest("Invalid session id".to_string()));
        }

        Ok(SessionContext {
            id: id.to_string(),
            anonymous: id == ANONYMOUS_SESSION,
        })
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/holdings/:id", get(holdings::get_holding))
        .route("/status/:id", get(holdings::get_status))
        .route("/statuses", post(holdings::get_statuses))
        .route("/pickup-locations", get(holdings::get_pick_up_locations))
        // Patron account
        .route("/patron/login", post(patron::login))
        .route("/patron/logout", post(patron::logout))
        .route("/patron/login-hidden", get(patron::login_hidden))
        .route("/patron/holds", get(patron::get_holds).post(patron::place_hold))
        .route("/patron/holds/cancel", post(patron::cancel_holds))
        .route("/patron/fines", get(patron::get_fines))
        .route("/patron/profile", get(patron::get_profile))
        .route("/patron/transactions", get(patron::get_transactions))
        .route("/patron/renewals", post(patron::renew_items))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
