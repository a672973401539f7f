//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, holdings, patron};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "symws bridge API",
        version = "0.3.0",
        description = "Catalog holdings and patron account operations backed by Symphony Web Services",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        holdings::get_holding,
        holdings::get_status,
        holdings::get_statuses,
        holdings::get_pick_up_locations,
        // Patron
        patron::login,
        patron::logout,
        patron::login_hidden,
        patron::get_holds,
        patron::place_hold,
        patron::cancel_holds,
        patron::get_fines,
        patron::get_profile,
        patron::get_transactions,
        patron::renew_items,
    ),
    components(
        schemas(
            // Catalog
            crate::models::holding::Holding,
            crate::models::holding::HoldingStatus,
            crate::models::policy::PickUpLocation,
            holdings::StatusesRequest,
            holdings::StatusEntry,
            // Patron
            patron::LoginRequest,
            patron::LoginResponse,
            patron::RenewRequest,
            patron::CancelHoldsRequest,
            patron::LoginHiddenResponse,
            crate::models::patron::Patron,
            crate::models::patron::PatronHold,
            crate::models::patron::Fine,
            crate::models::patron::Profile,
            crate::models::patron::Transaction,
            crate::models::patron::RenewalResult,
            crate::models::patron::RenewalResults,
            crate::models::patron::HoldRequest,
            crate::models::patron::HoldResult,
            crate::models::patron::CancelHoldItem,
            crate::models::patron::CancelHoldsResult,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Holdings and availability"),
        (name = "patron", description = "Patron account operations")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
