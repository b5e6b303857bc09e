use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Citizen Router Module
///
/// Household-only routes. Wrapped in the `require_citizen` guard layer, which
/// redirects everyone else to `/user-login`.
pub fn citizen_routes() -> Router<AppState> {
    Router::new()
        // GET /citizen-dashboard
        // Activities, leaderboards and pickup schedule for the signed-in household.
        .route("/citizen-dashboard", get(handlers::citizen_dashboard))
        // POST /citizen/pickup-requests
        // Files a pickup request; any green points it earns are credited to the session.
        .route("/citizen/pickup-requests", post(handlers::request_pickup))
}
