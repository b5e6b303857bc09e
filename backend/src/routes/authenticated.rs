use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes open to any signed-in visitor regardless of role. Wrapped in the
/// `require_signed_in` guard layer by `create_router`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /me
        // Profile of whoever is signed in.
        .route("/me", get(handlers::get_me))
}
