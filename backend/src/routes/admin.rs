use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Oversight routes for municipal administrators. Wrapped in the `require_admin`
/// guard layer, which redirects everyone else to `/admin-login`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Workers, citizens, tasks and QR scans across the whole municipality.
        .route("/admin", get(handlers::admin_dashboard))
}
