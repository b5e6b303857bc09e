use crate::{AppState, guard::RouteRequirement, handlers, routes::paths_with};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Pages any visitor may open, signed in or not, plus the service endpoints the
/// frontend and load balancer poll. Every path comes straight from `ROUTE_TABLE`,
/// so adding a public page there is enough to serve it.
pub fn public_routes() -> Router<AppState> {
    let router = Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /routes
        // The client route table with each page's guard requirement.
        .route("/routes", get(handlers::list_routes));

    paths_with(RouteRequirement::PUBLIC)
        .fold(router, |router, path| router.route(path, get(handlers::page_view)))
}
