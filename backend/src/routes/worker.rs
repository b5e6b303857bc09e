use crate::{
    AppState, handlers,
    guard::RouteRequirement,
    routes::paths_with,
    session::Role,
};
use axum::{
    Router,
    routing::{get, post},
};

const DASHBOARD: &str = "/worker-dashboard";

/// Worker Router Module
///
/// Routes for waste-collection workers. Wrapped in the `require_worker` guard layer,
/// which redirects everyone else to `/worker-login`.
pub fn worker_routes() -> Router<AppState> {
    let router = Router::new()
        // GET /worker-dashboard
        // Assigned and completed tasks, activities and the area leaderboard.
        .route(DASHBOARD, get(handlers::worker_dashboard))
        // POST /worker/tasks/{task_id}/complete
        // Closes a task; the golden points it earns are credited to the session.
        .route(
            "/worker/tasks/{task_id}/complete",
            post(handlers::complete_task),
        )
        // POST /worker/scan-qr
        // Records a household QR scan.
        .route("/worker/scan-qr", post(handlers::scan_qr));

    // The remaining worker pages (collection tasks, training hub, ...) carry no
    // data of their own.
    paths_with(RouteRequirement::role(Role::Worker))
        .filter(|path| *path != DASHBOARD)
        .fold(router, |router, path| router.route(path, get(handlers::page_view)))
}
