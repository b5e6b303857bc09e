use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Session Router Module
///
/// The only routes that write the session store on behalf of an anonymous visitor.
/// Unguarded: logging in is how a visitor gets past the guard in the first place.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        // POST /login/{citizen,worker,admin}
        // Verifies credentials against the backend and, on success, replaces whatever
        // role the session held with the new one.
        .route("/login/citizen", post(handlers::citizen_login))
        .route("/login/worker", post(handlers::worker_login))
        .route("/login/admin", post(handlers::admin_login))
        // POST /citizen-register
        // Forwards a household registration. Does not sign the household in.
        .route("/citizen-register", post(handlers::citizen_register))
        // GET /session
        // Current role and storage keys; anonymous visitors get an empty table.
        .route("/session", get(handlers::get_session))
        // POST /logout
        // Clears the session entirely.
        .route("/logout", post(handlers::logout))
        // POST /logout/{role}
        // Clears the session only if it currently holds `role`.
        .route("/logout/{role}", post(handlers::logout_role))
}
