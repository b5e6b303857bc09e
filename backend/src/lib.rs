use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session state and its access control.
pub mod auth;
pub mod guard;
pub mod session;
pub mod session_store;

// Talking to the external EcoSarthi backend.
pub mod backend;
pub mod dashboard;
pub mod login;

pub mod config;
pub mod handlers;
pub mod models;

// Routing segregated by access level (public, session, signed-in, citizen, worker, admin).
pub mod routes;
use routes::{admin, authenticated, citizen, public, session as session_routes, worker};

// --- Public Re-exports ---

pub use backend::{BackendApi, BackendState, HttpBackendClient};
pub use config::AppConfig;
pub use session_store::{InMemorySessionStore, PostgresSessionStore, SessionState, SessionStore};

/// ApiDoc
///
/// OpenAPI document for the portal gateway, served at `/api-docs/openapi.json` and
/// browsable through the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_routes, handlers::get_session, handlers::get_me,
        handlers::citizen_login, handlers::worker_login, handlers::admin_login,
        handlers::logout, handlers::logout_role, handlers::citizen_register,
        handlers::citizen_dashboard, handlers::worker_dashboard, handlers::admin_dashboard,
        handlers::complete_task, handlers::scan_qr, handlers::request_pickup
    ),
    components(
        schemas(
            models::CitizenLoginRequest, models::WorkerLoginRequest, models::AdminLoginRequest,
            models::CitizenRegisterRequest, models::ApiMessage, models::LoginResponse,
            models::LogoutResponse, models::RegisterResponse, models::RouteDescriptor,
            models::PageView, models::CitizenDashboardView, models::WorkerDashboardView,
            models::AdminDashboardView, models::CompleteTaskRequest, models::ScanQrRequest,
            models::PickupRequest, models::ActionResponse, session::SessionSnapshot,
            session::Role, session::CitizenProfile, session::WorkerProfile,
            session::AdminProfile, guard::RouteRequirement,
        )
    ),
    tags(
        (name = "ecosarthi-portal", description = "EcoSarthi municipal waste portal gateway")
    )
)]
struct ApiDoc;

/// AppState
///
/// Unified state shared by every request: the session store, the backend client and
/// the immutable configuration. Handlers and extractors pull the part they need via
/// `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// The only shared mutable state of the gateway.
    pub sessions: SessionState,
    /// Client for the external EcoSarthi backend API.
    pub backend: BackendState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure. Each gated route group gets its own guard layer
/// (`route_layer`, so unmatched paths still fall through to the `NotFound` view
/// instead of being redirected).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(session_routes::session_routes())
        .merge(authenticated::authenticated_routes().route_layer(
            middleware::from_fn_with_state(state.clone(), guard::require_signed_in),
        ))
        .merge(citizen::citizen_routes().route_layer(
            middleware::from_fn_with_state(state.clone(), guard::require_citizen),
        ))
        .merge(worker::worker_routes().route_layer(
            middleware::from_fn_with_state(state.clone(), guard::require_worker),
        ))
        .merge(admin::admin_routes().route_layer(
            middleware::from_fn_with_state(state.clone(), guard::require_admin),
        ))
        .fallback(handlers::not_found)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer`: method, URI and the `x-request-id` so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
