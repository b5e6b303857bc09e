#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query},
    http::{HeaderMap, Method, Request, StatusCode, header},
    routing::{get, post},
};
use ecosarthi_portal::{
    AppConfig, AppState, HttpBackendClient, InMemorySessionStore, create_router,
    session::{AdminProfile, CitizenProfile, Session, WorkerProfile},
};
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceExt;
use uuid::Uuid;

/// Nothing listens here; connections are refused immediately.
pub const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:1";

pub const SESSION_ID_HEADER: &str = "x-session-id";

// --- Test App ---

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

pub fn local_config(backend_url: &str) -> AppConfig {
    AppConfig {
        backend_url: backend_url.to_string(),
        backend_timeout_secs: 2,
        ..AppConfig::default()
    }
}

pub fn build_app(config: AppConfig) -> TestApp {
    let backend = HttpBackendClient::new(
        &config.backend_url,
        Duration::from_secs(config.backend_timeout_secs),
    )
    .expect("Failed to build backend client");

    let state = AppState {
        sessions: Arc::new(InMemorySessionStore::new()),
        backend: Arc::new(backend),
        config,
    };

    TestApp {
        router: create_router(state.clone()),
        state,
    }
}

/// App wired to a freshly spawned fake backend.
pub async fn spawn_app() -> TestApp {
    let backend_url = spawn_fake_backend().await;
    build_app(local_config(&backend_url))
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Stores `session` under a fresh id, as a completed login would.
    pub async fn sign_in(&self, session: Session) -> Uuid {
        let id = Uuid::new_v4();
        self.state
            .sessions
            .set_role(id, session)
            .await
            .expect("in-memory store never fails");
        id
    }

    pub async fn session_of(&self, id: Uuid) -> Session {
        self.state.sessions.get(id).await.expect("in-memory store never fails")
    }
}

// --- Request Builders ---

pub fn get_request(uri: &str, session: Option<Uuid>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(id) = session {
        builder = builder.header(SESSION_ID_HEADER, id.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value, session: Option<Uuid>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session {
        builder = builder.header(SESSION_ID_HEADER, id.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

// --- Sample Sessions ---

pub fn citizen_session() -> Session {
    Session::Citizen(CitizenProfile {
        citizen_id: "CIT-1".to_string(),
        home_number: "H-101".to_string(),
        name: "Asha".to_string(),
        green_points: 40,
        area: Some("Ward 5".to_string()),
    })
}

pub fn worker_session() -> Session {
    Session::Worker(WorkerProfile {
        worker_id: "W-7".to_string(),
        name: "Ravi".to_string(),
        worker_role: Some("garbage_collector".to_string()),
        golden_points: 12,
        area: Some("Ward 5".to_string()),
    })
}

pub fn admin_session() -> Session {
    Session::Admin(AdminProfile {
        admin_id: "ADM-1".to_string(),
        name: "Meera".to_string(),
        email: "admin@ecosarthi.in".to_string(),
    })
}

// --- Fake Backend ---
//
// Stands in for the EcoSarthi backend API with canned accounts:
// citizen H-101 / secret, worker W-7 / secret, admin admin@ecosarthi.in / secret,
// and clerk@ecosarthi.in / secret whose account is not an admin. Citizen logins for
// H-500 crash the backend, and H-300 gets a success reply with no citizen in it.

pub async fn spawn_fake_backend() -> String {
    let app = Router::new()
        .route("/api/citizen/login", post(citizen_login))
        .route("/api/worker/login", post(worker_login))
        .route("/api/auth/login", post(admin_login))
        .route("/api/citizen/register", post(citizen_register))
        .route("/api/citizen/activities/{id}", get(citizen_activities))
        .route("/api/citizen/leaderboard", get(leaderboard))
        .route("/api/worker/leaderboard", get(leaderboard))
        .route("/api/citizen/schedule/{id}", get(broken_endpoint))
        .route("/api/citizen/request-pickup", post(request_pickup))
        .route("/api/worker/tasks/{id}", get(worker_tasks))
        .route("/api/worker/activities/{id}", get(empty_activities))
        .route("/api/worker/complete-task", post(complete_task))
        .route("/api/worker/scan-qr", post(scan_qr))
        .route(
            "/api/admin/workers",
            get(|| async { Json(json!({ "success": true, "workers": [{ "workerId": "W-7" }] })) }),
        )
        .route(
            "/api/admin/citizens",
            get(|| async { Json(json!({ "success": true, "citizens": [{ "citizenId": "CIT-1" }, { "citizenId": "CIT-2" }] })) }),
        )
        .route(
            "/api/admin/tasks",
            get(|| async { Json(json!({ "success": true, "tasks": [] })) }),
        )
        .route(
            "/api/admin/qr-scans",
            get(|| async { Json(json!({ "success": true, "scans": [{ "homeNumber": "H-101" }] })) }),
        );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

type Reply = (StatusCode, Json<Value>);

fn refused(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "success": false, "message": message })))
}

async fn citizen_login(Json(body): Json<Value>) -> Reply {
    if body["homeNumber"] == "H-500" {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    if body["homeNumber"] == "H-300" {
        return (StatusCode::OK, Json(json!({ "success": true })));
    }
    if body["homeNumber"] == "H-101" && body["password"] == "secret" {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "citizenId": "CIT-1",
                "citizenName": "Asha",
                "greenPoints": 40,
                "area": "Ward 5",
            })),
        );
    }
    refused(StatusCode::UNAUTHORIZED, "Invalid home number or password")
}

// Refuses with a 200 and `success: false`, the other way the backend says no.
async fn worker_login(Json(body): Json<Value>) -> Reply {
    if body["workerId"] == "W-7" && body["password"] == "secret" {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "workerId": "W-7",
                "workerName": "Ravi",
                "role": "garbage_collector",
                "goldenPoints": 12,
                "area": "Ward 5",
            })),
        );
    }
    refused(StatusCode::OK, "Invalid worker credentials")
}

async fn admin_login(Json(body): Json<Value>) -> Reply {
    let role = match body["email"].as_str() {
        Some("admin@ecosarthi.in") => "admin",
        Some("clerk@ecosarthi.in") => "citizen",
        _ => return refused(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    };
    if body["password"] != "secret" || body["role"] != "admin" {
        return refused(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let email = body["email"].clone();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "user": {
                "id": "ADM-1",
                "name": "Meera",
                "email": email,
                "role": role,
            },
        })),
    )
}

async fn citizen_register(Json(body): Json<Value>) -> Reply {
    if body["homeNumber"] == "H-101" {
        return refused(StatusCode::CONFLICT, "Home number already registered");
    }
    if body.get("confirmPassword").is_some() {
        return refused(StatusCode::BAD_REQUEST, "unexpected field confirmPassword");
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "citizenId": "CIT-2", "message": "Registration successful" })),
    )
}

async fn citizen_activities(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "success": true,
        "activities": [{ "citizenId": id, "activityType": "Pickup Request", "pointsEarned": 3 }],
    }))
}

async fn empty_activities() -> Json<Value> {
    Json(json!({ "success": true, "activities": [] }))
}

async fn leaderboard(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let area = params.get("area").cloned().unwrap_or_default();
    Json(json!({
        "success": true,
        "leaderboard": [{ "name": "Asha", "area": area, "points": 40 }],
    }))
}

async fn broken_endpoint() -> Reply {
    refused(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable")
}

async fn worker_tasks(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let status = params.get("status").cloned().unwrap_or_default();
    Json(json!({
        "success": true,
        "tasks": [{ "taskId": "T-1", "workerId": id, "status": status }],
    }))
}

async fn complete_task(Json(body): Json<Value>) -> Reply {
    if body["taskId"] == "T-broken" {
        return refused(StatusCode::INTERNAL_SERVER_ERROR, "Task could not be saved");
    }
    (StatusCode::OK, Json(json!({ "success": true, "pointsEarned": 15 })))
}

async fn scan_qr(Json(body): Json<Value>) -> Reply {
    let home_number = body["qrData"].clone();
    (
        StatusCode::OK,
        Json(json!({ "success": true, "homeNumber": home_number })),
    )
}

async fn request_pickup(Json(body): Json<Value>) -> Reply {
    if body["citizenId"] != "CIT-1" {
        return refused(StatusCode::NOT_FOUND, "Citizen not found");
    }
    (StatusCode::OK, Json(json!({ "success": true, "pointsEarned": 3 })))
}
