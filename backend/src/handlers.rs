use crate::{
    AppState,
    auth::{self, CurrentSession},
    dashboard,
    login::{self, LoginForm, LoginOutcome},
    models::{
        ActionResponse, AdminDashboardView, AdminLoginRequest, ApiMessage, CitizenDashboardView,
        CitizenLoginRequest, CitizenRegisterRequest, CompleteTaskRequest, LoginResponse,
        LogoutResponse, PageView, PickupRequest, RegisterResponse, RouteDescriptor,
        ScanQrRequest, WorkerDashboardView, WorkerLoginRequest,
    },
    routes,
    session::{Role, Session, SessionSnapshot},
    session_store::SessionStoreError,
};
use axum::{
    Json,
    extract::{MatchedPath, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::{Value, json};
use uuid::Uuid;

const DEFAULT_TASK_POINTS: i32 = 10;
const DEFAULT_SCAN_POINTS: i32 = 5;

// --- Response helpers ---

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiMessage::failure(message))).into_response()
}

fn store_failure(e: SessionStoreError) -> Response {
    tracing::error!("session store failure: {}", e);
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Session could not be updated. Please try again.",
    )
}

/// Points reported by the backend for an action, or `default` when it reports none.
fn points_earned(reply: &Value, default: i32) -> i32 {
    reply
        .get("pointsEarned")
        .and_then(Value::as_i64)
        .and_then(|points| i32::try_from(points).ok())
        .unwrap_or(default)
}

// --- Pages ---

/// page_view
///
/// [Route Table] Renders a page that carries no data of its own. The view is looked up
/// by the matched route path; the guard layer of the enclosing router has already run.
pub async fn page_view(matched: MatchedPath, current: CurrentSession) -> Response {
    match routes::lookup(matched.as_str()) {
        Some(entry) => Json(PageView {
            view: entry.view.to_string(),
            session: SessionSnapshot::from(&current.session),
        })
        .into_response(),
        None => not_found(current).await,
    }
}

/// not_found
///
/// Router fallback: every path outside the route table renders the `NotFound` view.
pub async fn not_found(current: CurrentSession) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(PageView {
            view: routes::NOT_FOUND_VIEW.to_string(),
            session: SessionSnapshot::from(&current.session),
        }),
    )
        .into_response()
}

/// list_routes
///
/// [Public Route] The client route table with each page's guard requirement.
#[utoipa::path(
    get,
    path = "/routes",
    responses((status = 200, description = "Client route table", body = [RouteDescriptor]))
)]
pub async fn list_routes() -> Json<Vec<RouteDescriptor>> {
    Json(routes::descriptors())
}

// --- Session ---

/// get_session
///
/// [Public Route] Current role and storage keys. Anonymous visitors get `role: null`
/// and an empty key table.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current session", body = SessionSnapshot))
)]
pub async fn get_session(current: CurrentSession) -> Json<SessionSnapshot> {
    Json(SessionSnapshot::from(&current.session))
}

/// get_me
///
/// [Authenticated Route] Full profile of whoever is signed in.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Signed-in profile"),
        (status = 303, description = "Not signed in, redirected to /user-login")
    )
)]
pub async fn get_me(current: CurrentSession) -> Json<Session> {
    Json(current.session)
}

/// login
///
/// Shared body of the three login handlers.
///
/// *Flow*: incomplete forms are refused before the backend is contacted. A verified
/// login always starts a new session id and drops the one the client presented, so a
/// token issued before the login never carries the new identity. A rejected login
/// leaves the session untouched; an unverifiable one never produces a session unless
/// the local demo fallback is switched on.
async fn login(state: AppState, current: CurrentSession, form: LoginForm) -> Response {
    let role = form.role();

    if !form.is_complete() {
        return failure(StatusCode::BAD_REQUEST, form.missing_fields_message());
    }

    let outcome = login::verify(state.backend.as_ref(), &form).await;
    let outcome = login::apply_demo_fallback(outcome, &form, &state.config);

    match outcome {
        LoginOutcome::Verified(session) => {
            let id = Uuid::new_v4();

            if let Err(e) = state.sessions.set_role(id, session.clone()).await {
                return store_failure(e);
            }
            if let Some(previous) = current.id {
                if let Err(e) = state.sessions.clear(previous).await {
                    return store_failure(e);
                }
            }

            let token = match auth::issue_token(id, &state.config) {
                Ok(token) => token,
                Err(e) => {
                    tracing::error!("failed to sign session token: {}", e);
                    return failure(StatusCode::INTERNAL_SERVER_ERROR, "Login failed. Please try again.");
                }
            };

            tracing::info!(role = role.as_str(), session_id = %id, "login verified");

            let cookie = auth::session_cookie(&token, &state.config);
            let body = LoginResponse {
                success: true,
                redirect: role.dashboard_path().to_string(),
                token,
                session: SessionSnapshot::from(&session),
            };
            (StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(body)).into_response()
        }
        LoginOutcome::Rejected { message } => {
            tracing::info!(role = role.as_str(), "login rejected: {}", message);
            failure(StatusCode::UNAUTHORIZED, message)
        }
        LoginOutcome::Unverifiable { reason } => {
            tracing::warn!(role = role.as_str(), "login could not be verified: {}", reason);
            failure(
                StatusCode::SERVICE_UNAVAILABLE,
                "Login service is unavailable. Please try again later.",
            )
        }
    }
}

/// citizen_login
///
/// [Public Route] Signs a household in with its home number.
#[utoipa::path(
    post,
    path = "/login/citizen",
    request_body = CitizenLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ApiMessage),
        (status = 401, description = "Invalid credentials", body = ApiMessage),
        (status = 503, description = "Backend unavailable", body = ApiMessage)
    )
)]
pub async fn citizen_login(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<CitizenLoginRequest>,
) -> Response {
    let form = LoginForm::Citizen {
        home_number: payload.home_number,
        password: payload.password,
    };
    login(state, current, form).await
}

/// worker_login
///
/// [Public Route] Signs a waste-collection worker in with their worker id.
#[utoipa::path(
    post,
    path = "/login/worker",
    request_body = WorkerLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ApiMessage),
        (status = 401, description = "Invalid credentials", body = ApiMessage),
        (status = 503, description = "Backend unavailable", body = ApiMessage)
    )
)]
pub async fn worker_login(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<WorkerLoginRequest>,
) -> Response {
    let form = LoginForm::Worker {
        worker_id: payload.worker_id,
        password: payload.password,
    };
    login(state, current, form).await
}

/// admin_login
///
/// [Public Route] Signs an administrator in. The backend must confirm the `admin` role.
#[utoipa::path(
    post,
    path = "/login/admin",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ApiMessage),
        (status = 401, description = "Invalid credentials or not an admin", body = ApiMessage),
        (status = 503, description = "Backend unavailable", body = ApiMessage)
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<AdminLoginRequest>,
) -> Response {
    let form = LoginForm::Admin {
        email: payload.email,
        password: payload.password,
    };
    login(state, current, form).await
}

/// logout
///
/// [Public Route] Clears every role from the session and expires the cookie.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Signed out", body = LogoutResponse))
)]
pub async fn logout(State(state): State<AppState>, current: CurrentSession) -> Response {
    if let Some(id) = current.id {
        if let Err(e) = state.sessions.clear(id).await {
            return store_failure(e);
        }
        tracing::info!(session_id = %id, "session cleared");
    }

    let body = LogoutResponse {
        success: true,
        redirect: "/".to_string(),
        session: SessionSnapshot::default(),
    };
    (
        StatusCode::OK,
        [(header::SET_COOKIE, auth::expired_session_cookie())],
        Json(body),
    )
        .into_response()
}

/// logout_role
///
/// [Public Route] Signs out of one role only. A session holding a different role is
/// left as it is.
#[utoipa::path(
    post,
    path = "/logout/{role}",
    params(("role" = Role, Path, description = "citizen, worker or admin")),
    responses((status = 200, description = "Role cleared", body = LogoutResponse))
)]
pub async fn logout_role(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(role): Path<Role>,
) -> Response {
    let session = match current.id {
        Some(id) => {
            let cleared = match state.sessions.clear_role(id, role).await {
                Ok(cleared) => cleared,
                Err(e) => return store_failure(e),
            };
            if cleared {
                tracing::info!(role = role.as_str(), session_id = %id, "role cleared");
            }
            match state.sessions.get(id).await {
                Ok(session) => session,
                Err(e) => return store_failure(e),
            }
        }
        None => current.session,
    };

    Json(LogoutResponse {
        success: true,
        redirect: role.login_path().to_string(),
        session: SessionSnapshot::from(&session),
    })
    .into_response()
}

/// citizen_register
///
/// [Public Route] Forwards a household registration to the backend. Registration does
/// not sign the household in.
#[utoipa::path(
    post,
    path = "/citizen-register",
    request_body = CitizenRegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid form or refused by the backend", body = ApiMessage),
        (status = 503, description = "Backend unavailable", body = ApiMessage)
    )
)]
pub async fn citizen_register(
    State(state): State<AppState>,
    Json(payload): Json<CitizenRegisterRequest>,
) -> Response {
    if payload.home_number.trim().is_empty() || payload.password.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Please enter both Home Number and Password");
    }
    if payload.password != payload.confirm_password {
        return failure(StatusCode::BAD_REQUEST, "Passwords do not match");
    }

    let body = json!({
        "fullName": payload.full_name.trim(),
        "email": payload.email.trim(),
        "phone": payload.phone.trim(),
        "address": payload.address.trim(),
        "area": payload.area.trim(),
        "homeNumber": payload.home_number.trim(),
        "password": payload.password,
    });

    match state.backend.post("/api/citizen/register", body).await {
        Ok(reply) => {
            let citizen_id = reply
                .get("citizenId")
                .and_then(Value::as_str)
                .map(str::to_string);
            let message = reply
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Registration successful! Please login with your credentials.")
                .to_string();
            tracing::info!(home_number = payload.home_number.trim(), "citizen registered");
            (
                StatusCode::CREATED,
                Json(RegisterResponse {
                    success: true,
                    message,
                    citizen_id,
                }),
            )
                .into_response()
        }
        Err(e) if e.is_verdict() => failure(StatusCode::BAD_REQUEST, e.message()),
        Err(e) => {
            tracing::warn!("citizen registration failed: {}", e);
            failure(
                StatusCode::SERVICE_UNAVAILABLE,
                "Registration failed. Please try again.",
            )
        }
    }
}

// --- Dashboards ---
//
// The guard layer has already checked the role; the profile match below only fails
// if the session changed in between, in which case the visitor goes back to login.

/// citizen_dashboard
///
/// [Citizen Route] Activities, both area leaderboards and the pickup schedule.
#[utoipa::path(
    get,
    path = "/citizen-dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = CitizenDashboardView),
        (status = 303, description = "Not a citizen, redirected to /user-login")
    )
)]
pub async fn citizen_dashboard(State(state): State<AppState>, current: CurrentSession) -> Response {
    let snapshot = SessionSnapshot::from(&current.session);
    match &current.session {
        Session::Citizen(profile) => {
            Json(dashboard::load_citizen(state.backend.as_ref(), profile, snapshot).await).into_response()
        }
        _ => Redirect::to(Role::Citizen.login_path()).into_response(),
    }
}

/// worker_dashboard
///
/// [Worker Route] Assigned and completed tasks, activities and the area leaderboard.
#[utoipa::path(
    get,
    path = "/worker-dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = WorkerDashboardView),
        (status = 303, description = "Not a worker, redirected to /worker-login")
    )
)]
pub async fn worker_dashboard(State(state): State<AppState>, current: CurrentSession) -> Response {
    let snapshot = SessionSnapshot::from(&current.session);
    match &current.session {
        Session::Worker(profile) => {
            Json(dashboard::load_worker(state.backend.as_ref(), profile, snapshot).await).into_response()
        }
        _ => Redirect::to(Role::Worker.login_path()).into_response(),
    }
}

/// admin_dashboard
///
/// [Admin Route] Municipality-wide workers, citizens, tasks and QR scans.
#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Dashboard data", body = AdminDashboardView),
        (status = 303, description = "Not an admin, redirected to /admin-login")
    )
)]
pub async fn admin_dashboard(State(state): State<AppState>, current: CurrentSession) -> Response {
    let snapshot = SessionSnapshot::from(&current.session);
    match &current.session {
        Session::Admin(_) => {
            Json(dashboard::load_admin(state.backend.as_ref(), snapshot).await).into_response()
        }
        _ => Redirect::to(Role::Admin.login_path()).into_response(),
    }
}

// --- Point-earning actions ---

/// Credits `points` to the session and reports the action's result.
async fn credited(
    state: &AppState,
    id: Uuid,
    points: i32,
    message: String,
    home_number: Option<String>,
) -> Response {
    match state.sessions.credit_points(id, points).await {
        Ok(session) => Json(ActionResponse {
            success: true,
            message,
            points_earned: points,
            home_number,
            session: SessionSnapshot::from(&session),
        })
        .into_response(),
        Err(e) => store_failure(e),
    }
}

/// complete_task
///
/// [Worker Route] Marks a task as done. The golden points it earns (10 unless the
/// backend says otherwise) are credited to the session.
#[utoipa::path(
    post,
    path = "/worker/tasks/{task_id}/complete",
    params(("task_id" = String, Path, description = "Task ID")),
    request_body = CompleteTaskRequest,
    responses(
        (status = 200, description = "Task completed", body = ActionResponse),
        (status = 502, description = "Backend refused or unreachable", body = ApiMessage)
    )
)]
pub async fn complete_task(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(task_id): Path<String>,
    Json(payload): Json<CompleteTaskRequest>,
) -> Response {
    let (Some(id), Session::Worker(profile)) = (current.id, &current.session) else {
        return Redirect::to(Role::Worker.login_path()).into_response();
    };

    let body = json!({
        "workerId": profile.worker_id,
        "taskId": task_id,
        "taskType": payload.task_type,
        "homeNumber": payload.home_number,
    });

    match state.backend.post("/api/worker/complete-task", body).await {
        Ok(reply) => {
            let points = points_earned(&reply, DEFAULT_TASK_POINTS);
            tracing::info!(worker_id = %profile.worker_id, task_id = %task_id, points, "task completed");
            let message = format!("Task completed! You earned {points} golden points.");
            credited(&state, id, points, message, payload.home_number).await
        }
        Err(e) => {
            tracing::warn!(task_id = %task_id, "task completion failed: {}", e);
            failure(StatusCode::BAD_GATEWAY, "Failed to complete task. Please try again.")
        }
    }
}

/// scan_qr
///
/// [Worker Route] Records a household QR scan (a scanned code or a typed home number).
#[utoipa::path(
    post,
    path = "/worker/scan-qr",
    request_body = ScanQrRequest,
    responses(
        (status = 200, description = "Scan recorded", body = ActionResponse),
        (status = 400, description = "Nothing to scan", body = ApiMessage),
        (status = 502, description = "Backend refused or unreachable", body = ApiMessage)
    )
)]
pub async fn scan_qr(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<ScanQrRequest>,
) -> Response {
    let (Some(id), Session::Worker(profile)) = (current.id, &current.session) else {
        return Redirect::to(Role::Worker.login_path()).into_response();
    };

    let qr_data = payload.qr_data.trim();
    if qr_data.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Please enter a QR code or home number.");
    }

    let body = json!({
        "workerId": profile.worker_id,
        "qrData": qr_data,
        "role": profile.worker_role,
    });

    match state.backend.post("/api/worker/scan-qr", body).await {
        Ok(reply) => {
            let points = points_earned(&reply, DEFAULT_SCAN_POINTS);
            let home_number = reply
                .get("homeNumber")
                .and_then(Value::as_str)
                .map(str::to_string);
            let message = match &home_number {
                Some(home) => format!("QR scanned successfully! Home: {home}"),
                None => "QR scanned successfully!".to_string(),
            };
            credited(&state, id, points, message, home_number).await
        }
        Err(e) => {
            tracing::warn!("QR scan failed: {}", e);
            failure(StatusCode::BAD_GATEWAY, "Failed to scan QR code. Please try again.")
        }
    }
}

/// request_pickup
///
/// [Citizen Route] Files a pickup request for the signed-in household.
#[utoipa::path(
    post,
    path = "/citizen/pickup-requests",
    request_body = PickupRequest,
    responses(
        (status = 200, description = "Request submitted", body = ActionResponse),
        (status = 502, description = "Backend refused or unreachable", body = ApiMessage)
    )
)]
pub async fn request_pickup(
    State(state): State<AppState>,
    current: CurrentSession,
    Json(payload): Json<PickupRequest>,
) -> Response {
    let (Some(id), Session::Citizen(profile)) = (current.id, &current.session) else {
        return Redirect::to(Role::Citizen.login_path()).into_response();
    };

    let description = match payload.description.trim() {
        "" => "Pickup request".to_string(),
        text => text.to_string(),
    };
    let body = json!({
        "citizenId": profile.citizen_id,
        "homeNumber": profile.home_number,
        "type": payload.request_type,
        "description": description,
    });

    match state.backend.post("/api/citizen/request-pickup", body).await {
        Ok(reply) => {
            let points = points_earned(&reply, 0);
            credited(
                &state,
                id,
                points,
                "Pickup request submitted successfully!".to_string(),
                Some(profile.home_number.clone()),
            )
            .await
        }
        Err(e) => {
            tracing::warn!(citizen_id = %profile.citizen_id, "pickup request failed: {}", e);
            failure(
                StatusCode::BAD_GATEWAY,
                "Failed to submit pickup request. Please try again.",
            )
        }
    }
}
