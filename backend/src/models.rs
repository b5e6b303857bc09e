use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{guard::RouteRequirement, session::SessionSnapshot};

// --- Login & Registration Forms ---

/// CitizenLoginRequest
///
/// Body of `POST /login/citizen`. Households sign in with their home number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CitizenLoginRequest {
    #[serde(default)]
    pub home_number: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WorkerLoginRequest {
    #[serde(default)]
    pub worker_id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// CitizenRegisterRequest
///
/// Body of `POST /citizen-register`. `confirm_password` is checked here and never
/// forwarded to the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CitizenRegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub area: String,
    pub home_number: String,
    pub password: String,
    pub confirm_password: String,
}

// --- Responses ---

/// ApiMessage
///
/// Generic `{ success, message }` envelope, mirroring the backend's convention.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// LoginResponse
///
/// Answer to a successful login: where to navigate, the session token (also set as a
/// cookie) and the storage keys the client should mirror.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub success: bool,
    pub redirect: String,
    pub token: String,
    pub session: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LogoutResponse {
    pub success: bool,
    pub redirect: String,
    pub session: SessionSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub citizen_id: Option<String>,
}

/// RouteDescriptor
///
/// One row of the client route table served at `GET /routes`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteDescriptor {
    pub path: String,
    pub view: String,
    pub requirement: RouteRequirement,
}

// --- Views ---
//
// Records coming from the backend (tasks, activities, leaderboard rows, ...) are
// passed through untouched as JSON values.

/// PageView
///
/// Minimal view model for pages that carry no data of their own.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageView {
    pub view: String,
    pub session: SessionSnapshot,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CitizenDashboardView {
    pub session: SessionSnapshot,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub activities: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub leaderboard: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub worker_leaderboard: Vec<Value>,
    #[ts(type = "unknown | null")]
    #[schema(value_type = Option<Object>)]
    pub schedule: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WorkerDashboardView {
    pub session: SessionSnapshot,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub assigned_tasks: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub completed_tasks: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub activities: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub leaderboard: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminDashboardView {
    pub session: SessionSnapshot,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub workers: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub citizens: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub tasks: Vec<Value>,
    #[ts(type = "Array<unknown>")]
    #[schema(value_type = Vec<Object>)]
    pub qr_scans: Vec<Value>,
}

// --- Point-earning actions ---

/// CompleteTaskRequest
///
/// Optional details of the task being closed, forwarded to the backend as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompleteTaskRequest {
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub home_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ScanQrRequest {
    #[serde(default)]
    pub qr_data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PickupRequest {
    #[serde(rename = "type", default = "default_pickup_type")]
    pub request_type: String,
    #[serde(default)]
    pub description: String,
}

fn default_pickup_type() -> String {
    "general".to_string()
}

/// ActionResponse
///
/// Result of a point-earning action, with the session as it stands after crediting.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    pub points_earned: i32,
    pub home_number: Option<String>,
    pub session: SessionSnapshot,
}
