use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    backend::{BackendApi, BackendError},
    config::AppConfig,
    session::{AdminProfile, CitizenProfile, Role, Session, WorkerProfile},
};

/// LoginForm
///
/// A submitted credential pair, tagged with the role it tries to sign in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginForm {
    Citizen { home_number: String, password: String },
    Worker { worker_id: String, password: String },
    Admin { email: String, password: String },
}

/// LoginOutcome
///
/// The three ways a login attempt can end. `Unverifiable` means the backend could not be
/// asked at all; only `Verified` ever carries a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Verified(Session),
    Rejected { message: String },
    Unverifiable { reason: String },
}

impl LoginForm {
    pub fn role(&self) -> Role {
        match self {
            LoginForm::Citizen { .. } => Role::Citizen,
            LoginForm::Worker { .. } => Role::Worker,
            LoginForm::Admin { .. } => Role::Admin,
        }
    }

    fn fields(&self) -> (&str, &str) {
        match self {
            LoginForm::Citizen { home_number, password } => (home_number.as_str(), password.as_str()),
            LoginForm::Worker { worker_id, password } => (worker_id.as_str(), password.as_str()),
            LoginForm::Admin { email, password } => (email.as_str(), password.as_str()),
        }
    }

    /// Both fields are present once surrounding whitespace is ignored.
    pub fn is_complete(&self) -> bool {
        let (identifier, password) = self.fields();
        !identifier.trim().is_empty() && !password.trim().is_empty()
    }

    pub fn missing_fields_message(&self) -> &'static str {
        match self {
            LoginForm::Citizen { .. } => "Please enter both Home Number and Password",
            LoginForm::Worker { .. } => "Please enter both Worker ID and Password",
            LoginForm::Admin { .. } => "Please enter both Email and Password",
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            LoginForm::Citizen { .. } => "/api/citizen/login",
            LoginForm::Worker { .. } => "/api/worker/login",
            LoginForm::Admin { .. } => "/api/auth/login",
        }
    }

    fn payload(&self) -> Value {
        match self {
            LoginForm::Citizen { home_number, password } => {
                json!({ "homeNumber": home_number.trim(), "password": password })
            }
            LoginForm::Worker { worker_id, password } => {
                json!({ "workerId": worker_id.trim(), "password": password })
            }
            LoginForm::Admin { email, password } => json!({
                "email": email.trim().to_lowercase(),
                "password": password,
                "role": Role::Admin.as_str(),
            }),
        }
    }

    /// Builds the session from a backend reply that already passed the `success` check.
    fn session_from_reply(&self, reply: Value) -> Result<Session, LoginOutcome> {
        match self {
            LoginForm::Citizen { home_number, .. } => {
                let reply: CitizenLoginReply = decode(reply)?;
                Ok(Session::Citizen(CitizenProfile {
                    citizen_id: reply.citizen_id,
                    home_number: home_number.trim().to_string(),
                    name: reply.citizen_name.unwrap_or_else(|| "Citizen".to_string()),
                    green_points: reply.green_points.unwrap_or(0),
                    area: reply.area,
                }))
            }
            LoginForm::Worker { worker_id, .. } => {
                let reply: WorkerLoginReply = decode(reply)?;
                Ok(Session::Worker(WorkerProfile {
                    worker_id: reply.worker_id.unwrap_or_else(|| worker_id.trim().to_string()),
                    name: reply.worker_name.unwrap_or_else(|| "Worker".to_string()),
                    worker_role: reply.role,
                    golden_points: reply.golden_points.unwrap_or(0),
                    area: reply.area,
                }))
            }
            LoginForm::Admin { email, .. } => {
                let reply: AdminLoginReply = decode(reply)?;
                if reply.user.role.as_deref() != Some(Role::Admin.as_str()) {
                    return Err(LoginOutcome::Rejected {
                        message: "Role mismatch".to_string(),
                    });
                }
                Ok(Session::Admin(AdminProfile {
                    admin_id: reply.user.id,
                    name: reply.user.name.unwrap_or_else(|| "Admin".to_string()),
                    email: reply.user.email.unwrap_or_else(|| email.trim().to_lowercase()),
                }))
            }
        }
    }

    /// demo_session
    ///
    /// Placeholder identity granted by the local demo fallback.
    pub fn demo_session(&self) -> Session {
        match self {
            LoginForm::Citizen { home_number, .. } => Session::Citizen(CitizenProfile {
                citizen_id: "demo_citizen_001".to_string(),
                home_number: home_number.trim().to_string(),
                name: "Demo Citizen".to_string(),
                green_points: 150,
                area: None,
            }),
            LoginForm::Worker { worker_id, .. } => Session::Worker(WorkerProfile {
                worker_id: worker_id.trim().to_string(),
                name: "Demo Worker".to_string(),
                worker_role: None,
                golden_points: 0,
                area: None,
            }),
            LoginForm::Admin { email, .. } => Session::Admin(AdminProfile {
                admin_id: "demo_admin_001".to_string(),
                name: "Demo Admin".to_string(),
                email: email.trim().to_lowercase(),
            }),
        }
    }
}

// --- Backend reply shapes ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CitizenLoginReply {
    citizen_id: String,
    citizen_name: Option<String>,
    green_points: Option<i32>,
    area: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkerLoginReply {
    worker_id: Option<String>,
    worker_name: Option<String>,
    role: Option<String>,
    golden_points: Option<i32>,
    area: Option<String>,
}

#[derive(Deserialize)]
struct AdminLoginReply {
    user: AdminUser,
}

#[derive(Deserialize)]
struct AdminUser {
    id: String,
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
}

fn decode<T: for<'de> Deserialize<'de>>(reply: Value) -> Result<T, LoginOutcome> {
    serde_json::from_value(reply).map_err(|e| LoginOutcome::Unverifiable {
        reason: format!("malformed login reply: {e}"),
    })
}

/// verify
///
/// Asks the backend to check the credentials and classifies the answer:
/// a well-formed success is `Verified`, a 4xx or `success: false` is `Rejected`,
/// everything else (transport failure, 5xx, unreadable reply) is `Unverifiable`.
pub async fn verify(backend: &dyn BackendApi, form: &LoginForm) -> LoginOutcome {
    match backend.post(form.endpoint(), form.payload()).await {
        Ok(reply) => match form.session_from_reply(reply) {
            Ok(session) => LoginOutcome::Verified(session),
            Err(outcome) => outcome,
        },
        Err(e) if e.is_verdict() => LoginOutcome::Rejected {
            message: e.message(),
        },
        Err(e) => LoginOutcome::Unverifiable {
            reason: unverifiable_reason(&e),
        },
    }
}

fn unverifiable_reason(e: &BackendError) -> String {
    match e {
        BackendError::Transport(_) => format!("transport failure: {e}"),
        other => other.to_string(),
    }
}

/// apply_demo_fallback
///
/// Legacy demo convenience: with `DEMO_LOGIN_FALLBACK` enabled in a local environment,
/// an unverifiable attempt with both fields filled in still signs in with placeholder
/// data. Every other outcome passes through untouched.
pub fn apply_demo_fallback(outcome: LoginOutcome, form: &LoginForm, config: &AppConfig) -> LoginOutcome {
    match outcome {
        LoginOutcome::Unverifiable { reason } if config.demo_fallback_enabled() && form.is_complete() => {
            tracing::warn!(
                role = form.role().as_str(),
                "backend could not verify login ({}); granting demo session",
                reason
            );
            LoginOutcome::Verified(form.demo_session())
        }
        other => other,
    }
}
