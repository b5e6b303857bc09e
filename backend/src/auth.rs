use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    session::Session,
    session_store::SessionState,
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "ecosarthi_session";

/// Local-only header resolving a session id directly, without a token.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Claims
///
/// Payload of a session token. The token only proves which session id the client
/// owns; the role itself always comes from the session store.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the session id.
    pub sub: Uuid,
    /// Expiration Time (exp): after this the token reads as anonymous.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// issue_token
///
/// Signs a session token for `session_id` that expires after the configured TTL.
pub fn issue_token(session_id: Uuid, config: &AppConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        sub: session_id,
        iat: now,
        exp: now.saturating_add(usize::try_from(config.session_ttl_secs).unwrap_or(usize::MAX)),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
}

/// Set-Cookie value handing the token to a browser.
pub fn session_cookie(token: &str, config: &AppConfig) -> String {
    let secure = if config.env == Env::Production { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
        config.session_ttl_secs
    )
}

/// Set-Cookie value that makes the browser forget the token.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// CurrentSession
///
/// The resolved session of an incoming request. Resolution never rejects for a missing
/// or invalid token: such a request is simply anonymous, and it is up to the route
/// guard to decide whether anonymous is good enough.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    /// The session id the client proved ownership of, if any.
    pub id: Option<Uuid>,
    pub session: Session,
}

/// CurrentSession Extractor Implementation
///
/// 1. Local bypass: in `Env::Local` an `x-session-id` header names the session directly.
/// 2. Token: `Authorization: Bearer <token>`, else the `ecosarthi_session` cookie.
/// 3. Store lookup: the session id is resolved against the session store.
///
/// Rejection: `500` only when the session store itself fails.
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let Some(id) = resolve_session_id(parts, &config) else {
            return Ok(CurrentSession::default());
        };

        let session = sessions.get(id).await.map_err(|e| {
            tracing::error!("session lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        Ok(CurrentSession {
            id: Some(id),
            session,
        })
    }
}

fn resolve_session_id(parts: &Parts, config: &AppConfig) -> Option<Uuid> {
    if config.env == Env::Local {
        let bypass = parts
            .headers
            .get(SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok());
        if bypass.is_some() {
            return bypass;
        }
    }

    let token = bearer_token(parts).or_else(|| cookie_token(parts))?;

    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    match decode::<Claims>(
        &token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            tracing::debug!("ignoring unusable session token: {:?}", e.kind());
            None
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find(|token| !token.is_empty())
        .map(str::to_string)
}
