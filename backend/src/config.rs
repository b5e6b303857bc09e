use std::env;

/// Seconds a session token stays valid when `SESSION_TTL_SECS` is unset (7 days).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 604_800;
/// Seconds to wait on the backend API when `BACKEND_TIMEOUT_SECS` is unset.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;

const LOCAL_SESSION_SECRET: &str = "ecosarthi-local-session-secret";

/// AppConfig
///
/// Holds the gateway's entire configuration state. Immutable once loaded and pulled
/// into handlers and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local-only conveniences
    // (session id bypass header, demo login fallback).
    pub env: Env,
    // Postgres connection string for the persistent session store.
    // `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // HMAC secret used to sign and validate session tokens.
    pub session_secret: String,
    // Lifetime of an issued session token, in seconds.
    pub session_ttl_secs: u64,
    // Base URL of the external EcoSarthi backend API.
    pub backend_url: String,
    // Per-request timeout for backend calls, in seconds.
    pub backend_timeout_secs: u64,
    // Legacy demo behavior: grant a placeholder session when the backend cannot be reached.
    pub demo_login_fallback: bool,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// and hardened production behavior.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            backend_url: "http://localhost:5000".to_string(),
            backend_timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
            demo_login_fallback: false,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `production` when `DATABASE_URL` or `SESSION_SECRET` is missing, so the
    /// gateway never starts with forgeable tokens or a session store that forgets on restart.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, session_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("SESSION_SECRET").expect("FATAL: SESSION_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                env::var("SESSION_SECRET").unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string()),
            ),
        };

        Self {
            env,
            db_url,
            session_secret,
            session_ttl_secs: parse_var("SESSION_TTL_SECS").unwrap_or(DEFAULT_SESSION_TTL_SECS),
            backend_url: env::var("BACKEND_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            backend_timeout_secs: parse_var("BACKEND_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_BACKEND_TIMEOUT_SECS),
            demo_login_fallback: parse_var("DEMO_LOGIN_FALLBACK").unwrap_or(false),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }

    /// The demo login fallback is only ever honored in `Env::Local`.
    pub fn demo_fallback_enabled(&self) -> bool {
        self.env == Env::Local && self.demo_login_fallback
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
