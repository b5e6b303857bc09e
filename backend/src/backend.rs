use async_trait::async_trait;
use serde_json::Value;
use std::{sync::Arc, time::Duration};

/// BackendError
///
/// Failure modes of a call to the external EcoSarthi API. The split matters to the
/// login flow: a verdict means the backend looked at the request and said no, anything
/// else means nobody could tell.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never produced an HTTP response (connection refused, timeout, ...).
    #[error("backend unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    /// Non-2xx answer.
    #[error("backend answered {status}: {message}")]
    Status { status: u16, message: String },
    /// 2xx answer carrying `success: false`.
    #[error("backend refused: {message}")]
    Refused { message: String },
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}

impl BackendError {
    /// True when the backend reached a decision about the request (4xx or `success: false`).
    pub fn is_verdict(&self) -> bool {
        match self {
            BackendError::Status { status, .. } => (400..500).contains(status),
            BackendError::Refused { .. } => true,
            BackendError::Transport(_) | BackendError::Decode(_) => false,
        }
    }

    /// The human-readable reason, preferring the backend's own `message`.
    pub fn message(&self) -> String {
        match self {
            BackendError::Status { message, .. } | BackendError::Refused { message } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// BackendApi
///
/// Contract for talking to the backend API. Bodies are JSON objects following the
/// backend's `{ "success": bool, ... }` convention; a successful call returns the whole
/// decoded body. Implemented over HTTP by `HttpBackendClient`, and by stubs in tests.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, BackendError>;

    async fn post(&self, path: &str, body: Value) -> Result<Value, BackendError>;
}

/// BackendState
///
/// The concrete type used to share the backend client across the application state.
pub type BackendState = Arc<dyn BackendApi>;

/// HttpBackendClient
///
/// reqwest-backed implementation pointed at `BACKEND_API_URL`.
#[derive(Clone)]
pub struct HttpBackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl BackendApi for HttpBackendClient {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, BackendError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(BackendError::Transport)?;
        interpret(response).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, BackendError> {
        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(BackendError::Transport)?;
        interpret(response).await
    }
}

/// Maps an HTTP response onto the `{ success, message }` convention.
async fn interpret(response: reqwest::Response) -> Result<Value, BackendError> {
    let status = response.status();
    let text = response.text().await.map_err(BackendError::Transport)?;
    let body: Option<Value> = serde_json::from_str(&text).ok();

    let message = body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("request failed").to_string()
            }),
        });
    }

    let body = body.ok_or_else(|| BackendError::Decode(format!("non-JSON body from {status}")))?;

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(BackendError::Refused {
            message: message.unwrap_or_else(|| "Request was not accepted".to_string()),
        });
    }

    Ok(body)
}
