use std::{
    env,
    fmt::Display,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eyre::WrapErr;
use schemars::JsonSchema;
use serde_json::{json, Map, Value};

/// Port the action runtime listens on unless `PORT` says otherwise.
pub const DEFAULT_PORT: u16 = 8080;

/// Default request timeout, matching the platform's default action time limit.
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    pub port: u16,
    pub action_timeout_secs: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            action_timeout_secs: DEFAULT_ACTION_TIMEOUT_SECS,
        }
    }
}

impl GlobalConfig {
    /// Loads the configuration from the environment. Invalid values are logged and replaced
    /// by their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_or_default("PORT", DEFAULT_PORT),
            action_timeout_secs: env_or_default(
                "ACTION_TIMEOUT_SECS",
                DEFAULT_ACTION_TIMEOUT_SECS,
            ),
        }
    }
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match parse_env(name) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(error = ?e, "falling back to default `{name}` of {default}");
            default
        }
    }
}

/// Parses an environment variable, returning `None` if it is unset.
///
/// # Errors
/// Returns an error if the variable is set but cannot be parsed.
pub fn parse_env<T>(name: &str) -> eyre::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .wrap_err_with(|| format!("invalid `{name}` environment variable: {raw}"))
}

/// Shared state of the action runtime. The action is compiled in, so the only thing `/init`
/// changes is whether it may be called again.
#[derive(Debug, Clone, Default)]
pub struct RuntimeState {
    initialized: Arc<AtomicBool>,
}

impl RuntimeState {
    /// Marks the runtime as initialized. Returns `false` if it already was.
    pub fn initialize(&self) -> bool {
        !self.initialized.swap(true, Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

#[derive(Debug, serde::Deserialize, serde::Serialize, JsonSchema)]
pub struct InitRequest {
    /// Code, binary flag, entry point name and environment sent by the invoker. Ignored.
    #[serde(default)]
    pub value: Map<String, Value>,
}

#[derive(Debug, serde::Serialize, JsonSchema)]
pub struct InitResponse {
    pub ok: bool,
}

#[derive(Debug, serde::Deserialize, serde::Serialize, JsonSchema)]
pub struct ActivationRequest {
    #[serde(default)]
    pub value: Map<String, Value>,
    pub activation_id: Option<String>,
    pub action_name: Option<String>,
    pub namespace: Option<String>,
    pub transaction_id: Option<String>,
    /// Recorded on the activation span only.
    pub deadline: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ActionFailed,
    AlreadyInitialized,
}

impl ErrorCode {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ActionFailed => StatusCode::BAD_GATEWAY,
            Self::AlreadyInitialized => StatusCode::FORBIDDEN,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ActionFailed => write!(f, "action_failed"),
            Self::AlreadyInitialized => write!(f, "already_initialized"),
        }
    }
}

#[derive(Debug)]
pub struct RequestError {
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {details}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for RequestError {}

// The invoker only looks at `error`, so the code itself is only visible through the status.
impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let error = self.details.unwrap_or_else(|| self.code.to_string());

        (self.code.status(), Json(json!({ "error": error }))).into_response()
    }
}

impl OperationOutput for RequestError {
    type Inner = Self;
}
