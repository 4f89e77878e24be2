use axum::Extension;
use axum_jsonschema::Json;

use crate::utils::{ErrorCode, InitRequest, InitResponse, RequestError, RuntimeState};

pub async fn handler(
    Extension(runtime_state): Extension<RuntimeState>,
    Json(request): Json<InitRequest>,
) -> Result<Json<InitResponse>, RequestError> {
    if !runtime_state.initialize() {
        tracing::warn!("rejecting repeated initialization");
        return Err(RequestError {
            code: ErrorCode::AlreadyInitialized,
            details: Some("Cannot initialize the action more than once.".to_string()),
        });
    }

    tracing::debug!(
        keys = ?request.value.keys().collect::<Vec<_>>(),
        "action initialized, payload ignored"
    );

    Ok(Json(InitResponse { ok: true }))
}

// NOTE: Integration tests for route handlers are in the `/tests` module
