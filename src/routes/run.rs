use std::io::{self, Write};

use axum_jsonschema::Json;
use serde_json::Value;
use tracing::Instrument;

use crate::{
    action,
    utils::{ActivationRequest, ErrorCode, RequestError},
};

/// Written on its own line to stdout and stderr after every activation so the platform can
/// tell where the logs of one activation end.
pub const ACTIVATION_SENTINEL: &str = "XXX_THE_END_OF_A_WHISK_ACTIVATION_XXX";

/// Terminates the log streams of the current activation.
///
/// # Errors
/// Returns an error if either stream cannot be written or flushed.
pub fn write_activation_sentinel(
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<()> {
    writeln!(stdout, "{ACTIVATION_SENTINEL}")?;
    stdout.flush()?;
    writeln!(stderr, "{ACTIVATION_SENTINEL}")?;
    stderr.flush()
}

async fn run_activation(
    request: ActivationRequest,
    stdout: &mut (impl Write + Send),
    stderr: &mut (impl Write + Send),
) -> Result<Value, RequestError> {
    let span = tracing::info_span!(
        "run",
        activation_id = request.activation_id.as_deref(),
        action_name = request.action_name.as_deref(),
        namespace = request.namespace.as_deref(),
        transaction_id = request.transaction_id.as_deref(),
        deadline = request.deadline.as_ref().map(tracing::field::display),
    );

    let result = action::run(request.value).instrument(span).await;

    if let Err(e) = write_activation_sentinel(stdout, stderr) {
        tracing::warn!(error = ?e, "failed to write activation sentinel");
    }

    result.map_err(|e| {
        tracing::error!(error = %e, "activation failed");
        RequestError {
            code: ErrorCode::ActionFailed,
            details: Some(e.to_string()),
        }
    })
}

pub async fn handler(
    Json(request): Json<ActivationRequest>,
) -> Result<Json<Value>, RequestError> {
    run_activation(request, &mut io::stdout(), &mut io::stderr())
        .await
        .map(Json)
}


// NOTE: Integration tests for route handlers are in the `/tests` module
