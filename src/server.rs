use std::{net::SocketAddr, sync::Arc, time::Duration};

use aide::openapi::{Info, OpenApi};
use axum::{routing::get, Extension, Json, Router};
use eyre::WrapErr;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{
    routes,
    utils::{GlobalConfig, RuntimeState, DEFAULT_ACTION_TIMEOUT_SECS},
};

#[must_use]
pub fn get_timeout_layer(timeout: Option<u64>) -> TimeoutLayer {
    let timeout = Duration::from_secs(timeout.unwrap_or(DEFAULT_ACTION_TIMEOUT_SECS));
    TimeoutLayer::new(timeout)
}

async fn serve_openapi(Extension(openapi): Extension<Arc<OpenApi>>) -> Json<OpenApi> {
    Json(openapi.as_ref().clone())
}

/// Builds the complete application: action-proxy routes, the generated `OpenAPI` document at
/// `/openapi.json`, and the shared layers.
pub fn app(runtime_state: RuntimeState, global_config: &GlobalConfig) -> Router {
    let mut openapi = OpenApi {
        info: Info {
            title: "Sleep Action".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };

    routes::handler()
        .finish_api(&mut openapi)
        .route("/openapi.json", get(serve_openapi))
        .layer(Extension(runtime_state))
        .layer(Extension(Arc::new(openapi)))
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().include_headers(true)),
        )
        .layer(get_timeout_layer(Some(global_config.action_timeout_secs)))
}

/// Serves the action runtime until the process is stopped.
///
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn start(global_config: GlobalConfig) -> eyre::Result<()> {
    let app = app(RuntimeState::default(), &global_config);

    let address = SocketAddr::from(([0, 0, 0, 0], global_config.port));
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("failed to bind {address}"))?;

    tracing::info!(
        action_timeout_secs = global_config.action_timeout_secs,
        "✅ Sleep action runtime started on http://{address}"
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .wrap_err("server failed")
}
