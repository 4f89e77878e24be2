use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use tower_http::trace::TraceLayer;

mod health;
mod init;
mod run;

/// Routes of the action-proxy protocol. `/init` needs a `RuntimeState` extension layered on
/// top of the router.
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/init", post(init::handler))
        .api_route("/run", post(run::handler))
        .api_route("/health", get(health::handler))
        // adds HTTP tracing & context to all routes
        .layer(TraceLayer::new_for_http())
}
