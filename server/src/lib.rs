pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod schema;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod types;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware;
use axum::Router;
use service::RecipeService;
use std::sync::Arc;
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::trace::TraceLayer;
use tracing::{Level, Span};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
pub type AppState = Arc<RecipeService>;

pub const DOCS_PATH: &str = "/docs";
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Builds the full application: recipe routes, API docs, request tracing and
/// per-request query counting.
pub fn build_router(state: AppState, track_db_query_count: bool) -> Router {
    let swagger_ui = SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, api::openapi());

    let mut app = Router::new()
        .merge(api::recipes::router())
        .merge(swagger_ui)
        .with_state(state);

    if track_db_query_count {
        app = app.layer(middleware::from_fn(telemetry::expose_query_count));
    }

    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(request_span)
            .on_request(())
            .on_response(log_response)
            .on_failure(log_failure),
    )
    // Installed last so the counter wraps every other layer
    .layer(middleware::from_fn(telemetry::scope_query_counter))
}

fn serves_docs(path: &str) -> bool {
    path == OPENAPI_PATH || path.starts_with(DOCS_PATH)
}

/// Recipe traffic gets an info span carrying the route template. Swagger UI
/// assets and the OpenAPI document stay at trace level.
fn request_span(request: &Request<Body>) -> Span {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(request.uri().path(), MatchedPath::as_str);

    if serves_docs(path) {
        return tracing::trace_span!("http_request");
    }
    tracing::info_span!("http_request", method = %request.method(), route = %path)
}

fn log_response(response: &Response<Body>, latency: Duration, span: &Span) {
    if span.metadata().map(|m| *m.level()) == Some(Level::TRACE) {
        return;
    }
    let status = response.status();
    let latency_ms = latency.as_millis();
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), latency_ms, "recipe request failed");
    } else {
        tracing::info!(status = status.as_u16(), latency_ms, "recipe request served");
    }
}

fn log_failure(failure: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    tracing::error!(%failure, latency_ms = latency.as_millis(), "request aborted");
}
