//! Logging setup and per-request telemetry.
//!
//! Console logging is always on. Traces and logs are additionally exported over
//! OTLP when a collector is configured and reachable. A tracing Layer counts
//! database queries per HTTP request.

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub const DEFAULT_SERVICE_NAME: &str = "cookbook-server";
pub const DB_QUERY_COUNT_HEADER: &str = "x-db-query-count";

/// Exporters that must be flushed before the process exits.
#[derive(Default)]
pub struct TelemetryGuard {
    providers: Option<(SdkTracerProvider, SdkLoggerProvider)>,
}

impl TelemetryGuard {
    pub fn shutdown(self) {
        if let Some((trace_provider, log_provider)) = self.providers {
            if let Err(e) = trace_provider.shutdown() {
                eprintln!("failed to flush trace exporter: {e}");
            }
            if let Err(e) = log_provider.shutdown() {
                eprintln!("failed to flush log exporter: {e}");
            }
        }
    }
}

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces and logs are sent
/// to the collector. Otherwise, only console logging is used.
pub fn init_telemetry() -> TelemetryGuard {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let Some(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(DbQueryCountingLayer)
            .init();

        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return TelemetryGuard::default();
    };

    if !collector_reachable(&endpoint) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(DbQueryCountingLayer)
            .init();

        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return TelemetryGuard::default();
    }

    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

    match build_providers(&endpoint, &service_name) {
        Ok((trace_provider, log_provider)) => {
            let tracer = trace_provider.tracer(DEFAULT_SERVICE_NAME);
            opentelemetry::global::set_tracer_provider(trace_provider.clone());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .with(OpenTelemetryTracingBridge::new(&log_provider))
                .init();

            tracing::info!(
                "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                endpoint,
                service_name
            );
            TelemetryGuard {
                providers: Some((trace_provider, log_provider)),
            }
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .init();

            tracing::warn!(error = %e, "failed to set up OTLP exporters, using console logging only");
            TelemetryGuard::default()
        }
    }
}

// Quick TCP check to see if the collector is up (resolve hostname first)
fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

fn build_providers(
    endpoint: &str,
    service_name: &str,
) -> Result<(SdkTracerProvider, SdkLoggerProvider), Box<dyn std::error::Error + Send + Sync>> {
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok((trace_provider, log_provider))
}

/// Name of the span the store opens around every database statement.
pub const DB_QUERY_SPAN: &str = "db.query";

tokio::task_local! {
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Queries issued so far by the request running on this task. `None` outside
/// a request scope.
pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// Bumps the request's query counter each time a [`DB_QUERY_SPAN`] opens.
///
/// `RecipeStore` creates that span before moving to the blocking pool, so the
/// counter lookup happens on the request task.
pub struct DbQueryCountingLayer;

impl<S: Subscriber> Layer<S> for DbQueryCountingLayer {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        if attrs.metadata().name() != DB_QUERY_SPAN {
            return;
        }
        // Spans opened outside a request (startup, tests) have nothing to count into
        let _ = DB_QUERY_COUNTER.try_with(|counter| counter.fetch_add(1, Ordering::Relaxed));
    }
}

/// Gives each request a fresh counter for the rest of the stack.
pub async fn scope_query_counter(request: Request<Body>, next: Next) -> Response {
    DB_QUERY_COUNTER
        .scope(Arc::new(AtomicU32::new(0)), next.run(request))
        .await
}

/// Reports the request's query count in the `x-db-query-count` header.
pub async fn expose_query_count(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Some(count) = get_query_count() {
        response
            .headers_mut()
            .insert(DB_QUERY_COUNT_HEADER, HeaderValue::from(count));
    }
    response
}
