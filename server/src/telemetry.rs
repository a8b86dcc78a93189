//! Logging, OpenTelemetry export and per-request query counting.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
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
use tracing::{span::Id, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::Context, registry::LookupSpan, Layer};

const DEFAULT_SERVICE_NAME: &str = "foodgram-server";

/// Name of the span every store query opens.
pub const DB_QUERY_SPAN: &str = "db.query";

tokio::task_local! {
    /// Task-local counter for database queries in the current request.
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Initialize console logging, plus OTLP export of traces and logs when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set and the collector answers.
pub fn init_telemetry() {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
    let reachable = endpoint.as_deref().is_some_and(collector_reachable);

    match endpoint {
        Some(endpoint) if reachable => {
            let service_name = env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());
            let resource = opentelemetry_sdk::Resource::builder()
                .with_service_name(service_name.clone())
                .build();

            let exporters = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(&endpoint)
                .build()
                .and_then(|spans| {
                    opentelemetry_otlp::LogExporter::builder()
                        .with_tonic()
                        .with_endpoint(&endpoint)
                        .build()
                        .map(|logs| (spans, logs))
                });

            let (trace_exporter, log_exporter) = match exporters {
                Ok(exporters) => exporters,
                Err(e) => {
                    tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt_layer)
                        .with(DbQueryCountingLayer)
                        .init();
                    tracing::warn!(error = %e, "Failed to create OTLP exporters, using console logging only");
                    return;
                }
            };

            let trace_provider = SdkTracerProvider::builder()
                .with_batch_exporter(trace_exporter)
                .with_resource(resource.clone())
                .build();
            let tracer = trace_provider.tracer(DEFAULT_SERVICE_NAME);
            opentelemetry::global::set_tracer_provider(trace_provider);
            let otel_trace_layer = tracing_opentelemetry::layer().with_tracer(tracer);

            let log_provider = SdkLoggerProvider::builder()
                .with_batch_exporter(log_exporter)
                .with_resource(resource)
                .build();
            let otel_log_layer = OpenTelemetryTracingBridge::new(&log_provider);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .with(otel_trace_layer)
                .with(otel_log_layer)
                .init();

            tracing::info!(
                "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                endpoint,
                service_name
            );
        }
        Some(endpoint) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .init();

            tracing::info!(
                "OpenTelemetry endpoint {} not reachable, using console logging only",
                endpoint
            );
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .init();

            tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        }
    }
}

/// Quick TCP probe so a missing collector does not stall startup.
fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

/// Get the current database query count for this request, if available.
pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// A tracing Layer that counts `db.query` spans per HTTP request.
///
/// The counter lives in a task-local set up by [`query_counting_middleware`];
/// diesel queries run synchronously inside the handler's task, so every span
/// they open lands on the right request.
pub struct DbQueryCountingLayer;

impl<S> Layer<S> for DbQueryCountingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        if span.name() == DB_QUERY_SPAN {
            let _ = DB_QUERY_COUNTER.try_with(|counter| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
}

/// Middleware that initializes the per-request database query counter.
///
/// Must wrap the trace layer and the header middleware.
pub async fn query_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    DB_QUERY_COUNTER.scope(counter, next.run(request)).await
}

/// Middleware that adds an `X-DB-Query-Count` header to responses.
pub async fn db_query_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(count) = get_query_count() {
        if let Ok(value) = axum::http::header::HeaderValue::from_str(&count.to_string()) {
            response.headers_mut().insert("X-DB-Query-Count", value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counter_absent_outside_request() {
        assert_eq!(get_query_count(), None);
    }

    #[tokio::test]
    async fn test_counter_scoped_to_task() {
        let counter = Arc::new(AtomicU32::new(0));
        let seen = DB_QUERY_COUNTER
            .scope(counter.clone(), async {
                DB_QUERY_COUNTER.with(|c| c.fetch_add(3, Ordering::Relaxed));
                get_query_count()
            })
            .await;
        assert_eq!(seen, Some(3));
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_unreachable_collector() {
        assert!(!collector_reachable("http://256.256.256.256:4317"));
    }
}
