//! Logging utilities for the colourscale server.
//!
//! Structured `tracing` helpers shared by the binaries, the HTTP layer and
//! the registry of colour maps.

use std::time::Instant;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Creates the tracing layer for HTTP request/response logging
pub fn create_http_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    DefaultMakeSpan,
    DefaultOnRequest,
    DefaultOnResponse,
> {
    // Create a custom response formatter that includes timing
    let response_formatter = DefaultOnResponse::new()
        .level(Level::DEBUG)
        .latency_unit(LatencyUnit::Micros);

    // Configure the tracing layer
    TraceLayer::new_for_http()
        .make_span_with(
            DefaultMakeSpan::new()
                .level(Level::INFO)
                .include_headers(true),
        )
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(response_formatter)
}

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides `log_level`. Calling this twice keeps the first
/// subscriber.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
    if installed.is_err() {
        debug!("Tracing subscriber already installed");
    }
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration = start_time.elapsed();
    let duration_ms = duration.as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Log an operation with timing and result in a single statement
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    debug!(
        operation = operation,
        request_id = %request_id,
        "Starting operation"
    );

    let result = f();

    let duration = start.elapsed();

    info!(
        operation = operation,
        request_id = %request_id,
        duration_ms = duration.as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log a summary of a colour map once it is registered
pub fn log_colourmap_stats(
    name: &str,
    stops: usize,
    samples: usize,
    range: (f32, f32),
    log_scale: bool,
    genuine: bool,
) {
    if genuine {
        info!(
            operation = "colourmap_load",
            name = name,
            stops = stops,
            samples = samples,
            minimum = range.0,
            maximum = range.1,
            log = log_scale,
            "Colour map registered"
        );
    } else {
        warn!(
            operation = "colourmap_load",
            name = name,
            stops = stops,
            samples = samples,
            "Colour map registered with a default palette"
        );
    }
}

/// Log an error with context
pub fn log_error(error: &crate::error::ColourScaleError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}

/// Log an error that occurred during request processing
pub fn log_request_error(
    error: &crate::error::ColourScaleError,
    endpoint: &str,
    request_id: &str,
    params: Option<&str>,
) {
    error!(
        error = %error,
        endpoint = endpoint,
        request_id = request_id,
        params = params.unwrap_or("none"),
        error_type = std::any::type_name_of_val(error),
        "Request processing error"
    );
}

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
