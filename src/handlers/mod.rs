//! HTTP request handlers for the colourscale API.
//!
//! This module contains all the endpoint handlers for the web server and the
//! router that wires them together.

pub mod colour;
pub mod colourmap;
pub mod heartbeat;
pub mod palette;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::error::ColourScaleError;
use crate::logging::{create_http_trace_layer, log_request_error};
use crate::state::{AppState, MapRequest};

pub use colour::colour_handler;
pub use colourmap::{colourmap_handler, colourmaps_handler};
pub use heartbeat::heartbeat_handler;
pub use palette::palette_handler;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/colourmaps", get(colourmaps_handler))
        .route("/colourmap", get(colourmap_handler))
        .route("/palette", get(palette_handler))
        .route("/colour", get(colour_handler))
        .route("/heartbeat", get(heartbeat_handler))
        .layer(create_http_trace_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Log a failed request and turn it into a JSON error response
pub(crate) fn error_response(
    error: &ColourScaleError,
    endpoint: &str,
    request_id: &str,
) -> Response {
    log_request_error(error, endpoint, request_id, None);

    let status = match error {
        ColourScaleError::ColourMapNotFound { .. } => StatusCode::NOT_FOUND,
        ColourScaleError::ImageGeneration { .. } | ColourScaleError::Calibration { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(serde_json::json!({
            "error": error.to_string(),
            "request_id": request_id
        })),
    )
        .into_response()
}

/// Build a map request from the query fields every endpoint shares
pub(crate) fn map_request(
    name: &Option<String>,
    colours: &Option<String>,
    min: Option<f32>,
    max: Option<f32>,
    log: Option<bool>,
    reverse: Option<bool>,
) -> Result<MapRequest, ColourScaleError> {
    let range = match (min, max) {
        (Some(min), Some(max)) => Some((min, max)),
        (None, None) => None,
        _ => {
            return Err(ColourScaleError::InvalidParameter {
                param: "min/max".to_string(),
                message: "min and max must be given together".to_string(),
            })
        }
    };
    Ok(MapRequest {
        name: name.clone(),
        colours: colours.clone(),
        range,
        log,
        discrete: None,
        reverse: reverse.unwrap_or(false),
    })
}
