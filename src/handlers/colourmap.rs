//! Colour map listing and export endpoints.
//!
//! `/colourmaps` lists registered maps and presets; `/colourmap` returns one
//! calibrated map as JSON (with colour bar ticks) or as `position=colour`
//! text.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::{error_response, map_request};
use crate::colourmaps::presets;
use crate::error::{ColourScaleError, Result};
use crate::logging::generate_request_id;
use crate::state::AppState;

/// Query parameters for the colourmap endpoint
#[derive(Debug, Deserialize)]
pub struct ColourMapQuery {
    /// Registered map or preset name
    pub name: Option<String>,
    /// Ad hoc palette text, overrides `name`
    pub colours: Option<String>,
    /// Data range minimum (requires `max`)
    pub min: Option<f32>,
    /// Data range maximum (requires `min`)
    pub max: Option<f32>,
    /// Log scale override
    pub log: Option<bool>,
    /// Reverse the colour axis
    pub reverse: Option<bool>,
    /// Interior colour bar ticks, overriding the map's own setting
    pub ticks: Option<usize>,
    /// Output format (json or text)
    pub format: Option<String>,
}

/// Handle GET /colourmaps requests
pub async fn colourmaps_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let request_id = generate_request_id();
    debug!(
        endpoint = "/colourmaps",
        request_id = %request_id,
        "Processing colour map listing"
    );

    Json(serde_json::json!({
        "colourmaps": state.colourmap_names(),
        "presets": presets::names(),
        "default": state.config.palette.default_colourmap,
    }))
}

/// Handle GET /colourmap requests
pub async fn colourmap_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ColourMapQuery>,
) -> Response {
    let request_id = generate_request_id();
    let start_time = Instant::now();

    debug!(
        endpoint = "/colourmap",
        request_id = %request_id,
        name = ?params.name,
        colours = ?params.colours,
        min = ?params.min,
        max = ?params.max,
        format = ?params.format,
        "Processing colour map request"
    );

    match generate_colourmap_response(&state, &params) {
        Ok(response) => {
            info!(
                endpoint = "/colourmap",
                request_id = %request_id,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Colour map request successful"
            );
            response
        }
        Err(error) => error_response(&error, "/colourmap", &request_id),
    }
}

fn generate_colourmap_response(state: &AppState, params: &ColourMapQuery) -> Result<Response> {
    let request = map_request(
        &params.name,
        &params.colours,
        params.min,
        params.max,
        params.log,
        params.reverse,
    )?;
    let mut map = state.prepared_colourmap(&request)?;

    match params.format.as_deref().unwrap_or("json") {
        "json" => {
            let mut options = map.properties().colourbar.clone();
            if let Some(ticks) = params.ticks {
                options.ticks = ticks;
            }
            let ticks = map.ticks(&options);
            let mut doc = map.to_json();
            doc["ticks"] = serde_json::to_value(ticks)?;
            Ok(Json(doc).into_response())
        }
        "text" => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            map.to_text(),
        )
            .into_response()),
        other => Err(ColourScaleError::InvalidParameter {
            param: "format".to_string(),
            message: format!("Unsupported format: {}. Must be one of: json, text", other),
        }),
    }
}
