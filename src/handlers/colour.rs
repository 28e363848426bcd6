//! Single value lookup endpoint handler.
//!
//! Returns the colour a map assigns to one data value, through the exact or
//! the table path.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{error_response, map_request};
use crate::error::{ColourScaleError, Result};
use crate::logging::generate_request_id;
use crate::state::AppState;

/// Query parameters for the colour endpoint
#[derive(Debug, Deserialize)]
pub struct ColourQuery {
    /// Registered map or preset name
    pub name: Option<String>,
    /// Ad hoc palette text, overrides `name`
    pub colours: Option<String>,
    /// Data value to colour
    pub value: f32,
    /// Data range minimum (requires `max`)
    pub min: Option<f32>,
    /// Data range maximum (requires `min`)
    pub max: Option<f32>,
    /// Log scale override
    pub log: Option<bool>,
    /// Use the precalculated table instead of the exact lookup
    pub fast: Option<bool>,
}

/// Response for a colour lookup
#[derive(Debug, Serialize)]
pub struct ColourResponse {
    pub value: f32,
    /// Normalized position of the value on the colour axis
    pub position: f32,
    /// `rgba(r,g,b,a)` form
    pub colour: String,
    /// Packed `0xAABBGGRR`
    pub packed: u32,
    pub fast: bool,
}

/// Handle GET /colour requests
pub async fn colour_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ColourQuery>,
) -> Response {
    let request_id = generate_request_id();
    debug!(
        endpoint = "/colour",
        request_id = %request_id,
        name = ?params.name,
        value = params.value,
        fast = ?params.fast,
        "Processing colour request"
    );

    match lookup_colour(&state, &params) {
        Ok(response) => Json(response).into_response(),
        Err(error) => error_response(&error, "/colour", &request_id),
    }
}

fn lookup_colour(state: &AppState, params: &ColourQuery) -> Result<ColourResponse> {
    if !params.value.is_finite() {
        return Err(ColourScaleError::InvalidParameter {
            param: "value".to_string(),
            message: format!("Value must be finite, got {}", params.value),
        });
    }
    let request = map_request(
        &params.name,
        &params.colours,
        params.min,
        params.max,
        params.log,
        None,
    )?;
    let map = state.prepared_colourmap(&request)?;

    let fast = params.fast.unwrap_or(false);
    let colour = if fast {
        map.get_fast(params.value)
    } else {
        map.try_resolve(map.scale_value(params.value))?
    };

    Ok(ColourResponse {
        value: params.value,
        position: map.scale_value(params.value),
        colour: colour.to_string(),
        packed: colour.to_packed(),
        fast,
    })
}
