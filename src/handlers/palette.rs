//! Palette texture endpoint handler.
//!
//! Returns a one-row PNG palette of a colour map, one pixel per table sample,
//! either at evenly spaced positions or as whole-number buckets.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::{error_response, map_request};
use crate::colourmaps::TextureWrap;
use crate::error::Result;
use crate::logging::generate_request_id;
use crate::state::AppState;

/// Query parameters for the palette endpoint
#[derive(Debug, Deserialize)]
pub struct PaletteQuery {
    /// Registered map or preset name
    pub name: Option<String>,
    /// Ad hoc palette text, overrides `name`
    pub colours: Option<String>,
    /// Data range minimum (requires `max`)
    pub min: Option<f32>,
    /// Data range maximum (requires `min`)
    pub max: Option<f32>,
    /// Discrete scale override
    pub discrete: Option<bool>,
    /// Reverse the colour axis
    pub reverse: Option<bool>,
    /// Texture wraps around rather than clamping at its edges
    pub repeat: Option<bool>,
    /// Draw whole-number buckets instead of evenly spaced positions
    pub buckets: Option<bool>,
}

/// Handle GET /palette requests
pub async fn palette_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaletteQuery>,
) -> Response {
    let request_id = generate_request_id();
    let start_time = Instant::now();

    debug!(
        endpoint = "/palette",
        request_id = %request_id,
        name = ?params.name,
        colours = ?params.colours,
        repeat = ?params.repeat,
        buckets = ?params.buckets,
        "Processing palette request"
    );

    match generate_palette_response(&state, &params) {
        Ok(response) => {
            info!(
                endpoint = "/palette",
                request_id = %request_id,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Palette generation successful"
            );
            response
        }
        Err(error) => error_response(&error, "/palette", &request_id),
    }
}

fn generate_palette_response(state: &AppState, params: &PaletteQuery) -> Result<Response> {
    let mut request = map_request(
        &params.name,
        &params.colours,
        params.min,
        params.max,
        None,
        params.reverse,
    )?;
    request.discrete = params.discrete;
    let mut map = state.prepared_colourmap(&request)?;

    let repeat = params.repeat.unwrap_or(false);
    let texture = if params.buckets.unwrap_or(false) {
        map.to_bucket_image(repeat)?
    } else {
        map.to_image(repeat)?
    };
    let png = texture.encode_png()?;
    let wrap = match texture.wrap {
        TextureWrap::Repeat => "repeat",
        TextureWrap::ClampToEdge => "clamp_to_edge",
    };

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (
                header::HeaderName::from_static("x-texture-wrap"),
                HeaderValue::from_static(wrap),
            ),
        ],
        png,
    )
        .into_response())
}
