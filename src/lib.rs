//! # colourscale
//!
//! A colour-scale engine for scientific visualisation.
//!
//! This library turns palette descriptions into calibrated colour maps and
//! maps data values to colours, and serves those maps over a small HTTP API.
//!
//! ## Key Features
//!
//! - **Forgiving palette parsing**: colour lists, `position=colour` lines,
//!   `(value)colour` stops, named presets and JSON documents
//! - **Range calibration**: linear, logarithmic and discrete scales with
//!   value-anchored stops
//! - **Fast lookup**: a precalculated sample table next to the exact path
//! - **Export**: text, JSON and one-row PNG palette textures
//!
//! ## Architecture
//!
//! - **Engine**: [`colourmaps`] holds colours, maps, calibration and lookup
//! - **Registry**: [`state::AppState`] keeps named maps loaded from config
//! - **API Layer**: [`handlers`] exposes lookups and exports over HTTP

pub mod colourmaps;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod state;

pub use colourmaps::{
    Colour, ColourBarOptions, ColourMap, ColourMapProperties, ColourStop, DataRange, FieldValues,
    PaletteTexture, TextureWrap,
};
pub use config::Config;
pub use error::{ColourScaleError, Result};
pub use logging::{
    create_http_trace_layer, generate_request_id, init_tracing, log_colourmap_stats, log_error,
    log_operation_end, log_operation_start, log_request_error, log_timed_operation,
};
pub use state::{AppState, MapRequest};
