//! The colour-scale engine.
//!
//! A [`ColourMap`] is loaded from palette text or JSON, calibrated to a data
//! range and then queried per value, either exactly with [`ColourMap::get`]
//! or through the precalculated table with [`ColourMap::get_fast`].
//!
//! Maps are plain values with no internal locking: finish loading and
//! calibrating before sharing a map with readers.

pub mod calibrate;
pub mod colour;
pub mod colourbar;
pub mod colourmap;
pub mod export;
pub mod names;
pub mod parser;
pub mod presets;
pub mod properties;
pub mod resolve;
pub mod sample;

pub use calibrate::{DataRange, FieldValues};
pub use colour::Colour;
pub use colourbar::{format_tick, ColourBarOptions, Tick};
pub use colourmap::{ColourMap, ColourStop, DEFAULT_SAMPLES};
pub use export::{PaletteTexture, TextureWrap};
pub use presets::CubeHelix;
pub use properties::ColourMapProperties;
