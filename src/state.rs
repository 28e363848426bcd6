//! Application state management for colourscale.
//!
//! This module defines the shared state that is passed to all handlers: the
//! configuration and the registry of named colour maps.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::colourmaps::{presets, ColourMap};
use crate::config::Config;
use crate::error::{ColourScaleError, Result};
use crate::logging::{log_colourmap_stats, log_timed_operation};

/// What a request wants drawn: a registered map, a preset or ad hoc palette
/// text, plus optional overrides.
#[derive(Debug, Clone, Default)]
pub struct MapRequest {
    /// Registered map or preset; the configured default when unset
    pub name: Option<String>,
    /// Palette text, taking precedence over `name`
    pub colours: Option<String>,
    /// Data range to calibrate to
    pub range: Option<(f32, f32)>,
    pub log: Option<bool>,
    pub discrete: Option<bool>,
    /// Reverse the colour axis
    pub reverse: bool,
}

/// The main application state shared across all handlers
#[derive(Debug)]
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Registered colour maps, calibrated to their configured range
    colourmaps: RwLock<HashMap<String, ColourMap>>,
}

impl AppState {
    /// Create a new AppState, registering every configured colour map
    pub fn new(config: Config) -> Self {
        let state = Self {
            config,
            colourmaps: RwLock::new(HashMap::new()),
        };

        log_timed_operation("register_colourmaps", || {
            for (name, properties) in &state.config.colourmaps {
                let mut map = ColourMap::from_properties(
                    name.clone(),
                    properties,
                    state.config.palette.samples,
                );
                map.calibrate_with(None);
                state.register(map);
            }
        });
        state
    }

    /// Create a new AppState wrapped in an Arc for shared ownership
    pub fn new_shared(config: Config) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Add or replace a named colour map.
    pub fn register(&self, map: ColourMap) {
        log_colourmap_stats(
            &map.name,
            map.len(),
            map.samples(),
            (map.minimum(), map.maximum()),
            map.is_log(),
            map.stops().iter().any(|s| s.colour != map.stops()[0].colour),
        );
        self.colourmaps.write().insert(map.name.clone(), map);
    }

    /// Registered map names, sorted.
    pub fn colourmap_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.colourmaps.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn colourmap_count(&self) -> usize {
        self.colourmaps.read().len()
    }

    /// Copy of a registered map.
    pub fn get_colourmap(&self, name: &str) -> Option<ColourMap> {
        self.colourmaps.read().get(name).cloned()
    }

    fn named_colourmap(&self, name: &str) -> Result<ColourMap> {
        if let Some(map) = self.get_colourmap(name) {
            return Ok(map);
        }
        match presets::lookup(name) {
            Some(palette) => {
                let mut map = ColourMap::with_samples(name, self.config.palette.samples);
                map.load_palette(&palette);
                Ok(map)
            }
            None => Err(ColourScaleError::ColourMapNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// A calibrated map ready to answer `request`.
    ///
    /// Registered maps are copied so request overrides never touch the
    /// registry.
    pub fn prepared_colourmap(&self, request: &MapRequest) -> Result<ColourMap> {
        let mut map = match &request.colours {
            Some(colours) => {
                let name = request.name.as_deref().unwrap_or("custom");
                let mut map = ColourMap::with_samples(name, self.config.palette.samples);
                if !map.load_palette(colours) {
                    warn!(name, colours = %colours, "Palette has fewer than two usable colours");
                }
                map
            }
            None => {
                let name = request
                    .name
                    .as_deref()
                    .unwrap_or(&self.config.palette.default_colourmap);
                self.named_colourmap(name)?
            }
        };

        if let Some(log) = request.log {
            map.set_log_scale(log);
        }
        if let Some(discrete) = request.discrete {
            map.set_discrete(discrete);
        }

        match request.range {
            // A configured range outranks the request's bounds
            Some((min, max)) if min.is_finite() && max.is_finite() && min <= max => {
                map.calibrate_with(Some(&(min, max)));
            }
            Some((min, max)) => {
                return Err(ColourScaleError::InvalidParameter {
                    param: "range".to_string(),
                    message: format!("Invalid range [{}, {}]", min, max),
                });
            }
            None => map.calibrate_with(None),
        }
        if request.reverse {
            map.flip();
        }

        debug!(
            name = %map.name,
            stops = map.len(),
            minimum = map.minimum(),
            maximum = map.maximum(),
            "Colour map prepared"
        );
        Ok(map)
    }

    /// Validate that the application state is consistent and ready for use
    pub fn validate(&self) -> Result<()> {
        let default = &self.config.palette.default_colourmap;
        if self.get_colourmap(default).is_none() && presets::lookup(default).is_none() {
            return Err(ColourScaleError::Config {
                message: format!(
                    "Default colour map '{}' is neither registered nor a preset",
                    default
                ),
            });
        }
        Ok(())
    }
}
