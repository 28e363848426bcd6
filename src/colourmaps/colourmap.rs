//! The colour map data model: an ordered table of colour stops, a background
//! colour, scaling flags, the calibrated data range and the precalculated
//! sample table.
//!
//! Calibration lives in [`super::calibrate`], lookups in [`super::resolve`] and
//! [`super::sample`], palette loading in [`super::parser`].

use tracing::debug;

use super::colour::Colour;
use super::properties::ColourMapProperties;

/// Default size of the precalculated sample table.
pub const DEFAULT_SAMPLES: usize = 4096;

/// Distance under which a position snaps to a stop without interpolation.
pub const POSITION_EPSILON: f32 = f32::EPSILON;

/// One anchor point of a colour map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColourStop {
    pub colour: Colour,
    /// Data value the stop is anchored to; `None` leaves the position to
    /// calibration.
    pub value: Option<f32>,
    /// Normalized location on the colour axis, [0, 1] once calibrated.
    pub position: f32,
}

impl ColourStop {
    /// A stop whose position is derived during calibration.
    pub fn new(colour: Colour) -> Self {
        ColourStop {
            colour,
            value: None,
            position: 0.0,
        }
    }

    /// A stop anchored at the scaled position of `value`.
    pub fn with_value(colour: Colour, value: f32) -> Self {
        ColourStop {
            colour,
            value: Some(value),
            position: 0.0,
        }
    }

    /// A stop at a literal position.
    pub fn at(colour: Colour, position: f32) -> Self {
        ColourStop {
            colour,
            value: None,
            position,
        }
    }
}

/// A calibrated mapping from scalar values to colours.
#[derive(Debug, Clone)]
pub struct ColourMap {
    pub name: String,
    pub background: Colour,
    pub(crate) stops: Vec<ColourStop>,
    pub(crate) properties: ColourMapProperties,
    /// Stop positions are literal and never derived from values
    pub(crate) no_values: bool,
    pub(crate) log_scale: bool,
    pub(crate) discrete: bool,
    pub(crate) interpolate: bool,
    pub(crate) locked: bool,
    pub(crate) calibrated: bool,
    pub(crate) minimum: f32,
    pub(crate) maximum: f32,
    pub(crate) range: f32,
    pub(crate) inverse_range: f32,
    pub(crate) samples: usize,
    pub(crate) precalculated: Vec<Colour>,
}

impl Default for ColourMap {
    fn default() -> Self {
        ColourMap::new("")
    }
}

impl ColourMap {
    /// Create an empty colour map over [0, 1].
    pub fn new(name: impl Into<String>) -> Self {
        ColourMap::with_samples(name, DEFAULT_SAMPLES)
    }

    /// Create an empty colour map with a sample table of `samples` entries
    /// (at least 2).
    pub fn with_samples(name: impl Into<String>, samples: usize) -> Self {
        ColourMap {
            name: name.into(),
            background: Colour::BLACK,
            stops: Vec::new(),
            properties: ColourMapProperties::default(),
            no_values: false,
            log_scale: false,
            discrete: false,
            interpolate: true,
            locked: false,
            calibrated: false,
            minimum: 0.0,
            maximum: 1.0,
            range: 1.0,
            inverse_range: 1.0,
            samples: samples.max(2),
            precalculated: Vec::new(),
        }
    }

    /// Create a colour map from palette data in any accepted form.
    pub fn from_palette(name: impl Into<String>, data: &str) -> Self {
        let mut map = ColourMap::new(name);
        map.load_palette(data);
        map
    }

    /// Create a colour map from a property bag, loading its `colours`.
    pub fn from_properties(
        name: impl Into<String>,
        properties: &ColourMapProperties,
        samples: usize,
    ) -> Self {
        let mut map = ColourMap::with_samples(name, samples);
        match &properties.colours {
            Some(serde_json::Value::String(data)) => {
                map.load_palette(data);
            }
            Some(other) => {
                map.load_json(other);
            }
            None => map.ensure_two_stops(),
        }
        map.apply_properties(properties);
        map
    }

    /// Adopt the flags of a property bag. The palette itself is not reloaded.
    pub fn apply_properties(&mut self, properties: &ColourMapProperties) {
        self.log_scale = properties.logscale;
        self.discrete = properties.discrete;
        self.interpolate = properties.interpolates();
        if let Some(background) = properties.background_colour() {
            self.background = background;
        }
        if let Some((min, max)) = properties.fixed_range() {
            self.minimum = min;
            self.maximum = max;
        }
        self.properties = properties.clone();
        self.calibrated = false;
        self.locked = properties.locked;
    }

    pub fn stops(&self) -> &[ColourStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn properties(&self) -> &ColourMapProperties {
        &self.properties
    }

    pub fn minimum(&self) -> f32 {
        self.minimum
    }

    pub fn maximum(&self) -> f32 {
        self.maximum
    }

    /// Calibrated range, in log10 units on a log scale.
    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn is_log(&self) -> bool {
        self.log_scale
    }

    pub fn is_discrete(&self) -> bool {
        self.discrete
    }

    pub fn interpolates(&self) -> bool {
        self.interpolate
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Whether stop positions are literal rather than derived from values.
    pub fn has_literal_positions(&self) -> bool {
        self.no_values
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn set_log_scale(&mut self, log_scale: bool) {
        if self.log_scale != log_scale {
            self.log_scale = log_scale;
            self.properties.logscale = log_scale;
            self.calibrated = false;
        }
    }

    /// Without an explicit interpolate setting, discrete maps stop blending.
    pub fn set_discrete(&mut self, discrete: bool) {
        if self.discrete != discrete {
            self.discrete = discrete;
            self.properties.discrete = discrete;
            if self.properties.interpolate.is_none() {
                self.interpolate = !discrete;
            }
            self.calibrated = false;
        }
    }

    pub fn set_interpolate(&mut self, interpolate: bool) {
        if self.interpolate != interpolate {
            self.interpolate = interpolate;
            self.properties.interpolate = Some(interpolate);
            self.calibrated = false;
        }
    }

    /// Locked maps keep their range through calibration requests. Unlocking
    /// marks the map stale.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked && !locked {
            self.calibrated = false;
        }
        self.locked = locked;
        self.properties.locked = locked;
    }

    /// Resize the sample table. Takes effect on the next calibration.
    pub fn set_samples(&mut self, samples: usize) {
        let samples = samples.max(2);
        if samples != self.samples {
            self.samples = samples;
            self.precalculated = Vec::new();
            self.calibrated = false;
        }
    }

    /// Add a stop positioned by calibration.
    pub fn add(&mut self, colour: Colour) {
        self.push(ColourStop::new(colour));
    }

    /// Add a stop anchored at a data value.
    pub fn add_value(&mut self, colour: Colour, value: f32) {
        self.push(ColourStop::with_value(colour, value));
    }

    /// Add a stop at a literal position.
    pub fn add_at(&mut self, colour: Colour, position: f32) {
        self.push(ColourStop::at(colour, position));
    }

    /// Add a stop from a packed `0xAABBGGRR` colour.
    pub fn add_packed(&mut self, packed: u32, value: Option<f32>) {
        let colour = Colour::from_packed(packed);
        match value {
            Some(value) => self.add_value(colour, value),
            None => self.add(colour),
        }
    }

    /// Add a stop from float components in [0, 1].
    pub fn add_components(&mut self, components: [f32; 4], value: Option<f32>) {
        let colour = Colour::from_floats(components);
        match value {
            Some(value) => self.add_value(colour, value),
            None => self.add(colour),
        }
    }

    fn push(&mut self, stop: ColourStop) {
        self.stops.push(stop);
        self.calibrated = false;
    }

    /// Remove every stop.
    pub fn clear(&mut self) {
        self.stops.clear();
        self.precalculated.clear();
        self.calibrated = false;
    }

    /// Pad the table to the two stops every lookup needs.
    pub(crate) fn ensure_two_stops(&mut self) {
        match self.stops.len() {
            0 => {
                self.add(Colour::BLACK);
                self.add(Colour::BLACK);
            }
            1 => {
                let only = self.stops[0];
                self.push(only);
            }
            _ => {}
        }
    }

    /// Reverse the colour axis: stops in reverse order at `1 - position`.
    ///
    /// Positions become literal afterwards so a later calibration keeps the
    /// flipped layout.
    pub fn flip(&mut self) {
        self.ensure_calibrated();
        self.stops.reverse();
        for stop in &mut self.stops {
            stop.position = 1.0 - stop.position;
        }
        self.no_values = true;
        self.calibrated = false;
        self.ensure_calibrated();
    }

    /// Replace every colour with a grey of equal luminance, keeping alpha.
    pub fn monochrome(&mut self) {
        for stop in &mut self.stops {
            stop.colour = stop.colour.to_grey();
        }
        self.calibrated = false;
    }

    /// Keep only one RGB channel (0 = red, 1 = green, 2 = blue) of every stop.
    pub fn set_component(&mut self, component: usize) {
        for stop in &mut self.stops {
            let c = &mut stop.colour;
            if component != 0 {
                c.r = 0;
            }
            if component != 1 {
                c.g = 0;
            }
            if component != 2 {
                c.b = 0;
            }
        }
        debug!(name = %self.name, component, "Colour map reduced to one component");
        self.calibrated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stop() -> ColourMap {
        let mut map = ColourMap::new("test");
        map.add(Colour::BLACK);
        map.add(Colour::WHITE);
        map
    }

    #[test]
    fn test_new_map_defaults() {
        let map = ColourMap::new("empty");
        assert!(map.is_empty());
        assert_eq!(map.samples(), DEFAULT_SAMPLES);
        assert_eq!(map.background, Colour::BLACK);
        assert!(map.interpolates());
        assert!(!map.is_calibrated());
        assert_eq!((map.minimum(), map.maximum()), (0.0, 1.0));
    }

    #[test]
    fn test_sample_count_has_a_floor() {
        assert_eq!(ColourMap::with_samples("tiny", 0).samples(), 2);
    }

    #[test]
    fn test_adding_stops_marks_stale() {
        let mut map = two_stop();
        map.calibrate(0.0, 1.0);
        assert!(map.is_calibrated());
        map.add_value(Colour::rgb(255, 0, 0), 0.5);
        assert!(!map.is_calibrated());
        assert_eq!(map.stops()[2].value, Some(0.5));
    }

    #[test]
    fn test_add_packed_and_components() {
        let mut map = ColourMap::new("packed");
        map.add_packed(0xff0000ff, None);
        map.add_components([0.0, 1.0, 0.0, 1.0], Some(3.0));
        assert_eq!(map.stops()[0].colour, Colour::rgb(255, 0, 0));
        assert_eq!(map.stops()[1].colour, Colour::rgb(0, 255, 0));
        assert_eq!(map.stops()[1].value, Some(3.0));
    }

    #[test]
    fn test_ensure_two_stops() {
        let mut map = ColourMap::new("pad");
        map.ensure_two_stops();
        assert_eq!(map.len(), 2);
        assert!(map.stops().iter().all(|s| s.colour == Colour::BLACK));

        let mut map = ColourMap::new("dup");
        map.add(Colour::rgb(1, 2, 3));
        map.ensure_two_stops();
        assert_eq!(map.len(), 2);
        assert_eq!(map.stops()[1].colour, Colour::rgb(1, 2, 3));
    }

    #[test]
    fn test_unlocking_marks_stale() {
        let mut map = two_stop();
        map.calibrate(0.0, 1.0);
        map.set_locked(true);
        assert!(map.is_calibrated());
        map.set_locked(false);
        assert!(!map.is_calibrated());
    }

    #[test]
    fn test_flip_reverses_and_complements() {
        let mut map = ColourMap::new("flip");
        map.add(Colour::rgb(255, 0, 0));
        map.add_value(Colour::rgb(0, 255, 0), 2.5);
        map.add(Colour::rgb(0, 0, 255));
        map.calibrate(0.0, 10.0);
        map.flip();
        let positions: Vec<f32> = map.stops().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0.0, 0.75, 1.0]);
        assert_eq!(map.stops()[0].colour, Colour::rgb(0, 0, 255));
        assert_eq!(map.stops()[2].colour, Colour::rgb(255, 0, 0));
        assert!(map.is_calibrated());
    }

    #[test]
    fn test_monochrome_keeps_alpha() {
        let mut map = ColourMap::new("mono");
        map.add(Colour::new(255, 0, 0, 100));
        map.add(Colour::new(0, 0, 255, 200));
        map.monochrome();
        for stop in map.stops() {
            assert_eq!(stop.colour.r, stop.colour.g);
            assert_eq!(stop.colour.g, stop.colour.b);
        }
        assert_eq!(map.stops()[0].colour.a, 100);
        assert_eq!(map.stops()[1].colour.a, 200);
    }

    #[test]
    fn test_set_component() {
        let mut map = ColourMap::new("component");
        map.add(Colour::new(10, 20, 30, 40));
        map.set_component(1);
        assert_eq!(map.stops()[0].colour, Colour::new(0, 20, 0, 40));
    }
}
