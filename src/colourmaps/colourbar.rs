//! Colour bar legend ticks.
//!
//! Computes where ticks fall along a colour bar and how they are labelled.
//! Drawing the bar is left to the renderer.

use serde::{Deserialize, Serialize};

use super::colourmap::ColourMap;

/// Legend options, stored alongside the colour map properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourBarOptions {
    /// Number of interior ticks
    pub ticks: usize,
    /// Label interior ticks as well as the end ticks
    pub printticks: bool,
    /// Append `units` to labels
    pub printunits: bool,
    /// Format labels in scientific notation
    pub scientific: bool,
    /// Significant digits (general format) or decimals (scientific)
    pub precision: usize,
    /// Multiplier applied to values before they are printed
    pub scalevalue: f32,
    pub units: String,
    /// Fixed values for interior ticks, in order; missing entries are placed
    /// automatically
    pub tickvalues: Vec<f32>,
}

impl Default for ColourBarOptions {
    fn default() -> Self {
        ColourBarOptions {
            ticks: 0,
            printticks: false,
            printunits: false,
            scientific: false,
            precision: 2,
            scalevalue: 1.0,
            units: String::new(),
            tickvalues: Vec::new(),
        }
    }
}

/// One tick on the colour bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f32,
    /// Normalized position along the bar
    pub position: f32,
    pub label: Option<String>,
}

impl ColourMap {
    /// Ticks for a legend of this map, end ticks included.
    ///
    /// Log scales always get at least two interior ticks; a degenerate range
    /// gets only the two end ticks, both centred.
    pub fn ticks(&self, options: &ColourBarOptions) -> Vec<Tick> {
        let degenerate = self.minimum == self.maximum;
        let mut count = options.ticks;
        if self.log_scale && count < 2 {
            count = 2;
        }
        if degenerate {
            count = 0;
        }

        let mut ticks = Vec::with_capacity(count + 2);
        for i in 0..count + 2 {
            let (value, position) = if i == 0 {
                (self.minimum, if degenerate { 0.5 } else { 0.0 })
            } else if i == count + 1 {
                (self.maximum, if degenerate { 0.5 } else { 1.0 })
            } else {
                let (value, position) = match options.tickvalues.get(i - 1) {
                    Some(&value) => (value, self.scale_value(value)),
                    None => self.automatic_tick(i, count),
                };
                // Interior ticks outside the range would sit on the end ticks
                if position == 0.0 || position == 1.0 {
                    continue;
                }
                (value, position)
            };

            let end = i == 0 || i == count + 1;
            let label = (options.printticks || end).then(|| format_tick(value, options));
            ticks.push(Tick {
                value,
                position,
                label,
            });
        }
        ticks
    }

    fn automatic_tick(&self, i: usize, count: usize) -> (f32, f32) {
        if self.log_scale {
            // Spaced along log(1)..log(11): visibly non-linear but readable
            let tick = 1.0 + i as f32 * (10.0 / (count + 1) as f32);
            let position = tick.log10() / 11f32.log10();
            let (lmin, lmax) = (self.minimum.log10(), self.maximum.log10());
            (10f32.powf(lmin + position * (lmax - lmin)), position)
        } else {
            let position = i as f32 / (count + 1) as f32;
            (self.minimum + position * (self.maximum - self.minimum), position)
        }
    }
}

/// Label text for a tick value.
pub fn format_tick(value: f32, options: &ColourBarOptions) -> String {
    if !options.scientific && value.abs() <= f32::MIN_POSITIVE {
        return "0".to_string();
    }
    let scaled = (value * options.scalevalue) as f64;
    let mut label = if options.scientific {
        format!("{:.*e}", options.precision, scaled)
    } else {
        format_general(scaled, options.precision)
    };
    if options.printunits {
        label.push_str(&options.units);
    }
    label
}

/// `%g`-style formatting: `precision` significant digits, fixed or
/// exponential depending on magnitude, trailing zeros removed.
fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }
    let precision = precision.max(1);
    let exponent = value.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= precision as i32 {
        let text = format!("{:.*e}", precision - 1, value);
        match text.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_fraction(mantissa), exp),
            None => text,
        }
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colourmaps::Colour;

    fn map(min: f32, max: f32, log: bool) -> ColourMap {
        let mut map = ColourMap::new("bar");
        map.add(Colour::BLACK);
        map.add(Colour::WHITE);
        map.set_log_scale(log);
        map.calibrate(min, max);
        map
    }

    #[test]
    fn test_linear_ticks() {
        let options = ColourBarOptions {
            ticks: 3,
            printticks: true,
            ..Default::default()
        };
        let ticks = map(0.0, 100.0, false).ticks(&options);
        let positions: Vec<f32> = ticks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_deref().unwrap()).collect();
        assert_eq!(labels, vec!["0", "25", "50", "75", "1e2"]);
    }

    #[test]
    fn test_only_end_ticks_labelled_by_default() {
        let options = ColourBarOptions {
            ticks: 1,
            ..Default::default()
        };
        let ticks = map(0.0, 10.0, false).ticks(&options);
        assert_eq!(ticks.len(), 3);
        assert!(ticks[0].label.is_some());
        assert!(ticks[1].label.is_none());
        assert!(ticks[2].label.is_some());
    }

    #[test]
    fn test_log_scale_has_two_interior_ticks() {
        let ticks = map(1.0, 1000.0, true).ticks(&ColourBarOptions::default());
        assert_eq!(ticks.len(), 4);
        assert!(ticks[1].position > 0.0 && ticks[1].position < ticks[2].position);
        assert!(ticks[2].value < 1000.0);
    }

    #[test]
    fn test_degenerate_range_centres_end_ticks() {
        let options = ColourBarOptions {
            ticks: 5,
            ..Default::default()
        };
        let ticks = map(7.0, 7.0, false).ticks(&options);
        assert_eq!(ticks.len(), 2);
        assert!(ticks.iter().all(|t| t.position == 0.5));
    }

    #[test]
    fn test_fixed_tick_outside_range_is_dropped() {
        let options = ColourBarOptions {
            ticks: 2,
            tickvalues: vec![50.0, 500.0],
            ..Default::default()
        };
        let ticks = map(0.0, 100.0, false).ticks(&options);
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[1].value, 50.0);
        assert_eq!(ticks[1].position, 0.5);
    }

    #[test]
    fn test_label_formats() {
        let mut options = ColourBarOptions::default();
        assert_eq!(format_tick(0.0, &options), "0");
        assert_eq!(format_tick(0.1234, &options), "0.12");
        assert_eq!(format_tick(1234.0, &options), "1.2e3");
        options.precision = 4;
        assert_eq!(format_tick(1234.0, &options), "1234");
        options.scientific = true;
        options.precision = 2;
        assert_eq!(format_tick(1234.0, &options), "1.23e3");
        options.scientific = false;
        options.scalevalue = 0.5;
        options.printunits = true;
        options.units = "m".to_string();
        assert_eq!(format_tick(10.0, &options), "5m");
    }
}
