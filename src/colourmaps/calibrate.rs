//! Calibration: fixing the data range of a colour map and deriving every stop
//! position from it.

use tracing::{debug, trace, warn};

use super::colourmap::ColourMap;

/// Source of the live data bounds driving a colour map.
pub trait DataRange {
    /// `(minimum, maximum)` of the current data, if any is available.
    fn bounds(&self) -> Option<(f32, f32)>;
}

impl DataRange for (f32, f32) {
    fn bounds(&self) -> Option<(f32, f32)> {
        Some(*self)
    }
}

/// Bounds of a slice of field values, ignoring non-finite entries.
#[derive(Debug, Clone, Copy)]
pub struct FieldValues<'a> {
    values: &'a [f32],
}

impl<'a> FieldValues<'a> {
    pub fn new(values: &'a [f32]) -> Self {
        FieldValues { values }
    }
}

impl DataRange for FieldValues<'_> {
    fn bounds(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |bounds, v| match bounds {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }
}

/// log10 with non-positive input floored to the smallest positive float.
pub(crate) fn safe_log10(value: f32) -> f32 {
    value.max(f32::MIN_POSITIVE).log10()
}

impl ColourMap {
    /// Calibrate the map to the data range `[min, max]`.
    ///
    /// A non-finite bound collapses onto the other one. Maps without stops
    /// and calibrated maps whose range is unchanged are left alone
    /// (literal-position maps always recalibrate). A locked map ignores the
    /// request, and refreshes at its own range when stale.
    pub fn calibrate(&mut self, min: f32, max: f32) {
        let (min, max) = if self.locked {
            if self.calibrated {
                trace!(name = %self.name, "Colour map locked, calibration skipped");
                return;
            }
            (self.minimum, self.maximum)
        } else {
            (min, max)
        };
        if self.stops.is_empty() {
            return;
        }
        if !self.no_values && self.calibrated && min == self.minimum && max == self.maximum {
            return;
        }

        let (mut min, mut max) = match (min.is_finite(), max.is_finite()) {
            (true, true) => (min, max),
            (true, false) => (min, min),
            (false, true) => (max, max),
            (false, false) => {
                warn!(name = %self.name, "No finite calibration bounds, keeping current range");
                (self.minimum, self.maximum)
            }
        };

        if self.discrete {
            min = min.floor();
            max = max.ceil();
        }

        if self.log_scale {
            if min <= f32::MIN_POSITIVE || max <= f32::MIN_POSITIVE {
                warn!(
                    name = %self.name,
                    min,
                    max,
                    "Log scale colour map calibrated with non-positive bounds"
                );
            }
            min = min.max(f32::MIN_POSITIVE);
            max = max.max(f32::MIN_POSITIVE);
            self.range = safe_log10(max) - safe_log10(min);
        } else {
            self.range = max - min;
        }
        self.minimum = min;
        self.maximum = max;
        self.inverse_range = if self.range != 0.0 {
            1.0 / self.range
        } else {
            0.0
        };

        if !self.no_values {
            self.position_stops();
        }

        // Stable, so stops sharing a position keep their palette order
        self.stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        let last = self.stops.len() - 1;
        self.stops[0].position = 0.0;
        self.stops[last].position = 1.0;

        self.rebuild_samples();
        self.calibrated = true;

        debug!(
            name = %self.name,
            minimum = self.minimum,
            maximum = self.maximum,
            range = self.range,
            stops = self.stops.len(),
            log = self.log_scale,
            discrete = self.discrete,
            "Colour map calibrated"
        );
    }

    /// Calibrate from the configured fixed range, else from the data bounds,
    /// else refresh with the current range.
    pub fn calibrate_with(&mut self, data: Option<&dyn DataRange>) {
        if let Some((min, max)) = self.properties.fixed_range() {
            self.calibrate(min, max);
        } else if let Some((min, max)) = data.and_then(|d| d.bounds()) {
            self.calibrate(min, max);
        } else {
            self.recalibrate();
        }
    }

    /// Calibrate again to the current range.
    pub fn recalibrate(&mut self) {
        self.calibrate(self.minimum, self.maximum);
    }

    /// Calibrate if the map is stale.
    pub fn ensure_calibrated(&mut self) {
        if !self.calibrated {
            self.recalibrate();
        }
    }

    /// Derive stop positions from their values, filling runs of value-less
    /// stops with an even ramp between their known neighbours.
    fn position_stops(&mut self) {
        let last = self.stops.len() - 1;
        self.stops[0].position = 0.0;
        self.stops[last].position = 1.0;
        self.stops[0].value = Some(self.minimum);
        self.stops[last].value = Some(self.maximum);

        let mut i = 1;
        while i < last {
            if let Some(value) = self.stops[i].value {
                self.stops[i].position = self.scale_value(value);
                i += 1;
                continue;
            }

            // The last stop always carries a value, so the run ends by `last`
            let j = (i + 1..=last)
                .find(|&j| self.stops[j].value.is_some())
                .unwrap_or(last);
            if j < last {
                if let Some(value) = self.stops[j].value {
                    self.stops[j].position = self.scale_value(value);
                }
            }

            let start = self.stops[i - 1].position;
            let increment = (self.stops[j].position - start) / (j - i + 1) as f32;
            for k in i..j {
                self.stops[k].position = self.stops[k - 1].position + increment;
            }
            i = j + 1;
        }
    }

    /// Map a data value to its position on the colour axis, in [0, 1].
    ///
    /// Discrete maps round the value first. A degenerate range (`minimum ==
    /// maximum`) maps everything to the central position 0.5.
    pub fn scale_value(&self, value: f32) -> f32 {
        let value = if self.discrete { value.round() } else { value };
        let (min, max) = (self.minimum, self.maximum);
        if max == min {
            return 0.5;
        }
        if value <= min {
            return 0.0;
        }
        if value >= max {
            return 1.0;
        }

        if self.log_scale {
            let (value, min, max) = (safe_log10(value), safe_log10(min), safe_log10(max));
            (value - min) / (max - min)
        } else {
            (value - min) / (max - min)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colourmaps::Colour;

    fn positions(map: &ColourMap) -> Vec<f32> {
        map.stops().iter().map(|s| s.position).collect()
    }

    #[test]
    fn test_field_values_bounds() {
        let values = [3.0, f32::NAN, -2.0, 8.5, f32::INFINITY];
        assert_eq!(FieldValues::new(&values).bounds(), Some((-2.0, 8.5)));
        assert_eq!(FieldValues::new(&[f32::NAN]).bounds(), None);
        assert_eq!(FieldValues::new(&[]).bounds(), None);
    }

    #[test]
    fn test_gap_fill_between_known_values() {
        let mut map = ColourMap::new("gaps");
        map.add(Colour::rgb(0, 0, 0));
        map.add_value(Colour::rgb(1, 1, 1), 5.0);
        map.add(Colour::rgb(2, 2, 2));
        map.add(Colour::rgb(3, 3, 3));
        map.add_value(Colour::rgb(4, 4, 4), 20.0);
        map.calibrate(0.0, 20.0);
        assert_eq!(positions(&map), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(map.stops()[0].value, Some(0.0));
        assert_eq!(map.stops()[4].value, Some(20.0));
    }

    #[test]
    fn test_gap_before_interior_value() {
        let mut map = ColourMap::new("gaps");
        map.add(Colour::rgb(0, 0, 0));
        map.add(Colour::rgb(1, 1, 1));
        map.add_value(Colour::rgb(2, 2, 2), 60.0);
        map.add(Colour::rgb(3, 3, 3));
        map.calibrate(0.0, 100.0);
        let p = positions(&map);
        assert!((p[1] - 0.3).abs() < 1e-6);
        assert!((p[2] - 0.6).abs() < 1e-6);
        assert!((p[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_order_values_are_sorted() {
        let mut map = ColourMap::new("sorted");
        map.add(Colour::rgb(0, 0, 0));
        map.add_value(Colour::rgb(1, 1, 1), 8.0);
        map.add_value(Colour::rgb(2, 2, 2), 2.0);
        map.add(Colour::rgb(3, 3, 3));
        map.calibrate(0.0, 10.0);
        let p = positions(&map);
        assert!(p.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(map.stops()[1].colour, Colour::rgb(2, 2, 2));
    }

    #[test]
    fn test_non_finite_bound_collapses() {
        let mut map = ColourMap::from_palette("collapse", "black white");
        map.calibrate(f32::NAN, 4.0);
        assert_eq!((map.minimum(), map.maximum()), (4.0, 4.0));
        map.calibrate(2.0, f32::INFINITY);
        assert_eq!((map.minimum(), map.maximum()), (2.0, 2.0));
        map.calibrate(f32::NAN, f32::NAN);
        assert_eq!((map.minimum(), map.maximum()), (2.0, 2.0));
    }

    #[test]
    fn test_discrete_rounds_bounds_outward() {
        let mut map = ColourMap::from_palette("discrete", "black white");
        map.set_discrete(true);
        map.calibrate(0.4, 9.2);
        assert_eq!((map.minimum(), map.maximum()), (0.0, 10.0));
        assert_eq!(map.scale_value(4.6), 0.5);
    }

    #[test]
    fn test_log_scale_floors_bounds() {
        let mut map = ColourMap::from_palette("log", "black white");
        map.set_log_scale(true);
        map.calibrate(-5.0, 100.0);
        assert_eq!(map.minimum(), f32::MIN_POSITIVE);
        assert!(map.range().is_finite());
        assert!(map.range() > 0.0);
    }

    #[test]
    fn test_log_midpoint() {
        let mut map = ColourMap::from_palette("log", "black white");
        map.set_log_scale(true);
        map.calibrate(1.0, 10000.0);
        assert!((map.scale_value(100.0) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_locked_map_ignores_calibration() {
        let mut map = ColourMap::from_palette("locked", "black white");
        map.calibrate(0.0, 1.0);
        map.set_locked(true);
        map.calibrate(5.0, 50.0);
        assert_eq!((map.minimum(), map.maximum()), (0.0, 1.0));
    }

    #[test]
    fn test_stale_locked_map_keeps_its_range() {
        let mut map = ColourMap::from_palette("locked", "black white");
        map.calibrate(2.0, 4.0);
        map.set_locked(true);
        map.add(Colour::WHITE);
        map.calibrate(100.0, 200.0);
        assert!(map.is_calibrated());
        assert_eq!((map.minimum(), map.maximum()), (2.0, 4.0));
    }

    #[test]
    fn test_calibrate_with_prefers_fixed_range() {
        let mut map = ColourMap::from_palette("fixed", "black white");
        map.properties.range = Some([10.0, 20.0]);
        map.calibrate_with(Some(&(0.0_f32, 1.0_f32)));
        assert_eq!((map.minimum(), map.maximum()), (10.0, 20.0));

        map.properties.range = Some([3.0, 3.0]);
        let values = [1.0, 2.0, 6.0];
        map.calibrate_with(Some(&FieldValues::new(&values)));
        assert_eq!((map.minimum(), map.maximum()), (1.0, 6.0));

        map.calibrate_with(None);
        assert_eq!((map.minimum(), map.maximum()), (1.0, 6.0));
    }

    #[test]
    fn test_degenerate_range_is_central() {
        let mut map = ColourMap::from_palette("flat", "black white");
        map.calibrate(7.0, 7.0);
        assert_eq!(map.scale_value(7.0), 0.5);
        assert_eq!(map.scale_value(-100.0), 0.5);
        assert_eq!(map.scale_value(100.0), 0.5);
    }

    #[test]
    fn test_scale_value_is_monotonic() {
        let mut map = ColourMap::from_palette("mono", "black white");
        map.calibrate(-3.0, 12.0);
        let mut previous = map.scale_value(-3.0);
        for i in 0..=150 {
            let scaled = map.scale_value(-3.0 + i as f32 * 0.1);
            assert!(scaled >= previous);
            previous = scaled;
        }
    }
}
