//! Position to colour resolution.

use tracing::error;

use super::colour::Colour;
use super::colourmap::{ColourMap, POSITION_EPSILON};
use crate::error::{ColourScaleError, Result};

impl ColourMap {
    /// Colour at a normalized position.
    ///
    /// Positions within `POSITION_EPSILON` of a stop snap to it. Between two
    /// stops the result is a channel-wise blend, or the closer stop when
    /// interpolation is off (ties go to the lower stop). Negative and NaN
    /// positions resolve to [`Colour::NONE`].
    ///
    /// Fails only when no pair of stops brackets `position`, which means the
    /// stop table is not calibrated.
    pub fn try_resolve(&self, position: f32) -> Result<Colour> {
        match self.stops.len() {
            0 => return Ok(Colour::NONE),
            1 => return Ok(self.stops[0].colour),
            _ => {}
        }
        let last = self.stops.len() - 1;
        if position >= 1.0 {
            return Ok(self.stops[last].colour);
        }
        if position.is_nan() || position < 0.0 {
            return Ok(Colour::NONE);
        }

        let mut upper = self.stops.len();
        for (i, stop) in self.stops.iter().enumerate() {
            if (stop.position - position).abs() <= POSITION_EPSILON {
                return Ok(stop.colour);
            }
            if stop.position > position {
                upper = i;
                break;
            }
        }
        if upper == 0 || upper == self.stops.len() {
            return Err(self.bracket_error(position));
        }

        let below = &self.stops[upper - 1];
        let above = &self.stops[upper];
        let mu = (position - below.position) / (above.position - below.position);
        if self.interpolate {
            Ok(below.colour.lerp(above.colour, mu))
        } else if mu <= 0.5 {
            Ok(below.colour)
        } else {
            Ok(above.colour)
        }
    }

    /// Colour at a normalized position.
    ///
    /// # Panics
    ///
    /// Panics with the full calibration context when the stop table does not
    /// bracket `position`; see [`ColourMap::try_resolve`].
    pub fn resolve(&self, position: f32) -> Colour {
        match self.try_resolve(position) {
            Ok(colour) => colour,
            Err(e) => {
                error!(name = %self.name, error = %e, "Colour map invariant violated");
                panic!("{}", e);
            }
        }
    }

    fn bracket_error(&self, position: f32) -> ColourScaleError {
        ColourScaleError::Calibration {
            name: self.name.clone(),
            stops: self.stops.len(),
            first: self.stops.first().map_or(f32::NAN, |s| s.position),
            last: self.stops.last().map_or(f32::NAN, |s| s.position),
            position,
            minimum: self.minimum,
            maximum: self.maximum,
        }
    }
}
