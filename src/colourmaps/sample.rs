//! The precalculated sample table and the two value lookup paths.

use super::calibrate::safe_log10;
use super::colour::Colour;
use super::colourmap::ColourMap;

impl ColourMap {
    /// Refill the sample table across the calibrated range.
    ///
    /// Entries are evenly spaced in value, or in log10 of the value on a log
    /// scale.
    pub(crate) fn rebuild_samples(&mut self) {
        let n = self.samples;
        let step = self.range / (n - 1) as f32;
        let log_min = safe_log10(self.minimum);

        let mut table = std::mem::take(&mut self.precalculated);
        table.clear();
        table.reserve(n);
        for i in 0..n {
            let value = if i == 0 {
                self.minimum
            } else if i == n - 1 {
                self.maximum
            } else if self.log_scale {
                10f32.powf(log_min + step * i as f32)
            } else {
                self.minimum + step * i as f32
            };
            table.push(self.resolve(self.scale_value(value)));
        }
        self.precalculated = table;
    }

    /// Exact colour for a data value.
    pub fn get(&self, value: f32) -> Colour {
        self.resolve(self.scale_value(value))
    }

    /// Colour for a data value from the sample table.
    ///
    /// The index is computed linearly from `value` (or from its log10) and
    /// clamped to the table. On log scales the quantization does not line up
    /// with the table's own spacing, so results can differ from [`get`] by a
    /// table step or more near the low end; use [`get`] where exactness
    /// matters. Falls back to [`get`] before the first calibration.
    ///
    /// [`get`]: ColourMap::get
    pub fn get_fast(&self, value: f32) -> Colour {
        let n = self.precalculated.len();
        if n == 0 {
            return self.get(value);
        }
        let fraction = if self.log_scale {
            (safe_log10(value) - safe_log10(self.minimum)) / self.range
        } else {
            (value - self.minimum) / self.range
        };
        // NaN lands on 0, infinities saturate
        let index = ((n - 1) as f32 * fraction) as usize;
        self.precalculated[index.min(n - 1)]
    }

    /// The precalculated sample table; empty until calibrated.
    pub fn sample_table(&self) -> &[Colour] {
        &self.precalculated
    }

    /// One colour per whole-number bucket from `minimum` to `maximum`, at
    /// most one bucket per table sample.
    pub fn discrete_colours(&self) -> Vec<Colour> {
        let span = (self.maximum - self.minimum).round();
        // Clamp while still a float; wide ranges would overflow usize
        let buckets = if span.is_finite() && span >= 0.0 {
            span.min((self.samples - 1) as f32) as usize + 1
        } else {
            1
        };
        (0..buckets)
            .map(|k| self.get((self.minimum + k as f32).round()))
            .collect()
    }
}
