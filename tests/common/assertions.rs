//! Assertion utilities for testing.
//!
//! Floating-point and colour comparisons.

use colourscale::Colour;

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f32 = 1e-6;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`
/// (default 1e-6).
pub fn assert_approx_eq(actual: f32, expected: f32, epsilon: Option<f32>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that every channel of two colours differs by at most `max_diff`.
pub fn assert_colour_approx_eq(actual: Colour, expected: Colour, max_diff: u8) {
    for (i, (a, e)) in actual
        .channels()
        .into_iter()
        .zip(expected.channels())
        .enumerate()
    {
        let diff = (a as i16 - e as i16).unsigned_abs();
        assert!(
            diff <= max_diff as u16,
            "Colours differ in channel {}: actual = {}, expected = {}, max diff = {}",
            i,
            actual,
            expected,
            max_diff
        );
    }
}

/// Assert that a value lies within `[min, max]`.
pub fn assert_in_range(actual: f32, min: f32, max: f32) {
    assert!(
        actual >= min && actual <= max,
        "Value not in range: actual = {}, min = {}, max = {}",
        actual,
        min,
        max
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.0000001, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_colour_approx_eq() {
        assert_colour_approx_eq(Colour::rgb(10, 20, 30), Colour::rgb(11, 19, 30), 1);
    }

    #[test]
    #[should_panic(expected = "Colours differ")]
    fn test_assert_colour_approx_eq_fails() {
        assert_colour_approx_eq(Colour::rgb(10, 20, 30), Colour::rgb(14, 20, 30), 1);
    }

    #[test]
    fn test_assert_in_range() {
        assert_in_range(5.0, 0.0, 10.0);
        assert_in_range(0.0, 0.0, 10.0);
        assert_in_range(10.0, 0.0, 10.0);
    }
}
