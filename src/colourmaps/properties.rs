//! Property bag attached to a colour map.
//!
//! Mirrors the keys saved scenes and config files use: `colours`, `logscale`,
//! `discrete`, `interpolate`, `locked`, `range`, `background` and the colour
//! bar options.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::colour::Colour;
use super::colourbar::ColourBarOptions;
use crate::error::{ColourScaleError, Result};

/// Flags and options for one colour map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourMapProperties {
    /// Palette data: a string in any accepted form or a JSON palette
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colours: Option<Value>,

    /// Scale values in log10 space
    #[serde(alias = "log")]
    pub logscale: bool,

    /// Round values to whole-number buckets
    pub discrete: bool,

    /// Blend neighbouring stops; unset means "not discrete"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolate: Option<bool>,

    /// Ignore calibration requests
    pub locked: bool,

    /// Fixed `[min, max]` range overriding the data bounds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f32; 2]>,

    /// Background colour in any JSON colour form
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Value>,

    #[serde(flatten)]
    pub colourbar: ColourBarOptions,
}

impl ColourMapProperties {
    /// Properties with only a palette set.
    pub fn with_colours(colours: impl Into<String>) -> Self {
        ColourMapProperties {
            colours: Some(Value::String(colours.into())),
            ..Default::default()
        }
    }

    /// Effective interpolation flag.
    pub fn interpolates(&self) -> bool {
        self.interpolate.unwrap_or(!self.discrete)
    }

    /// The fixed range when it is usable: finite and `min < max`.
    pub fn fixed_range(&self) -> Option<(f32, f32)> {
        match self.range {
            Some([min, max]) if min.is_finite() && max.is_finite() && min < max => Some((min, max)),
            _ => None,
        }
    }

    /// Parsed background colour, if one is set and valid.
    pub fn background_colour(&self) -> Option<Colour> {
        self.background
            .as_ref()
            .and_then(|value| Colour::from_json(value).ok())
    }

    /// Check the bag for values that can never be applied.
    pub fn validate(&self) -> Result<()> {
        if let Some([min, max]) = self.range {
            if !(min.is_finite() && max.is_finite()) || min > max {
                return Err(ColourScaleError::InvalidParameter {
                    param: "range".to_string(),
                    message: format!("Invalid range [{}, {}]", min, max),
                });
            }
        }
        if let Some(background) = &self.background {
            Colour::from_json(background)?;
        }
        match &self.colours {
            None | Some(Value::String(_)) | Some(Value::Array(_)) | Some(Value::Object(_)) => {
                Ok(())
            }
            Some(other) => Err(ColourScaleError::InvalidParameter {
                param: "colours".to_string(),
                message: format!("Unsupported palette data: {}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let props = ColourMapProperties::default();
        assert!(!props.logscale);
        assert!(props.interpolates());
        assert_eq!(props.fixed_range(), None);
        assert_eq!(props.colourbar.precision, 2);
    }

    #[test]
    fn test_discrete_disables_interpolation_unless_set() {
        let mut props = ColourMapProperties {
            discrete: true,
            ..Default::default()
        };
        assert!(!props.interpolates());
        props.interpolate = Some(true);
        assert!(props.interpolates());
    }

    #[test]
    fn test_deserialize_scene_keys() {
        let props: ColourMapProperties = serde_json::from_value(json!({
            "colours": "red white blue",
            "log": true,
            "range": [1.0, 100.0],
            "background": "white",
            "ticks": 4,
            "units": "K"
        }))
        .unwrap();
        assert!(props.logscale);
        assert_eq!(props.fixed_range(), Some((1.0, 100.0)));
        assert_eq!(props.background_colour(), Some(Colour::WHITE));
        assert_eq!(props.colourbar.ticks, 4);
        assert_eq!(props.colourbar.units, "K");
        assert!(props.validate().is_ok());
    }

    #[test]
    fn test_degenerate_range_is_not_fixed() {
        let props = ColourMapProperties {
            range: Some([3.0, 3.0]),
            ..Default::default()
        };
        assert_eq!(props.fixed_range(), None);
        assert!(props.validate().is_ok());

        let props = ColourMapProperties {
            range: Some([5.0, 1.0]),
            ..Default::default()
        };
        assert!(props.validate().is_err());
    }
}
