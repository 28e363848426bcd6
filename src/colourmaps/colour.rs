//! The RGBA colour value used throughout the engine.
//!
//! A [`Colour`] is four byte channels. The packed 32-bit form places red in the
//! least significant byte: `packed = r | g << 8 | b << 16 | a << 24`
//! (`0xAABBGGRR`), which is the little-endian byte sequence `[r, g, b, a]` on
//! every platform.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::names;
use crate::error::{ColourScaleError, Result};

/// Four 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Colour {
    /// Opaque black.
    fn default() -> Self {
        Colour::BLACK
    }
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0, 0, 0, 255);
    pub const WHITE: Colour = Colour::new(255, 255, 255, 255);
    /// All channels zero, returned for positions below the colour axis.
    pub const NONE: Colour = Colour::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Colour { r, g, b, a }
    }

    /// Opaque colour from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Colour::new(r, g, b, 255)
    }

    /// Unpack a `0xAABBGGRR` value.
    pub const fn from_packed(value: u32) -> Self {
        let [r, g, b, a] = value.to_le_bytes();
        Colour::new(r, g, b, a)
    }

    /// Pack into `0xAABBGGRR`.
    pub const fn to_packed(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    pub const fn channels(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Channels as floats in [0, 1].
    pub fn to_floats(self) -> [f32; 4] {
        self.channels().map(|c| c as f32 / 255.0)
    }

    /// Build from float channels in [0, 1]. Out of range values saturate.
    pub fn from_floats(components: [f32; 4]) -> Self {
        let [r, g, b, a] = components.map(|c| (c * 255.0).clamp(0.0, 255.0) as u8);
        Colour::new(r, g, b, a)
    }

    /// Linear blend toward `other`, each channel independently.
    ///
    /// `channel = self + (other - self) * mu`, truncated to a byte.
    pub fn lerp(self, other: Colour, mu: f32) -> Colour {
        let from = self.channels();
        let to = other.channels();
        let mut out = [0u8; 4];
        for c in 0..4 {
            let blended = from[c] as f32 + (to[c] as f32 - from[c] as f32) * mu;
            out[c] = blended.clamp(0.0, 255.0) as u8;
        }
        Colour::new(out[0], out[1], out[2], out[3])
    }

    /// Perceptual luminance (Rec. 709 weights).
    pub fn luminance(self) -> u8 {
        let y = 0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32;
        y.round().clamp(0.0, 255.0) as u8
    }

    /// Grey of the same luminance, alpha kept.
    pub fn to_grey(self) -> Colour {
        let y = self.luminance();
        Colour::new(y, y, y, self.a)
    }

    /// Complement the RGB channels, alpha kept.
    pub fn invert(self) -> Colour {
        Colour::new(!self.r, !self.g, !self.b, self.a)
    }

    /// Parse a colour from JSON.
    ///
    /// Accepts an integer (packed `0xAABBGGRR`), a string (anything
    /// [`Colour::from_str`] accepts) or an array of 3-4 channels given as
    /// numbers or numeric strings. Channels above 1.0 are taken as bytes,
    /// channels in [0, 1] are scaled by 255.
    pub fn from_json(value: &Value) -> Result<Colour> {
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(packed) if packed <= u32::MAX as u64 => Ok(Colour::from_packed(packed as u32)),
                _ => Err(ColourScaleError::colour_parse(
                    &n.to_string(),
                    "numeric colours must be packed 32-bit integers",
                )),
            },
            Value::String(s) => s.parse(),
            Value::Array(items) => {
                if !(3..=4).contains(&items.len()) {
                    return Err(ColourScaleError::colour_parse(
                        &value.to_string(),
                        "expected 3 or 4 channels",
                    ));
                }
                let mut channels = [255u8; 4];
                for (slot, item) in channels.iter_mut().zip(items) {
                    let component = match item {
                        Value::Number(n) => n.as_f64(),
                        Value::String(s) => s.trim().parse::<f64>().ok(),
                        _ => None,
                    }
                    .ok_or_else(|| {
                        ColourScaleError::colour_parse(&value.to_string(), "non-numeric channel")
                    })?;
                    *slot = channel_from_component(component);
                }
                Ok(Colour::new(channels[0], channels[1], channels[2], channels[3]))
            }
            _ => Err(ColourScaleError::colour_parse(
                &value.to_string(),
                "unsupported JSON colour type",
            )),
        }
    }

    /// JSON form used by the exporter: the `rgba(...)` string.
    pub fn to_json(self) -> Value {
        Value::String(self.to_string())
    }
}

/// Byte channel from a component that is either a fraction or a byte value.
fn channel_from_component(component: f64) -> u8 {
    if component > 1.0 {
        component.round().clamp(0.0, 255.0) as u8
    } else {
        (component * 255.0).round().clamp(0.0, 255.0) as u8
    }
}

impl fmt::Display for Colour {
    /// `rgba(r,g,b,alpha)` with alpha as a fraction, which parses back exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},", self.r, self.g, self.b)?;
        match self.a {
            255 => f.write_str("1)"),
            0 => f.write_str("0)"),
            a => {
                let alpha = format!("{:.3}", a as f32 / 255.0);
                write!(f, "{})", alpha.trim_end_matches('0'))
            }
        }
    }
}

impl FromStr for Colour {
    type Err = ColourScaleError;

    /// Parse a colour string.
    ///
    /// Supported: X11 names (with an optional `:opacity` suffix such as
    /// `red:0.5`), `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)` and
    /// `rgba(r,g,b,a)`.
    fn from_str(input: &str) -> Result<Colour> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ColourScaleError::colour_parse(input, "empty colour string"));
        }

        let lower = trimmed.to_ascii_lowercase();
        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex)
                .ok_or_else(|| ColourScaleError::colour_parse(input, "invalid hex colour"));
        }
        if lower.starts_with("rgb") {
            return parse_function(&lower).ok_or_else(|| {
                ColourScaleError::colour_parse(input, "invalid rgb()/rgba() function")
            });
        }

        // Opacity follows the name after a colon
        let (name, opacity) = match lower.split_once(':') {
            Some((name, opacity)) => (name.trim(), opacity.trim().parse::<f32>().ok()),
            None => (lower.as_str(), None),
        };
        let [r, g, b] = names::lookup(name)
            .ok_or_else(|| ColourScaleError::colour_parse(input, "unknown colour name"))?;
        let a = match opacity {
            Some(opacity) => (opacity * 255.0).round().clamp(0.0, 255.0) as u8,
            None => 255,
        };
        Ok(Colour::new(r, g, b, a))
    }
}

fn parse_hex(hex: &str) -> Option<Colour> {
    let nibble = |c: u8| (c as char).to_digit(16).map(|d| d as u8);
    let bytes = hex.as_bytes();
    let pair = |i: usize| Some(nibble(bytes[i])? << 4 | nibble(bytes[i + 1])?);
    match bytes.len() {
        3 | 4 => {
            let mut c = [255u8; 4];
            for (slot, &b) in c.iter_mut().zip(bytes) {
                *slot = nibble(b)? * 17;
            }
            Some(Colour::new(c[0], c[1], c[2], c[3]))
        }
        6 => Some(Colour::rgb(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(Colour::new(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
        _ => None,
    }
}

/// `rgb(r,g,b)` or `rgba(r,g,b,a)`; channels are bytes, alpha is a fraction
/// unless it is above 1.
fn parse_function(text: &str) -> Option<Colour> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close < open {
        return None;
    }
    let args: Vec<f32> = text[open + 1..close]
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    let byte = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    match args.as_slice() {
        [r, g, b] => Some(Colour::rgb(byte(*r), byte(*g), byte(*b))),
        [r, g, b, a] => {
            let alpha = if *a > 1.0 { byte(*a) } else { byte(a * 255.0) };
            Some(Colour::new(byte(*r), byte(*g), byte(*b), alpha))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_packed_byte_order() {
        let c = Colour::new(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.to_packed(), 0x44332211);
        assert_eq!(Colour::from_packed(0xff0000ff), Colour::rgb(255, 0, 0));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("red".parse::<Colour>().unwrap(), Colour::rgb(255, 0, 0));
        assert_eq!("White".parse::<Colour>().unwrap(), Colour::WHITE);
        assert_eq!("blue:0.5".parse::<Colour>().unwrap(), Colour::new(0, 0, 255, 128));
        assert!("nosuchcolour".parse::<Colour>().is_err());
        assert!("".parse::<Colour>().is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!("#ff8000".parse::<Colour>().unwrap(), Colour::rgb(255, 128, 0));
        assert_eq!("#ff800080".parse::<Colour>().unwrap(), Colour::new(255, 128, 0, 128));
        assert_eq!("#f80".parse::<Colour>().unwrap(), Colour::rgb(255, 136, 0));
        assert!("#ff80".parse::<Colour>().is_ok());
        assert!("#ggg".parse::<Colour>().is_err());
        assert!("#12345".parse::<Colour>().is_err());
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!("rgb(10,20,30)".parse::<Colour>().unwrap(), Colour::rgb(10, 20, 30));
        assert_eq!("rgb(10, 20, 30)".parse::<Colour>().unwrap(), Colour::rgb(10, 20, 30));
        assert_eq!("rgba(10,20,30,0.5)".parse::<Colour>().unwrap(), Colour::new(10, 20, 30, 128));
        assert_eq!("rgba(10,20,30,200)".parse::<Colour>().unwrap(), Colour::new(10, 20, 30, 200));
        assert!("rgb(1,2)".parse::<Colour>().is_err());
        assert!("rgb(a,b,c)".parse::<Colour>().is_err());
    }

    #[test]
    fn test_display_round_trips_every_alpha() {
        for a in 0..=255u8 {
            let c = Colour::new(1, 2, 3, a);
            assert_eq!(c.to_string().parse::<Colour>().unwrap(), c, "alpha {}", a);
        }
        assert_eq!(Colour::rgb(255, 0, 0).to_string(), "rgba(255,0,0,1)");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Colour::from_json(&json!([1.0, 0.0, 0.0])).unwrap(), Colour::rgb(255, 0, 0));
        assert_eq!(
            Colour::from_json(&json!([0, 128, 255, 0.5])).unwrap(),
            Colour::new(0, 128, 255, 128)
        );
        assert_eq!(Colour::from_json(&json!(["255", "0", "0"])).unwrap(), Colour::rgb(255, 0, 0));
        assert_eq!(Colour::from_json(&json!("green")).unwrap(), Colour::rgb(0, 255, 0));
        assert_eq!(Colour::from_json(&json!(0xff00ff00u32)).unwrap(), Colour::rgb(0, 255, 0));
        assert!(Colour::from_json(&json!([1, 2])).is_err());
        assert!(Colour::from_json(&json!({"r": 1})).is_err());
        assert!(Colour::from_json(&json!(0.5)).is_err());
    }

    #[test]
    fn test_lerp() {
        let mid = Colour::BLACK.lerp(Colour::WHITE, 0.5);
        assert_eq!(mid, Colour::rgb(127, 127, 127));
        let down = Colour::WHITE.lerp(Colour::BLACK, 0.5);
        assert_eq!(down, Colour::rgb(127, 127, 127));
        assert_eq!(Colour::BLACK.lerp(Colour::WHITE, 1.0), Colour::WHITE);
    }

    #[test]
    fn test_grey_and_invert() {
        assert_eq!(Colour::WHITE.to_grey(), Colour::WHITE);
        assert_eq!(Colour::new(255, 0, 0, 10).to_grey(), Colour::new(54, 54, 54, 10));
        assert_eq!(Colour::new(255, 0, 10, 7).invert(), Colour::new(0, 255, 245, 7));
    }
}
