//! Serialized and raster forms of a colour map.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::colourmap::ColourMap;
use crate::error::{ColourScaleError, Result};

/// How a palette texture is sampled outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
}

/// A one-row palette raster ready for upload as a texture.
#[derive(Debug, Clone)]
pub struct PaletteTexture {
    pub image: RgbaImage,
    pub wrap: TextureWrap,
}

impl PaletteTexture {
    fn new(image: RgbaImage, repeat: bool) -> Self {
        let wrap = if repeat {
            TextureWrap::Repeat
        } else {
            TextureWrap::ClampToEdge
        };
        PaletteTexture { image, wrap }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Encode the raster as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| ColourScaleError::ImageGeneration {
                message: format!("Failed to encode PNG: {}", e),
            })?;
        Ok(buffer.into_inner())
    }
}

/// Positions are written with six decimals to keep float noise out of saved
/// palettes.
fn round_position(position: f32) -> f64 {
    (position as f64 * 1e6).round() / 1e6
}

impl ColourMap {
    /// JSON document for this map, loadable again with
    /// [`ColourMap::load_json`].
    pub fn to_json(&mut self) -> Value {
        self.ensure_calibrated();
        let colours: Vec<Value> = self
            .stops
            .iter()
            .map(|stop| {
                json!({
                    "position": round_position(stop.position),
                    "colour": stop.colour.to_json(),
                })
            })
            .collect();

        let mut doc = json!({
            "name": self.name,
            "logscale": self.log_scale,
            "discrete": self.discrete,
            "interpolate": self.interpolate,
            "locked": self.locked,
            "minimum": self.minimum,
            "maximum": self.maximum,
            "background": self.background.to_json(),
            "colours": colours,
        });
        if let Some([min, max]) = self.properties.range {
            doc["range"] = json!([min, max]);
        }
        doc
    }

    /// `position=colour` lines, one per stop in table order.
    pub fn to_text(&mut self) -> String {
        self.ensure_calibrated();
        self.stops
            .iter()
            .map(|stop| format!("{}={}\n", round_position(stop.position), stop.colour))
            .collect()
    }

    /// Palette texture with one pixel per table sample, evaluated at evenly
    /// spaced positions in [0, 1].
    pub fn to_image(&mut self, repeat: bool) -> Result<PaletteTexture> {
        self.ensure_calibrated();
        let width = self.texture_width()?;
        let last = (width - 1) as f32;
        let image: RgbaImage =
            ImageBuffer::from_fn(width, 1, |x, _| Rgba(self.resolve(x as f32 / last).channels()));

        debug!(name = %self.name, width, repeat, "Palette texture generated");
        Ok(PaletteTexture::new(image, repeat))
    }

    /// Palette texture of equal-width whole-number buckets, one per
    /// [`ColourMap::discrete_colours`] entry.
    pub fn to_bucket_image(&mut self, repeat: bool) -> Result<PaletteTexture> {
        self.ensure_calibrated();
        let width = self.texture_width()?;
        let buckets = self.discrete_colours();
        let image: RgbaImage = ImageBuffer::from_fn(width, 1, |x, _| {
            let index = (x as usize * buckets.len()) / width as usize;
            Rgba(buckets[index.min(buckets.len() - 1)].channels())
        });

        debug!(
            name = %self.name,
            width,
            buckets = buckets.len(),
            repeat,
            "Bucket palette texture generated"
        );
        Ok(PaletteTexture::new(image, repeat))
    }

    fn texture_width(&self) -> Result<u32> {
        u32::try_from(self.samples).map_err(|_| ColourScaleError::ImageGeneration {
            message: format!("Palette width {} too large", self.samples),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colourmaps::Colour;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_text() {
        let mut map = ColourMap::from_palette("text", "red white blue");
        map.calibrate(0.0, 10.0);
        assert_eq!(
            map.to_text(),
            "0=rgba(255,0,0,1)\n0.5=rgba(255,255,255,1)\n1=rgba(0,0,255,1)\n"
        );
    }

    #[test]
    fn test_to_json_document() {
        let mut map = ColourMap::from_palette("doc", "black white");
        map.set_log_scale(true);
        map.calibrate(1.0, 100.0);
        let doc = map.to_json();
        assert_eq!(doc["name"], "doc");
        assert_eq!(doc["logscale"], true);
        assert_eq!(doc["minimum"], 1.0);
        assert_eq!(doc["colours"][1]["position"], 1.0);
        assert_eq!(doc["colours"][1]["colour"], "rgba(255,255,255,1)");
        assert!(doc.get("range").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let mut map = ColourMap::from_palette("trip", "(0)navy (3)red:0.5 (4)#00ff0080 (10)white");
        map.calibrate(0.0, 10.0);
        let doc = map.to_json();

        let mut copy = ColourMap::new("copy");
        assert!(copy.load_json(&doc));
        copy.recalibrate();
        assert_eq!(copy.len(), map.len());
        for (a, b) in map.stops().iter().zip(copy.stops()) {
            assert_eq!(a.colour, b.colour);
            assert!((a.position - b.position).abs() < 1e-5);
        }
    }

    #[test]
    fn test_image_is_a_ramp() {
        let mut map = ColourMap::with_samples("ramp", 256);
        map.load_palette("black white");
        let texture = map.to_image(false).unwrap();
        assert_eq!(texture.width(), 256);
        assert_eq!(texture.wrap, TextureWrap::ClampToEdge);
        assert_eq!(texture.image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(texture.image.get_pixel(255, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_discrete_image_resolves_positions() {
        let mut map = ColourMap::with_samples("steps", 8);
        map.load_palette("red yellow blue");
        map.set_discrete(true);
        map.calibrate(0.0, 10.0);
        let stops: Vec<[u8; 4]> = map.stops().iter().map(|s| s.colour.channels()).collect();

        let texture = map.to_image(false).unwrap();
        for x in 0..8 {
            let expected = map.resolve(x as f32 / 7.0).channels();
            assert_eq!(texture.image.get_pixel(x, 0).0, expected);
            assert!(stops.contains(&expected));
        }
    }

    #[test]
    fn test_bucket_image() {
        let mut map = ColourMap::with_samples("buckets", 9);
        map.load_palette("red blue");
        map.set_discrete(true);
        map.calibrate(0.0, 2.0);
        let texture = map.to_bucket_image(true).unwrap();
        assert_eq!(texture.wrap, TextureWrap::Repeat);
        let red = Colour::rgb(255, 0, 0).channels();
        let blue = Colour::rgb(0, 0, 255).channels();
        assert_eq!(texture.image.get_pixel(0, 0).0, red);
        assert_eq!(texture.image.get_pixel(8, 0).0, blue);
    }

    #[test]
    fn test_bucket_image_over_huge_range() {
        let mut map = ColourMap::with_samples("huge", 32);
        map.load_palette("black white");
        map.set_discrete(true);
        map.calibrate(0.0, 1e20);
        let texture = map.to_bucket_image(false).unwrap();
        assert_eq!(texture.width(), 32);
        assert_eq!(texture.image.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_encode_png_signature() {
        let mut map = ColourMap::with_samples("png", 16);
        map.load_palette("heat");
        let png = map.to_image(false).unwrap().encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
