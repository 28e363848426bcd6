//! Image utilities for testing palette textures.

use image::{DynamicImage, GenericImageView, ImageError, ImageFormat, Rgba};

/// Load an image from a byte array
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes)
}

/// Detect image format from bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Check if an image has the expected dimensions
pub fn assert_image_dimensions(
    image: &DynamicImage,
    expected_width: u32,
    expected_height: u32,
) -> Result<(), String> {
    let (actual_width, actual_height) = image.dimensions();

    if actual_width != expected_width || actual_height != expected_height {
        return Err(format!(
            "Image dimensions differ: actual = {}x{}, expected = {}x{}",
            actual_width, actual_height, expected_width, expected_height
        ));
    }

    Ok(())
}

/// Pixels of the first row, left to right
pub fn first_row(image: &DynamicImage) -> Vec<Rgba<u8>> {
    (0..image.width()).map(|x| image.get_pixel(x, 0)).collect()
}

/// Check that one channel never decreases along the first row
pub fn assert_channel_non_decreasing(image: &DynamicImage, channel: usize) -> Result<(), String> {
    let row = first_row(image);
    for (x, pair) in row.windows(2).enumerate() {
        if pair[1].0[channel] < pair[0].0[channel] {
            return Err(format!(
                "Channel {} decreases at x = {}: {} -> {}",
                channel,
                x + 1,
                pair[0].0[channel],
                pair[1].0[channel]
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    #[test]
    fn test_detect_image_format() {
        let img = ImageBuffer::<Rgba<u8>, Vec<u8>>::new(2, 2);
        let mut png_bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
            .unwrap();

        assert_eq!(detect_image_format(&png_bytes), Some(ImageFormat::Png));
    }

    #[test]
    fn test_assert_channel_non_decreasing() {
        let mut img = ImageBuffer::<Rgba<u8>, Vec<u8>>::new(4, 1);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8 * 10, 50 - x as u8 * 10, 0, 255]);
        }
        let img = DynamicImage::ImageRgba8(img);

        assert!(assert_channel_non_decreasing(&img, 0).is_ok());
        assert!(assert_channel_non_decreasing(&img, 1).is_err());
        assert!(assert_image_dimensions(&img, 4, 1).is_ok());
    }
}
