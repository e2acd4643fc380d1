//! PNG + base64 export of a raster.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};

use super::raster::Raster;

/// Encode the raster as a PNG and return the base64 payload (no data-URL
/// prefix).
pub fn encode_png_base64(raster: &Raster) -> Result<String, ImageError> {
    let image = raster.image();
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(STANDARD.encode(bytes))
}

/// Decode a base64 PNG payload back to RGBA pixels.
pub fn decode_png_base64(payload: &str) -> Option<image::RgbaImage> {
    let bytes = STANDARD.decode(payload).ok()?;
    image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .ok()
        .map(|img| img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ink::geometry::{Dimensions, Point};
    use crate::ink::raster::INK;

    #[test]
    fn payload_is_png() {
        let raster = Raster::blank(Dimensions::new(8, 8));
        let payload = encode_png_base64(&raster).unwrap();
        let bytes = STANDARD.decode(&payload).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn decoded_pixels_match() {
        let mut raster = Raster::blank(Dimensions::new(16, 12));
        raster.stroke_segment(Point::new(1.0, 6.0), Point::new(15.0, 6.0), 2.0);
        let decoded = decode_png_base64(&encode_png_base64(&raster).unwrap()).unwrap();
        assert_eq!(decoded.dimensions(), (16, 12));
        assert_eq!(*decoded.get_pixel(8, 6), INK);
        assert_eq!(&decoded, raster.image());
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(decode_png_base64("not base64!").is_none());
        assert!(decode_png_base64("aGVsbG8=").is_none());
    }
}
