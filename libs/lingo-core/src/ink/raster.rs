//! RGBA backing store and stroke rasterization.

use image::{imageops, Rgba, RgbaImage};

use super::geometry::{Dimensions, Point};

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Pixel buffer owned by one surface.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Blank (white) raster of the given backing size.
    pub fn blank(size: Dimensions) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, BACKGROUND),
        }
    }

    /// New raster of `size` with `previous` copied onto it at the origin.
    ///
    /// This is a raw pixel copy, so a smaller target crops the old content
    /// and repeated resizes lose detail.
    pub fn reprojected(size: Dimensions, previous: &Raster) -> Self {
        let mut raster = Self::blank(size);
        imageops::replace(&mut raster.image, &previous.image, 0, 0);
        raster
    }

    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.image.width() && y < self.image.height()).then(|| *self.image.get_pixel(x, y))
    }

    pub fn fill_background(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    /// True while no pixel differs from the background.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| *p == BACKGROUND)
    }

    /// Paint a straight segment with round caps, in backing-store pixels.
    ///
    /// Every pixel whose center lies within `width / 2` of the segment is
    /// inked, which also rounds the joins between consecutive segments.
    pub fn stroke_segment(&mut self, from: Point, to: Point, width: f64) {
        let radius = (width / 2.0).max(0.5);
        let (w, h) = (self.image.width() as i64, self.image.height() as i64);

        let min_x = ((from.x.min(to.x) - radius).floor() as i64).max(0);
        let max_x = ((from.x.max(to.x) + radius).ceil() as i64).min(w - 1);
        let min_y = ((from.y.min(to.y) - radius).floor() as i64).max(0);
        let max_y = ((from.y.max(to.y) + radius).ceil() as i64).min(h - 1);

        let radius_sq = radius * radius;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if distance_sq_to_segment(center, from, to) <= radius_sq {
                    self.image.put_pixel(x as u32, y as u32, INK);
                }
            }
        }
    }
}

fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx - p.x, a.y + t * dy - p.y);
    cx * cx + cy * cy
}
