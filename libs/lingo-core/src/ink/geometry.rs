//! Viewport to backing-store coordinate mapping.

use serde::{Deserialize, Serialize};

/// A point in either logical or backing-store pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Logical (CSS pixel) size of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Backing-store size for a device pixel ratio.
    pub fn backing(self, device_pixel_ratio: f64) -> Dimensions {
        Dimensions {
            width: (self.width as f64 * device_pixel_ratio).round() as u32,
            height: (self.height as f64 * device_pixel_ratio).round() as u32,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// On-screen bounding rectangle of the drawing element, in viewport pixels.
///
/// The element may be stretched by its container, so `width`/`height` can
/// differ from the surface's logical dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rect displaying `dims` unscaled at the given origin.
    pub fn at(left: f64, top: f64, dims: Dimensions) -> Self {
        Self::new(left, top, dims.width as f64, dims.height as f64)
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Maps viewport coordinates into the backing store.
///
/// Three factors combine here: the CSS display scale of the element, the
/// device pixel ratio, and the logical size chosen by the size class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackingTransform {
    pub backing: Dimensions,
    pub device_pixel_ratio: f64,
}

impl BackingTransform {
    pub fn new(logical: Dimensions, device_pixel_ratio: f64) -> Self {
        Self {
            backing: logical.backing(device_pixel_ratio),
            device_pixel_ratio,
        }
    }

    /// `backing = (client - element origin) * backing size / displayed size`.
    ///
    /// Returns `None` for a collapsed element rect.
    pub fn to_backing(&self, client: Point, rect: &ElementRect) -> Option<Point> {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        Some(Point::new(
            (client.x - rect.left) * self.backing.width as f64 / rect.width,
            (client.y - rect.top) * self.backing.height as f64 / rect.height,
        ))
    }

    /// Same mapping, expressed in logical pixels.
    pub fn to_logical(&self, client: Point, rect: &ElementRect) -> Option<Point> {
        self.to_backing(client, rect)
            .map(|p| p.scale(1.0 / self.device_pixel_ratio))
    }
}
