//! Ink capture: pointer input in, base64 PNG out.

pub mod encode;
pub mod geometry;
pub mod host;
pub mod pointer;
pub mod raster;
pub mod surface;

pub use geometry::{BackingTransform, Dimensions, ElementRect, Point};
pub use host::{HostEnvironment, ResizeRegistration, StaticHost};
pub use pointer::{PointerEvent, PointerPhase, PointerSource};
pub use surface::{BoxFuture, ConversionOutcome, InkSurface, TextConverter};
