//! The ink capture surface.
//!
//! Turns normalized pointer input into a raster drawing and hands it out as
//! a base64 PNG: once per completed stroke through the stroke callback, and
//! on demand through an injected text converter.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ConversionError, SurfaceError};
use crate::types::{SizeClass, SurfaceOptions};

use super::encode::encode_png_base64;
use super::geometry::{BackingTransform, Dimensions, ElementRect, Point};
use super::host::{HostEnvironment, ResizeRegistration};
use super::pointer::{PointerEvent, PointerPhase};
use super::raster::Raster;

/// Device pixel ratios above this are clamped.
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 4.0;

/// Allowed stroke widths, in logical pixels.
pub const STROKE_WIDTH_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Boxed future returned by converters.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Receives the PNG payload after each stroke, or `None` after a clear.
pub type StrokeCallback = Box<dyn FnMut(Option<String>) + Send>;

/// Asynchronous image-to-text collaborator (usually a remote OCR service).
pub trait TextConverter: Send + Sync {
    fn convert(&self, png_base64: String) -> BoxFuture<Result<String, ConversionError>>;
}

impl<F, Fut> TextConverter for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, ConversionError>> + Send + 'static,
{
    fn convert(&self, png_base64: String) -> BoxFuture<Result<String, ConversionError>> {
        Box::pin(self(png_base64))
    }
}

/// How a conversion request resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The converter returned this text.
    Converted(String),
    /// Nothing has been drawn.
    NoInk,
    /// Another conversion is still pending on this surface.
    InFlight,
    /// No converter is installed or the backing store could not be encoded.
    Unavailable,
    /// The converter failed; the reason is for the caller to display.
    Failed(String),
}

/// Points of the stroke being drawn, in logical pixels.
#[derive(Debug, Default)]
struct StrokeSession {
    points: Vec<Point>,
}

impl StrokeSession {
    fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

/// Resets the single-flight flag when the conversion finishes or is dropped.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A resizable drawing surface.
pub struct InkSurface {
    options: SurfaceOptions,
    host: Box<dyn HostEnvironment>,
    dimensions: Option<Dimensions>,
    transform: Option<BackingTransform>,
    raster: Option<Raster>,
    has_ink: bool,
    stroke: Option<StrokeSession>,
    resize_watch: Option<ResizeRegistration>,
    on_stroke_complete: Option<StrokeCallback>,
    converter: Option<Arc<dyn TextConverter>>,
    converting: Arc<AtomicBool>,
}

impl InkSurface {
    /// Mount a surface and initialize its backing store.
    pub fn new(
        options: SurfaceOptions,
        host: impl HostEnvironment + 'static,
    ) -> Result<Self, SurfaceError> {
        let mut surface = Self {
            options,
            host: Box::new(host),
            dimensions: None,
            transform: None,
            raster: None,
            has_ink: false,
            stroke: None,
            resize_watch: None,
            on_stroke_complete: None,
            converter: None,
            converting: Arc::new(AtomicBool::new(false)),
        };
        surface.configure(options.size_class, options.stroke_width)?;
        Ok(surface)
    }

    pub fn with_stroke_callback(mut self, callback: impl FnMut(Option<String>) + Send + 'static) -> Self {
        self.on_stroke_complete = Some(Box::new(callback));
        self
    }

    pub fn with_converter(mut self, converter: impl TextConverter + 'static) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    pub fn options(&self) -> SurfaceOptions {
        self.options
    }

    pub fn has_ink(&self) -> bool {
        self.has_ink
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn is_converting(&self) -> bool {
        self.converting.load(Ordering::Acquire)
    }

    /// Logical size, `None` while no backing store could be created.
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    /// Backing-store size in device pixels.
    pub fn backing_size(&self) -> Option<Dimensions> {
        self.raster.as_ref().map(Raster::size)
    }

    /// Whether the host should show size and width controls.
    pub fn resize_controls_enabled(&self) -> bool {
        self.options.allow_resize
    }

    /// Apply a size class and stroke width.
    ///
    /// Reinitializes the backing store. Existing ink is copied onto the new
    /// store as pixels, so shrinking crops it.
    pub fn configure(&mut self, size_class: SizeClass, stroke_width: u8) -> Result<(), SurfaceError> {
        validate_stroke_width(stroke_width)?;
        size_class.validate()?;
        self.options.size_class = size_class;
        self.options.stroke_width = stroke_width;

        if size_class == SizeClass::FillContainer {
            if self.resize_watch.is_none() {
                self.resize_watch = Some(self.host.watch_resize());
            }
        } else {
            self.resize_watch = None;
        }

        self.reinitialize();
        Ok(())
    }

    /// Size change from the surface's own controls.
    pub fn select_size_class(&mut self, size_class: SizeClass) -> Result<(), SurfaceError> {
        if !self.options.allow_resize {
            return Err(SurfaceError::ResizeDisabled);
        }
        self.configure(size_class, self.options.stroke_width)
    }

    /// Change the stroke width without touching the backing store.
    pub fn set_stroke_width(&mut self, stroke_width: u8) -> Result<(), SurfaceError> {
        validate_stroke_width(stroke_width)?;
        self.options.stroke_width = stroke_width;
        Ok(())
    }

    /// Window resize notification. Only acts while the container-filling
    /// class holds a resize registration.
    pub fn handle_window_resize(&mut self) {
        if self.resize_watch.is_none() {
            return;
        }
        self.reinitialize();
    }

    /// Rebuild the backing store for the current size class.
    ///
    /// When the size cannot be measured an existing store is left as it is;
    /// only a surface that never had one stays unavailable. A stroke in
    /// progress carries over unless its last point falls outside the new
    /// size, in which case it is completed first.
    fn reinitialize(&mut self) {
        let ratio = self.host.device_pixel_ratio();
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio.min(MAX_DEVICE_PIXEL_RATIO)
        } else {
            1.0
        };

        let sized = self
            .logical_dimensions()
            .map(|logical| (logical, BackingTransform::new(logical, ratio)))
            .filter(|(_, transform)| !transform.backing.is_empty());
        let Some((logical, transform)) = sized else {
            if self.raster.is_some() {
                tracing::warn!(size_class = ?self.options.size_class, "no usable size, keeping current backing store");
            } else {
                tracing::warn!(size_class = ?self.options.size_class, "no usable size, backing store unavailable");
            }
            return;
        };

        let stroke_escapes = self
            .stroke
            .as_ref()
            .and_then(StrokeSession::last)
            .is_some_and(|last| {
                last.x >= f64::from(logical.width) || last.y >= f64::from(logical.height)
            });
        if stroke_escapes {
            self.end_stroke();
        }

        let raster = match (&self.raster, self.has_ink) {
            (Some(previous), true) => Raster::reprojected(transform.backing, previous),
            _ => Raster::blank(transform.backing),
        };

        tracing::debug!(
            width = logical.width,
            height = logical.height,
            backing_width = transform.backing.width,
            backing_height = transform.backing.height,
            preserved = self.has_ink,
            drawing = self.stroke.is_some(),
            "backing store initialized"
        );

        self.dimensions = Some(logical);
        self.transform = Some(transform);
        self.raster = Some(raster);
    }

    fn logical_dimensions(&self) -> Option<Dimensions> {
        match self.options.size_class.preset() {
            Some((width, height)) => Some(Dimensions::new(width, height)),
            None => {
                let container = self.host.container_width()?;
                let width = (container - SizeClass::CONTAINER_PADDING)
                    .floor()
                    .min(f64::from(SizeClass::MAX_LOGICAL_SIZE));
                (width >= 1.0).then(|| Dimensions::new(width as u32, SizeClass::FILL_HEIGHT))
            }
        }
    }

    /// Route a normalized pointer event. Up, leave and cancel all end the
    /// stroke.
    pub fn handle_pointer(&mut self, event: &PointerEvent, rect: &ElementRect) {
        match event.phase {
            PointerPhase::Down => self.begin_stroke(event, rect),
            PointerPhase::Move => self.extend_stroke(event, rect),
            PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => self.end_stroke(),
        }
    }

    /// Start a new path at the event position and mark the surface inked.
    pub fn begin_stroke(&mut self, event: &PointerEvent, rect: &ElementRect) {
        let Some(point) = self.map_event(event, rect) else {
            tracing::debug!("begin_stroke ignored, no backing store");
            return;
        };
        self.stroke = Some(StrokeSession {
            points: vec![point],
        });
        self.has_ink = true;
    }

    /// Draw a segment from the last point to the event position.
    pub fn extend_stroke(&mut self, event: &PointerEvent, rect: &ElementRect) {
        if self.stroke.is_none() {
            return;
        }
        let Some(point) = self.map_event(event, rect) else {
            return;
        };
        let (Some(stroke), Some(raster), Some(transform)) =
            (self.stroke.as_mut(), self.raster.as_mut(), self.transform.as_ref())
        else {
            return;
        };
        if let Some(last) = stroke.last() {
            let ratio = transform.device_pixel_ratio;
            raster.stroke_segment(
                last.scale(ratio),
                point.scale(ratio),
                f64::from(self.options.stroke_width) * ratio,
            );
        }
        stroke.points.push(point);
    }

    /// Close the current path and emit the drawing.
    ///
    /// Without an active stroke this does nothing, so a pointer leaving the
    /// element after release does not emit twice.
    pub fn end_stroke(&mut self) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        tracing::trace!(points = stroke.points.len(), "stroke completed");

        if !self.has_ink {
            return;
        }
        if let Some(payload) = self.encode() {
            self.emit(Some(payload));
        }
    }

    /// Blank the backing store and tell the caller there is no content.
    pub fn clear(&mut self) {
        if let Some(raster) = self.raster.as_mut() {
            raster.fill_background();
        }
        self.stroke = None;
        self.has_ink = false;
        self.emit(None);
    }

    /// Encode the current drawing for an explicit "done" action.
    pub fn export(&self) -> Option<String> {
        if !self.has_ink || self.stroke.is_some() {
            return None;
        }
        self.encode()
    }

    /// Encode the drawing and pass it to the converter.
    ///
    /// The in-flight check happens when this is called, not when the future
    /// is first polled, so a second call before the first resolves gets
    /// `InFlight` without reaching the converter.
    pub fn request_conversion(&self) -> impl Future<Output = ConversionOutcome> + Send + 'static {
        let prepared = self.prepare_conversion();
        async move {
            let (converter, payload, _guard) = match prepared {
                Ok(prepared) => prepared,
                Err(outcome) => return outcome,
            };
            match converter.convert(payload).await {
                Ok(text) => ConversionOutcome::Converted(text),
                Err(err) => {
                    tracing::warn!(error = %err, "text conversion failed");
                    ConversionOutcome::Failed(err.0)
                }
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn prepare_conversion(
        &self,
    ) -> Result<(Arc<dyn TextConverter>, String, InFlightGuard), ConversionOutcome> {
        if !self.has_ink {
            return Err(ConversionOutcome::NoInk);
        }
        let Some(converter) = self.converter.clone() else {
            tracing::debug!("conversion requested without a converter");
            return Err(ConversionOutcome::Unavailable);
        };
        let Some(guard) = InFlightGuard::acquire(&self.converting) else {
            tracing::debug!("conversion already in flight, request rejected");
            return Err(ConversionOutcome::InFlight);
        };
        let Some(payload) = self.encode() else {
            return Err(ConversionOutcome::Unavailable);
        };
        Ok((converter, payload, guard))
    }

    fn map_event(&self, event: &PointerEvent, rect: &ElementRect) -> Option<Point> {
        self.transform.as_ref()?.to_logical(event.client, rect)
    }

    fn encode(&self) -> Option<String> {
        let raster = self.raster.as_ref()?;
        match encode_png_base64(raster) {
            Ok(payload) => Some(payload),
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode drawing");
                None
            }
        }
    }

    fn emit(&mut self, payload: Option<String>) {
        if let Some(callback) = self.on_stroke_complete.as_mut() {
            callback(payload);
        }
    }
}

impl std::fmt::Debug for InkSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InkSurface")
            .field("options", &self.options)
            .field("dimensions", &self.dimensions)
            .field("has_ink", &self.has_ink)
            .field("drawing", &self.stroke.is_some())
            .field("converting", &self.is_converting())
            .finish_non_exhaustive()
    }
}

fn validate_stroke_width(width: u8) -> Result<(), SurfaceError> {
    if STROKE_WIDTH_RANGE.contains(&width) {
        Ok(())
    } else {
        Err(SurfaceError::InvalidStrokeWidth(width))
    }
}
