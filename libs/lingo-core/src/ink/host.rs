//! What a surface needs from the page hosting it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Live measurements and window-resize wiring supplied by the host page.
pub trait HostEnvironment: Send {
    /// Current device pixel ratio.
    fn device_pixel_ratio(&self) -> f64;

    /// Inner width of the element containing the surface, if mounted.
    fn container_width(&self) -> Option<f64>;

    /// Start forwarding window-resize events to the surface. Forwarding stops
    /// when the returned registration is dropped.
    fn watch_resize(&self) -> ResizeRegistration;
}

/// Scoped window-resize listener. Dropping it deregisters the listener.
pub struct ResizeRegistration {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ResizeRegistration {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A registration with nothing to release.
    pub fn detached() -> Self {
        Self { release: None }
    }
}

impl Drop for ResizeRegistration {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for ResizeRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResizeRegistration")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Metrics {
    device_pixel_ratio: f64,
    container_width: Option<f64>,
}

/// Host with measurements set by the caller, for headless use and tests.
///
/// Clones share state, so a caller can keep one handle to change the
/// measurements after the surface has taken another.
#[derive(Debug, Clone)]
pub struct StaticHost {
    metrics: Arc<Mutex<Metrics>>,
    listeners: Arc<AtomicUsize>,
}

impl StaticHost {
    pub fn new(device_pixel_ratio: f64, container_width: Option<f64>) -> Self {
        Self {
            metrics: Arc::new(Mutex::new(Metrics {
                device_pixel_ratio,
                container_width,
            })),
            listeners: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_container_width(&self, width: Option<f64>) {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .container_width = width;
    }

    pub fn set_device_pixel_ratio(&self, ratio: f64) {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .device_pixel_ratio = ratio;
    }

    /// Number of resize listeners currently registered.
    pub fn active_listeners(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }

    fn metrics(&self) -> Metrics {
        *self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StaticHost {
    fn default() -> Self {
        Self::new(1.0, None)
    }
}

impl HostEnvironment for StaticHost {
    fn device_pixel_ratio(&self) -> f64 {
        self.metrics().device_pixel_ratio
    }

    fn container_width(&self) -> Option<f64> {
        self.metrics().container_width
    }

    fn watch_resize(&self) -> ResizeRegistration {
        self.listeners.fetch_add(1, Ordering::SeqCst);
        let listeners = Arc::clone(&self.listeners);
        ResizeRegistration::new(move || {
            listeners.fetch_sub(1, Ordering::SeqCst);
        })
    }
}
