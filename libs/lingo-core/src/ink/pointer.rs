//! One pointer event shape for mouse, touch and pen input.

use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// Input device that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerSource {
    Mouse,
    Touch,
    Pen,
}

/// Where in a press/drag/release cycle an event sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
    Cancel,
}

impl PointerPhase {
    /// Up, leave and cancel all finish the current stroke.
    pub fn ends_stroke(self) -> bool {
        matches!(self, Self::Up | Self::Leave | Self::Cancel)
    }
}

/// A normalized pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub source: PointerSource,
    pub client: Point,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, source: PointerSource, client_x: f64, client_y: f64) -> Self {
        Self {
            phase,
            source,
            client: Point::new(client_x, client_y),
        }
    }

    pub fn mouse(phase: PointerPhase, client_x: f64, client_y: f64) -> Self {
        Self::new(phase, PointerSource::Mouse, client_x, client_y)
    }

    /// Build from a touch event's active touch list. Only the first touch
    /// draws.
    ///
    /// Ending phases carry no touches on most platforms, so they map to an
    /// event at the origin; down/move without touches yield `None`.
    pub fn from_touches(phase: PointerPhase, touches: &[Point]) -> Option<Self> {
        match touches.first() {
            Some(first) => Some(Self::new(phase, PointerSource::Touch, first.x, first.y)),
            None if phase.ends_stroke() => Some(Self::new(phase, PointerSource::Touch, 0.0, 0.0)),
            None => None,
        }
    }
}
