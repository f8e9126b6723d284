//! Ripple geometry - size and placement from a pointer event and host box.

use serde::{Deserialize, Serialize};

use crate::style::{apply_styles, px};
use crate::{PointerEvent, Surface};

/// A bounding box in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Distance from the viewport top, in pixels.
    pub top: f64,
    /// Distance from the viewport left, in pixels.
    pub left: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Distance from a client point to the farthest corner of this rect.
    #[must_use]
    pub fn farthest_corner_distance(&self, x: f64, y: f64) -> f64 {
        let corners = [
            (self.left, self.top),
            (self.left + self.width, self.top),
            (self.left, self.top + self.height),
            (self.left + self.width, self.top + self.height),
        ];
        corners
            .iter()
            .map(|(cx, cy)| (cx - x).hypot(cy - y))
            .fold(0.0, f64::max)
    }
}

/// Diameter of a ripple that covers the whole host once fully scaled.
///
/// Twice the distance from the pointer to the host's farthest corner.
#[must_use]
pub fn ripple_size(event: &PointerEvent, bounds: &Rect) -> f64 {
    let max_vertical = (event.client_y - bounds.top).max(bounds.height - event.client_y + bounds.top);
    let max_horizontal =
        (event.client_x - bounds.left).max(bounds.width - event.client_x + bounds.left);
    max_vertical.hypot(max_horizontal) * 2.0
}

/// Pointer position relative to the host, as `(top, left)`.
#[must_use]
pub fn pointer_offset(event: &PointerEvent, bounds: &Rect) -> (f64, f64) {
    (event.client_y - bounds.top, event.client_x - bounds.left)
}

/// Place an element so its origin sits under the pointer.
///
/// Combined with the ripple's `translate(-50%, -50%)` this centres the circle
/// on the event point.
pub fn position_at_pointer<S: Surface>(
    surface: &mut S,
    event: &PointerEvent,
    bounds: &Rect,
    node: Option<&S::Node>,
) -> Option<S::Node> {
    let (top, left) = pointer_offset(event, bounds);
    apply_styles(surface, node, &[("top", px(top)), ("left", px(left))])
}
