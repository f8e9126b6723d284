//! The rendering surface a ripple is drawn on.
//!
//! The controller never talks to a DOM or scene graph directly. Everything it
//! needs (create an element, set a style, measure, attach, detach) goes through
//! [`Surface`], so the same lifecycle runs against the browser DOM (the `wasm`
//! feature) and against the in-memory [`Document`](crate::dom::Document).

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::{Rect, RippleResult};

/// Capability interface over a retained element tree.
pub trait Surface {
    /// Handle to a live element.
    type Node: Clone + PartialEq + Debug;

    /// Create a detached element with the given tag.
    fn create_element(&mut self, tag: &str) -> RippleResult<Self::Node>;

    /// Add a class name to an element.
    fn add_class(&mut self, node: &Self::Node, class: &str);

    /// Set one inline style property.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str);

    /// Resolve the computed value of a style property.
    fn computed_style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Get the element's bounding box in client coordinates.
    fn bounding_rect(&self, node: &Self::Node) -> Option<Rect>;

    /// Find a direct child carrying the given class.
    fn find_child_with_class(&self, parent: &Self::Node, class: &str) -> Option<Self::Node>;

    /// Append `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if either node is unknown to the surface.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> RippleResult<()>;

    /// Detach an element from the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown to the surface.
    fn remove(&mut self, node: &Self::Node) -> RippleResult<()>;

    /// Check whether an element is part of the live tree.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Release an element that was created but never attached.
    fn discard(&mut self, node: &Self::Node);

    /// Report the runtime's touch input capabilities.
    fn touch_support(&self) -> TouchSupport;
}

/// Touch capabilities reported by the runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchSupport {
    /// The runtime exposes `ontouchstart`.
    pub touch_start_event: bool,
    /// `navigator.maxTouchPoints`.
    pub max_touch_points: u32,
    /// Legacy `navigator.msMaxTouchPoints`, when present.
    pub ms_max_touch_points: Option<u32>,
}

impl TouchSupport {
    /// A runtime with no touch input.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            touch_start_event: false,
            max_touch_points: 0,
            ms_max_touch_points: None,
        }
    }

    /// A typical touch screen.
    #[must_use]
    pub const fn touch_screen() -> Self {
        Self {
            touch_start_event: true,
            max_touch_points: 5,
            ms_max_touch_points: None,
        }
    }

    /// Check whether release events should be considered unreliable.
    #[must_use]
    pub fn is_touch_device(&self) -> bool {
        self.touch_start_event
            || self.max_touch_points > 0
            || self.ms_max_touch_points.is_some_and(|points| points > 0)
    }
}
