//! Input events consumed by the ripple controller.

use serde::{Deserialize, Serialize};

/// Primary mouse button as reported by the legacy `which` field.
pub const PRIMARY_BUTTON: u32 = 1;

/// Native event type name of a mouse press.
pub const MOUSE_DOWN: &str = "mousedown";

/// Native event type name of a touch press.
pub const TOUCH_START: &str = "touchstart";

/// Native discriminators carried by a pointer event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeEvent {
    /// Legacy button number (1 = left, 2 = middle, 3 = right).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub which: Option<u32>,
    /// Event type name (`mousedown`, `touchstart`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The minimal pointer event shape a ripple trigger needs.
///
/// Only client coordinates are required; richer events convert into this by
/// copying the fields they have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    /// X position in client (viewport) coordinates.
    pub client_x: f64,
    /// Y position in client (viewport) coordinates.
    pub client_y: f64,
    /// Native button/type discriminators, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_event: Option<NativeEvent>,
}

impl PointerEvent {
    /// Create an event with coordinates only.
    #[must_use]
    pub fn at(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            native_event: None,
        }
    }

    /// Create a `mousedown` event for the given button.
    #[must_use]
    pub fn mouse_down(client_x: f64, client_y: f64, which: u32) -> Self {
        Self {
            client_x,
            client_y,
            native_event: Some(NativeEvent {
                which: Some(which),
                kind: Some(MOUSE_DOWN.to_string()),
            }),
        }
    }

    /// Create a `touchstart` event.
    #[must_use]
    pub fn touch_start(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            native_event: Some(NativeEvent {
                which: None,
                kind: Some(TOUCH_START.to_string()),
            }),
        }
    }

    /// Check if this is a mouse press with a non-primary button.
    ///
    /// Events without native discriminators count as primary presses.
    #[must_use]
    pub fn is_secondary_mouse_down(&self) -> bool {
        let Some(native) = &self.native_event else {
            return false;
        };
        native.kind.as_deref() == Some(MOUSE_DOWN)
            && native.which.is_some_and(|which| which != PRIMARY_BUTTON)
    }
}

/// Document-level release events that end a held ripple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    /// Mouse button released.
    MouseUp,
    /// Finger lifted.
    TouchEnd,
}

impl ReleaseKind {
    /// The DOM event name for this release.
    #[must_use]
    pub fn event_name(self) -> &'static str {
        match self {
            Self::MouseUp => "mouseup",
            Self::TouchEnd => "touchend",
        }
    }

    /// Parse a DOM event name.
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "mouseup" => Some(Self::MouseUp),
            "touchend" => Some(Self::TouchEnd),
            _ => None,
        }
    }
}
