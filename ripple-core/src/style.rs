//! Declarative style sets applied to surface nodes.

use crate::{RippleConfig, Surface};

/// One `(property, value)` style declaration.
pub type Declaration = (&'static str, String);

/// An ordered list of declarations, applied first to last.
pub type StyleSet = Vec<Declaration>;

/// Share of the duration spent on the scale transition.
pub const TRANSFORM_FACTOR: f64 = 0.6;

/// Share of the duration spent on the entrance opacity transition.
pub const ENTRANCE_OPACITY_FACTOR: f64 = 0.05;

/// Lower bound of the entrance opacity transition, in milliseconds.
pub const ENTRANCE_OPACITY_FLOOR_MS: f64 = 140.0;

/// Share of the duration spent fading out.
pub const FADE_OPACITY_FACTOR: f64 = 0.65;

/// Share of the duration the fade waits before starting.
pub const FADE_DELAY_FACTOR: f64 = 0.13;

/// Transform of a freshly spawned ripple.
pub const SCALE_ZERO: &str = "translate(-50%, -50%) scale(0)";

/// Transform of a fully grown ripple.
pub const SCALE_FULL: &str = "translate(-50%, -50%) scale(1)";

/// Format a pixel length.
#[must_use]
pub fn px(value: f64) -> String {
    format!("{value}px")
}

/// Format a millisecond duration.
#[must_use]
pub fn ms(value: f64) -> String {
    format!("{value}ms")
}

/// Apply declarations in order to a node.
///
/// Returns the node back, or `None` without touching the surface when there
/// is no node.
pub fn apply_styles<S: Surface>(
    surface: &mut S,
    node: Option<&S::Node>,
    styles: &[Declaration],
) -> Option<S::Node> {
    let node = node?;
    for (property, value) in styles {
        surface.set_style(node, property, value);
    }
    Some(node.clone())
}

/// Initial styles of a ripple of the given diameter: invisible scale, 60%
/// opacity, coupled transform/opacity transition.
#[must_use]
pub fn entrance_styles(config: &RippleConfig, size: f64) -> StyleSet {
    let size = px(size);
    vec![
        ("position", "absolute".to_string()),
        ("height", size.clone()),
        ("width", size),
        ("transform", SCALE_ZERO.to_string()),
        ("pointer-events", "none".to_string()),
        ("border-radius", "50%".to_string()),
        ("opacity", "0.6".to_string()),
        ("background", config.color.clone()),
        ("transition", entrance_transition(config)),
    ]
}

/// The entrance `transition` value.
///
/// The opacity part has a floor so very short durations still read.
#[must_use]
pub fn entrance_transition(config: &RippleConfig) -> String {
    format!(
        "transform {} {}, opacity {} ease-out",
        ms(config.duration * TRANSFORM_FACTOR),
        config.timing_function,
        ms((config.duration * ENTRANCE_OPACITY_FACTOR).max(ENTRANCE_OPACITY_FLOOR_MS)),
    )
}

/// Swap to full scale, starting the grow transition.
#[must_use]
pub fn grow_styles() -> StyleSet {
    vec![("transform", SCALE_FULL.to_string())]
}

/// Fade to transparent; the opacity fade is delayed slightly behind any
/// remaining transform motion.
#[must_use]
pub fn fade_out_styles(config: &RippleConfig) -> StyleSet {
    vec![
        ("opacity", "0".to_string()),
        (
            "transition",
            format!(
                "transform {} {}, opacity {} ease-in-out {}",
                ms(config.duration * TRANSFORM_FACTOR),
                config.timing_function,
                ms(config.duration * FADE_OPACITY_FACTOR),
                ms(config.duration * FADE_DELAY_FACTOR),
            ),
        ),
    ]
}

/// Full-bleed clipping layer that holds the ripples of one host.
#[must_use]
pub fn container_styles() -> StyleSet {
    vec![
        ("position", "absolute".to_string()),
        ("top", "0".to_string()),
        ("left", "0".to_string()),
        ("width", "100%".to_string()),
        ("height", "100%".to_string()),
        ("overflow", "hidden".to_string()),
        ("pointer-events", "none".to_string()),
        ("border-radius", "inherit".to_string()),
    ]
}

/// Make a statically positioned host a containing block.
#[must_use]
pub fn host_position_styles() -> StyleSet {
    vec![("position", "relative".to_string())]
}

/// Clip directly on the host (superseded by the container layer).
#[must_use]
pub fn legacy_host_clip_styles() -> StyleSet {
    vec![("overflow", "hidden".to_string())]
}
