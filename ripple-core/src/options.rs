//! Ripple options and their defaulting rules.
//!
//! Plain-data settings live in [`RippleConfig`]. Callers never build one
//! directly; they write a [`RipplePatch`] with only the keys they care about,
//! and [`RipplePatch::resolve`] fills in the rest. Patches layer shallowly:
//! built-in defaults, then a preset, then per-call overrides, last one wins.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::ripple::{HostRef, SpawnContext};
use crate::RippleResult;

/// Default total animation time, in milliseconds.
pub const DEFAULT_DURATION_MS: f64 = 450.0;

/// Default ripple fill.
pub const DEFAULT_COLOR: &str = "rgba(255, 255, 255, .3)";

/// Default easing of the scale transition.
pub const DEFAULT_TIMING_FUNCTION: &str = "cubic-bezier(.42,.36,.28,.88)";

/// Default class carried by every ripple element.
pub const DEFAULT_CLASS_NAME: &str = "__useRipple--ripple";

/// Default class carried by the per-host ripple container.
pub const DEFAULT_CONTAINER_CLASS_NAME: &str = "__useRipple--ripple-container";

/// Fully resolved ripple settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RippleConfig {
    /// Total animation budget in milliseconds; every sub-timing scales with it.
    pub duration: f64,
    /// Ripple fill colour (any CSS colour).
    pub color: String,
    /// CSS easing for the scale transition.
    pub timing_function: String,
    /// Suppress all spawning.
    pub disabled: bool,
    /// Class added to ripple elements.
    pub class_name: String,
    /// Class identifying (and reusing) the ripple container.
    pub container_class_name: String,
    /// Ignore `mousedown` events from non-primary buttons.
    pub ignore_non_left_click: bool,
    /// Fade on a timer instead of waiting for the pointer release.
    pub cancel_automatically: bool,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION_MS,
            color: DEFAULT_COLOR.to_string(),
            timing_function: DEFAULT_TIMING_FUNCTION.to_string(),
            disabled: false,
            class_name: DEFAULT_CLASS_NAME.to_string(),
            container_class_name: DEFAULT_CONTAINER_CLASS_NAME.to_string(),
            ignore_non_left_click: true,
            cancel_automatically: false,
        }
    }
}

/// A partial [`RippleConfig`]; unset keys fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RipplePatch {
    /// See [`RippleConfig::duration`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// See [`RippleConfig::color`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// See [`RippleConfig::timing_function`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_function: Option<String>,
    /// See [`RippleConfig::disabled`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// See [`RippleConfig::class_name`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// See [`RippleConfig::container_class_name`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_class_name: Option<String>,
    /// See [`RippleConfig::ignore_non_left_click`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_non_left_click: Option<bool>,
    /// See [`RippleConfig::cancel_automatically`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_automatically: Option<bool>,
}

impl RipplePatch {
    /// An empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a patch from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a key has the wrong type.
    pub fn from_json(json: &str) -> RippleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Layer `over` on top of `self`; keys set in `over` win.
    #[must_use]
    pub fn merge(&self, over: &Self) -> Self {
        Self {
            duration: over.duration.or(self.duration),
            color: over.color.clone().or_else(|| self.color.clone()),
            timing_function: over
                .timing_function
                .clone()
                .or_else(|| self.timing_function.clone()),
            disabled: over.disabled.or(self.disabled),
            class_name: over.class_name.clone().or_else(|| self.class_name.clone()),
            container_class_name: over
                .container_class_name
                .clone()
                .or_else(|| self.container_class_name.clone()),
            ignore_non_left_click: over.ignore_non_left_click.or(self.ignore_non_left_click),
            cancel_automatically: over.cancel_automatically.or(self.cancel_automatically),
        }
    }

    /// Fill unset keys from the built-in defaults.
    #[must_use]
    pub fn resolve(&self) -> RippleConfig {
        let defaults = RippleConfig::default();
        RippleConfig {
            duration: self.duration.unwrap_or(defaults.duration),
            color: self.color.clone().unwrap_or(defaults.color),
            timing_function: self
                .timing_function
                .clone()
                .unwrap_or(defaults.timing_function),
            disabled: self.disabled.unwrap_or(defaults.disabled),
            class_name: self.class_name.clone().unwrap_or(defaults.class_name),
            container_class_name: self
                .container_class_name
                .clone()
                .unwrap_or(defaults.container_class_name),
            ignore_non_left_click: self
                .ignore_non_left_click
                .unwrap_or(defaults.ignore_non_left_click),
            cancel_automatically: self
                .cancel_automatically
                .unwrap_or(defaults.cancel_automatically),
        }
    }

    /// Set the duration.
    #[must_use]
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the easing.
    #[must_use]
    pub fn with_timing_function(mut self, timing_function: impl Into<String>) -> Self {
        self.timing_function = Some(timing_function.into());
        self
    }

    /// Set whether spawning is disabled.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Set the ripple class.
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set the container class.
    #[must_use]
    pub fn with_container_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.container_class_name = Some(class_name.into());
        self
    }

    /// Set whether non-primary mouse presses are ignored.
    #[must_use]
    pub fn with_ignore_non_left_click(mut self, ignore: bool) -> Self {
        self.ignore_non_left_click = Some(ignore);
        self
    }

    /// Set the cancellation policy.
    #[must_use]
    pub fn with_cancel_automatically(mut self, automatic: bool) -> Self {
        self.cancel_automatically = Some(automatic);
        self
    }
}

/// Callback run once for every spawned ripple.
pub type OnSpawn<N> = Rc<dyn Fn(&SpawnContext<N>)>;

/// Everything a ripple hook accepts: a config patch plus the options that
/// are not plain data.
pub struct RippleOptions<N> {
    /// Plain-data overrides.
    pub patch: RipplePatch,
    /// Spawn hook.
    pub on_spawn: Option<OnSpawn<N>>,
    /// Externally owned host reference, used instead of an internal one.
    pub host_ref: Option<HostRef<N>>,
}

impl<N> RippleOptions<N> {
    /// Options with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self {
            patch: RipplePatch::default(),
            on_spawn: None,
            host_ref: None,
        }
    }

    /// Wrap a config patch.
    #[must_use]
    pub fn from_patch(patch: RipplePatch) -> Self {
        Self {
            patch,
            ..Self::new()
        }
    }

    /// Set the spawn hook.
    #[must_use]
    pub fn with_on_spawn(mut self, on_spawn: impl Fn(&SpawnContext<N>) + 'static) -> Self {
        self.on_spawn = Some(Rc::new(on_spawn));
        self
    }

    /// Use an externally owned host reference.
    #[must_use]
    pub fn with_host_ref(mut self, host_ref: HostRef<N>) -> Self {
        self.host_ref = Some(host_ref);
        self
    }

    /// Layer `over` on top of these options; anything set in `over` wins.
    #[must_use]
    pub fn merge(&self, over: Self) -> Self {
        Self {
            patch: self.patch.merge(&over.patch),
            on_spawn: over.on_spawn.or_else(|| self.on_spawn.clone()),
            host_ref: over.host_ref.or_else(|| self.host_ref.clone()),
        }
    }
}

impl<N> Default for RippleOptions<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for RippleOptions<N> {
    fn clone(&self) -> Self {
        Self {
            patch: self.patch.clone(),
            on_spawn: self.on_spawn.clone(),
            host_ref: self.host_ref.clone(),
        }
    }
}

impl<N> fmt::Debug for RippleOptions<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RippleOptions")
            .field("patch", &self.patch)
            .field("on_spawn", &self.on_spawn.is_some())
            .field("host_ref", &self.host_ref.is_some())
            .finish()
    }
}
