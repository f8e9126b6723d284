//! Hook-style entry points.
//!
//! [`use_ripple`] mirrors the `[ref, trigger]` pair UI frameworks expect: the
//! returned controller hands out the host reference to bind, and its
//! [`trigger`](RippleController::trigger) is what the press handler calls.
//! [`custom_ripple`] bakes a set of preset options into a reusable factory.

use std::fmt::Debug;

use crate::options::{RipplePatch, RippleOptions};
use crate::ripple::{ContainerStrategy, RippleController, SpawnContext};
use crate::scheduler::Clock;

/// Create a ripple controller for one host.
///
/// ```
/// use ripple_core::{use_ripple, Document, ManualClock, PointerEvent, Rect, RippleOptions};
///
/// let mut doc = Document::new();
/// let button = doc.add_root("button", Some(Rect::new(0.0, 0.0, 120.0, 40.0)));
///
/// let mut ripple = use_ripple(RippleOptions::new(), ManualClock::new());
/// ripple.host_ref().bind(button);
///
/// assert!(ripple.trigger(&mut doc, &PointerEvent::mouse_down(30.0, 20.0, 1)));
/// ripple.on_animation_frame(&mut doc);
/// assert_eq!(ripple.active_count(), 1);
/// ```
pub fn use_ripple<N: Clone + PartialEq + Debug>(
    options: RippleOptions<N>,
    clock: impl Clock + 'static,
) -> RippleController<N> {
    RippleController::new(options, clock)
}

/// A ripple hook with preset options.
#[derive(Debug, Clone)]
pub struct RippleFactory<N> {
    preset: RippleOptions<N>,
    strategy: ContainerStrategy,
}

impl<N: Clone + PartialEq + Debug> RippleFactory<N> {
    /// The preset options.
    #[must_use]
    pub fn preset(&self) -> &RippleOptions<N> {
        &self.preset
    }

    /// Use a container strategy for every controller built from now on.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ContainerStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Add a spawn hook to the preset.
    #[must_use]
    pub fn with_on_spawn(mut self, on_spawn: impl Fn(&SpawnContext<N>) + 'static) -> Self {
        self.preset = self.preset.with_on_spawn(on_spawn);
        self
    }

    /// Build a controller; `overrides` win over the preset, which wins over
    /// the built-in defaults.
    pub fn build(
        &self,
        overrides: RippleOptions<N>,
        clock: impl Clock + 'static,
    ) -> RippleController<N> {
        use_ripple(self.preset.merge(overrides), clock).with_strategy(self.strategy)
    }
}

/// Create a ripple factory from preset options.
///
/// The preset carries no host reference: every controller built from the
/// factory gets its own unless the per-call overrides supply one.
///
/// ```
/// use ripple_core::{custom_ripple, ManualClock, RipplePatch, RippleOptions};
///
/// let slow = custom_ripple::<u32>(RipplePatch::new().with_duration(100.0));
/// let ripple = slow.build(
///     RippleOptions::from_patch(RipplePatch::new().with_duration(200.0)),
///     ManualClock::new(),
/// );
/// assert!((ripple.config().duration - 200.0).abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn custom_ripple<N: Clone + PartialEq + Debug>(preset: RipplePatch) -> RippleFactory<N> {
    RippleFactory {
        preset: RippleOptions::from_patch(preset),
        strategy: ContainerStrategy::default(),
    }
}
