//! Ripple Lifecycle Integration Tests
//!
//! Drives a controller against the in-memory document through:
//! - Trigger guards (unbound, detached, disabled, non-left clicks)
//! - Host and container preparation
//! - Grow, release and fade timing
//! - Touch and automatic cancellation
//! - Manual cancellation and host teardown
//! - Removal on transition end

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use proptest::prelude::*;
use ripple_core::{
    use_ripple, CancelHandle, ContainerStrategy, Document, ManualClock, NodeId, PointerEvent,
    Rect, ReleaseKind, RippleController, RippleId, RippleOptions, RipplePatch, RipplePhase,
    Surface, TouchSupport, DEFAULT_CLASS_NAME, DEFAULT_CONTAINER_CLASS_NAME,
};

/// A bound 100x50 host at the viewport origin.
struct Fixture {
    doc: Document,
    host: NodeId,
    ripple: RippleController<NodeId>,
    clock: ManualClock,
}

impl Fixture {
    fn with_options(mut doc: Document, options: RippleOptions<NodeId>) -> Self {
        let host = doc.add_root("button", Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        let clock = ManualClock::new();
        let ripple = use_ripple(options, clock.clone());
        ripple.host_ref().bind(host);
        Self {
            doc,
            host,
            ripple,
            clock,
        }
    }

    fn new(patch: RipplePatch) -> Self {
        Self::with_options(Document::new(), RippleOptions::from_patch(patch))
    }

    fn touch(patch: RipplePatch) -> Self {
        Self::with_options(
            Document::with_touch_support(TouchSupport::touch_screen()),
            RippleOptions::from_patch(patch),
        )
    }

    /// Press, then run the spawn and grow frames.
    fn press(&mut self, x: f64, y: f64) -> RippleId {
        let before = self.ripple.spawned_count();
        assert!(self.ripple.trigger(&mut self.doc, &PointerEvent::mouse_down(x, y, 1)));
        self.ripple.on_animation_frame(&mut self.doc);
        self.ripple.on_animation_frame(&mut self.doc);
        assert_eq!(self.ripple.spawned_count(), before + 1);
        RippleId::from_raw(before)
    }

    fn node(&self, id: RippleId) -> NodeId {
        *self.ripple.ripple_node(id).expect("ripple attached")
    }

    fn style(&self, id: RippleId, property: &str) -> Option<String> {
        self.doc
            .inline_style(self.node(id), property)
            .map(str::to_string)
    }

    fn container(&self) -> Option<NodeId> {
        self.doc
            .children_with_class(self.host, DEFAULT_CONTAINER_CLASS_NAME)
            .first()
            .copied()
    }

    fn release(&mut self) {
        self.ripple
            .on_pointer_release(&mut self.doc, ReleaseKind::MouseUp);
    }

    fn finish_transition(&mut self, id: RippleId) -> bool {
        let node = self.node(id);
        self.ripple.on_animation_frame(&mut self.doc);
        self.ripple
            .on_transition_end(&mut self.doc, &node, "opacity")
    }
}

// ============================================================================
// Trigger Guards
// ============================================================================

#[test]
fn test_disabled_ripple_touches_nothing() {
    let spawned = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&spawned);
    let mut fx = Fixture::with_options(
        Document::new(),
        RippleOptions::from_patch(RipplePatch::new().with_disabled(true))
            .with_on_spawn(move |_| *counter.borrow_mut() += 1),
    );

    assert!(!fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(10.0, 10.0)));
    fx.ripple.tick(&mut fx.doc);
    fx.ripple.tick(&mut fx.doc);

    assert_eq!(fx.doc.mutation_count(), 0);
    assert_eq!(*spawned.borrow(), 0);
    assert!(fx.doc.children(fx.host).is_empty());
    assert!(fx.ripple.is_idle());
}

#[test]
fn test_unbound_host_does_nothing() {
    let mut fx = Fixture::new(RipplePatch::new());
    fx.ripple.host_ref().unbind();

    assert!(!fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(10.0, 10.0)));
    assert_eq!(fx.doc.mutation_count(), 0);
}

#[test]
fn test_detached_host_creates_nothing() {
    let mut fx = Fixture::new(RipplePatch::new());
    assert!(fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(10.0, 10.0)));
    assert!(fx.container().is_some());

    // The host goes away between the press and the spawn frame.
    fx.doc.remove(&fx.host).expect("host removed");
    assert_eq!(fx.doc.node_count(), 0);
    fx.ripple.on_animation_frame(&mut fx.doc);
    assert_eq!(fx.doc.node_count(), 0);
    assert_eq!(fx.ripple.spawned_count(), 0);

    let mutations = fx.doc.mutation_count();
    for _ in 0..10 {
        assert!(!fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(10.0, 10.0)));
        fx.ripple.tick(&mut fx.doc);
    }
    assert_eq!(fx.doc.node_count(), 0);
    assert_eq!(fx.doc.mutation_count(), mutations);
    assert!(fx.ripple.is_idle());
}

#[test]
fn test_non_left_mouse_buttons_are_ignored_by_default() {
    let mut fx = Fixture::new(RipplePatch::new());

    assert!(!fx
        .ripple
        .trigger(&mut fx.doc, &PointerEvent::mouse_down(10.0, 10.0, 3)));
    assert!(!fx
        .ripple
        .trigger(&mut fx.doc, &PointerEvent::mouse_down(10.0, 10.0, 2)));
    assert_eq!(fx.doc.mutation_count(), 0);

    assert!(fx
        .ripple
        .trigger(&mut fx.doc, &PointerEvent::mouse_down(10.0, 10.0, 1)));
}

#[test]
fn test_events_without_button_info_count_as_primary() {
    let mut fx = Fixture::new(RipplePatch::new());
    assert!(fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(10.0, 10.0)));
    assert!(fx
        .ripple
        .trigger(&mut fx.doc, &PointerEvent::touch_start(10.0, 10.0)));
}

#[test]
fn test_non_left_clicks_allowed_when_filter_disabled() {
    let mut fx = Fixture::new(RipplePatch::new().with_ignore_non_left_click(false));
    assert!(fx
        .ripple
        .trigger(&mut fx.doc, &PointerEvent::mouse_down(10.0, 10.0, 3)));
}

// ============================================================================
// Host And Container Preparation
// ============================================================================

#[test]
fn test_static_host_becomes_relative() {
    let mut fx = Fixture::new(RipplePatch::new());
    fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(10.0, 10.0));
    assert_eq!(fx.doc.inline_style(fx.host, "position"), Some("relative"));
}

#[test]
fn test_positioned_host_is_left_alone() {
    let mut fx = Fixture::new(RipplePatch::new());
    let host = fx.host;
    fx.doc.set_style(&host, "position", "absolute");

    fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(10.0, 10.0));
    assert_eq!(fx.doc.inline_style(host, "position"), Some("absolute"));
}

#[test]
fn test_container_is_created_once_and_reused() {
    let mut fx = Fixture::new(RipplePatch::new());
    let first = fx.press(10.0, 10.0);
    let second = fx.press(60.0, 40.0);

    let containers = fx
        .doc
        .children_with_class(fx.host, DEFAULT_CONTAINER_CLASS_NAME);
    assert_eq!(containers.len(), 1);
    let container = containers[0];
    assert_eq!(fx.doc.inline_style(container, "overflow"), Some("hidden"));
    assert_eq!(fx.doc.inline_style(container, "pointer-events"), Some("none"));
    assert_eq!(fx.doc.inline_style(container, "border-radius"), Some("inherit"));
    assert_eq!(
        fx.doc.children(container),
        &[fx.node(first), fx.node(second)]
    );
}

#[test]
fn test_custom_class_names_are_used() {
    let mut fx = Fixture::new(
        RipplePatch::new()
            .with_class_name("ink")
            .with_container_class_name("ink-layer"),
    );
    let id = fx.press(10.0, 10.0);

    let layers = fx.doc.children_with_class(fx.host, "ink-layer");
    assert_eq!(layers.len(), 1);
    assert!(fx.doc.get(fx.node(id)).is_some_and(|n| n.has_class("ink")));
    assert!(fx.container().is_none());
}

#[test]
fn test_host_clip_strategy_appends_to_host() {
    let mut fx = Fixture::new(RipplePatch::new());
    fx.ripple.set_strategy(ContainerStrategy::HostClip);
    let id = fx.press(10.0, 10.0);

    assert_eq!(fx.doc.inline_style(fx.host, "overflow"), Some("hidden"));
    assert!(fx.container().is_none());
    assert_eq!(fx.doc.children(fx.host), &[fx.node(id)]);
}

// ============================================================================
// Geometry And Styles
// ============================================================================

#[test]
fn test_ripple_is_sized_and_placed_under_pointer() {
    let mut fx = Fixture::new(RipplePatch::new().with_color("red"));
    let id = fx.press(80.0, 10.0);

    let size = fx.style(id, "width").expect("width set");
    let size: f64 = size.trim_end_matches("px").parse().expect("px value");
    assert!((size - 178.885).abs() < 1e-3);
    assert_eq!(fx.style(id, "height"), fx.style(id, "width"));
    assert_eq!(fx.style(id, "top").as_deref(), Some("10px"));
    assert_eq!(fx.style(id, "left").as_deref(), Some("80px"));
    assert_eq!(fx.style(id, "background").as_deref(), Some("red"));
    assert_eq!(fx.style(id, "border-radius").as_deref(), Some("50%"));
}

#[test]
fn test_entrance_then_grow_styles() {
    let mut fx = Fixture::new(RipplePatch::new());
    assert!(fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(10.0, 10.0)));
    fx.ripple.on_animation_frame(&mut fx.doc);
    let id = RippleId::from_raw(0);

    assert_eq!(
        fx.style(id, "transform").as_deref(),
        Some("translate(-50%, -50%) scale(0)")
    );
    assert_eq!(fx.style(id, "opacity").as_deref(), Some("0.6"));
    assert_eq!(
        fx.style(id, "transition").as_deref(),
        Some("transform 270ms cubic-bezier(.42,.36,.28,.88), opacity 140ms ease-out")
    );

    fx.ripple.on_animation_frame(&mut fx.doc);
    assert_eq!(
        fx.style(id, "transform").as_deref(),
        Some("translate(-50%, -50%) scale(1)")
    );
}

#[test]
fn test_custom_timing_function_drives_the_grow() {
    let mut fx = Fixture::new(RipplePatch::new().with_timing_function("linear"));
    let id = fx.press(10.0, 10.0);
    assert_eq!(
        fx.style(id, "transition").as_deref(),
        Some("transform 270ms linear, opacity 140ms ease-out")
    );
}

#[test]
fn test_host_is_measured_in_the_spawn_frame() {
    let mut fx = Fixture::new(RipplePatch::new());
    assert!(fx
        .ripple
        .trigger(&mut fx.doc, &PointerEvent::mouse_down(50.0, 40.0, 1)));
    fx.doc
        .set_bounds(fx.host, Rect::new(20.0, 30.0, 200.0, 100.0))
        .expect("host bounds");
    fx.ripple.on_animation_frame(&mut fx.doc);
    let id = RippleId::from_raw(0);

    let size = fx.style(id, "width").expect("width set");
    let size: f64 = size.trim_end_matches("px").parse().expect("px value");
    assert!((size - 393.954).abs() < 1e-3);
    assert_eq!(fx.style(id, "top").as_deref(), Some("20px"));
    assert_eq!(fx.style(id, "left").as_deref(), Some("20px"));
}

#[test]
fn test_host_without_layout_box_still_spawns() {
    let mut doc = Document::new();
    let host = doc.add_root("span", None);
    let mut ripple = use_ripple(RippleOptions::new(), ManualClock::new());
    ripple.host_ref().bind(host);

    assert!(ripple.trigger(&mut doc, &PointerEvent::at(3.0, 4.0)));
    ripple.on_animation_frame(&mut doc);
    let node = *ripple.ripple_node(RippleId::from_raw(0)).expect("spawned");
    assert_eq!(doc.inline_style(node, "width"), Some("10px"));
}

// ============================================================================
// Release Timing
// ============================================================================

#[test]
fn test_release_after_minimum_grow_fades_immediately() {
    let mut fx = Fixture::new(RipplePatch::new());
    let id = fx.press(10.0, 10.0);

    fx.clock.advance(200.0);
    fx.release();

    assert_eq!(fx.style(id, "opacity").as_deref(), Some("0"));
    assert_eq!(
        fx.style(id, "transition").as_deref(),
        Some("transform 270ms cubic-bezier(.42,.36,.28,.88), opacity 292.5ms ease-in-out 58.5ms")
    );
}

#[test]
fn test_release_before_minimum_grow_is_deferred() {
    let mut fx = Fixture::new(RipplePatch::new());
    let id = fx.press(10.0, 10.0);

    fx.clock.advance(50.0);
    fx.release();
    assert_eq!(fx.style(id, "opacity").as_deref(), Some("0.6"));

    fx.clock.advance(129.0);
    fx.ripple.on_timers(&mut fx.doc);
    assert_eq!(fx.style(id, "opacity").as_deref(), Some("0.6"));

    fx.clock.advance(1.0);
    fx.ripple.on_timers(&mut fx.doc);
    assert_eq!(fx.style(id, "opacity").as_deref(), Some("0"));
}

#[test]
fn test_one_release_ends_every_held_ripple() {
    let mut fx = Fixture::new(RipplePatch::new());
    let a = fx.press(10.0, 10.0);
    let b = fx.press(20.0, 20.0);
    assert_eq!(fx.ripple.release_subscriptions(), 2);

    fx.clock.advance(500.0);
    fx.ripple
        .on_pointer_release(&mut fx.doc, ReleaseKind::TouchEnd);

    assert_eq!(fx.ripple.phase(a), Some(RipplePhase::FadingOut));
    assert_eq!(fx.ripple.phase(b), Some(RipplePhase::FadingOut));
    assert_eq!(fx.ripple.release_subscriptions(), 0);
}

#[test]
fn test_release_only_affects_already_spawned_ripples() {
    let mut fx = Fixture::new(RipplePatch::new());
    let early = fx.press(10.0, 10.0);
    fx.clock.advance(500.0);

    fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(30.0, 30.0));
    fx.release();
    fx.ripple.on_animation_frame(&mut fx.doc);
    let late = RippleId::from_raw(1);

    assert_eq!(fx.ripple.phase(early), Some(RipplePhase::FadingOut));
    assert_eq!(fx.ripple.phase(late), Some(RipplePhase::Created));
    assert_eq!(fx.ripple.release_subscriptions(), 1);
}

// ============================================================================
// Automatic And Touch Cancellation
// ============================================================================

#[test]
fn test_cancel_automatically_fades_without_release() {
    let mut fx = Fixture::new(RipplePatch::new().with_cancel_automatically(true));
    let id = fx.press(10.0, 10.0);

    assert_eq!(fx.ripple.release_subscriptions(), 0);
    assert_eq!(fx.ripple.next_deadline(), Some(180.0));

    fx.clock.advance(180.0);
    fx.ripple.on_timers(&mut fx.doc);
    assert_eq!(fx.ripple.phase(id), Some(RipplePhase::FadingOut));
}

#[test]
fn test_touch_devices_never_wait_for_release() {
    let mut fx = Fixture::touch(RipplePatch::new().with_cancel_automatically(false));
    let id = fx.press(10.0, 10.0);

    assert_eq!(fx.ripple.release_subscriptions(), 0);
    fx.clock.advance(180.0);
    fx.ripple.tick(&mut fx.doc);
    assert_eq!(fx.ripple.phase(id), Some(RipplePhase::FadingOut));
    assert!(fx.finish_transition(id));
    assert_eq!(fx.ripple.active_count(), 0);
}

#[test]
fn test_release_does_not_double_fade_auto_ripples() {
    let mut fx = Fixture::new(RipplePatch::new().with_cancel_automatically(true));
    let id = fx.press(10.0, 10.0);

    fx.clock.advance(300.0);
    fx.release();
    fx.ripple.on_timers(&mut fx.doc);
    assert!(fx.finish_transition(id));
    assert!(fx.ripple.is_idle());
    assert_eq!(fx.ripple.removed_count(), 1);
}

// ============================================================================
// Manual Cancellation And Teardown
// ============================================================================

#[test]
fn test_on_spawn_receives_context_and_can_cancel() {
    let handles: Rc<RefCell<Vec<CancelHandle>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&handles);
    let mut fx = Fixture::with_options(
        Document::new(),
        RippleOptions::new().with_on_spawn(move |ctx| {
            assert_eq!(ctx.host_ref.get(), Some(ctx.host));
            assert!((ctx.event.client_x - 10.0).abs() < f64::EPSILON);
            sink.borrow_mut().push(ctx.cancel.clone());
        }),
    );
    let id = fx.press(10.0, 10.0);
    assert_eq!(handles.borrow().len(), 1);
    assert_eq!(handles.borrow()[0].ripple(), id);

    fx.clock.advance(400.0);
    handles.borrow()[0].cancel();
    fx.ripple.on_timers(&mut fx.doc);

    assert_eq!(fx.ripple.phase(id), Some(RipplePhase::FadingOut));
    assert_eq!(fx.ripple.release_subscriptions(), 0);
}

#[test]
fn test_cancel_from_on_spawn_still_honours_minimum_grow() {
    let mut fx = Fixture::with_options(
        Document::new(),
        RippleOptions::new().with_on_spawn(|ctx| ctx.cancel.cancel()),
    );
    let id = fx.press(10.0, 10.0);

    assert_eq!(fx.ripple.release_subscriptions(), 0);
    assert_eq!(fx.ripple.phase(id), Some(RipplePhase::Growing));
    assert_eq!(fx.ripple.next_deadline(), Some(180.0));

    fx.clock.advance(180.0);
    fx.ripple.on_timers(&mut fx.doc);
    assert_eq!(fx.ripple.phase(id), Some(RipplePhase::FadingOut));
}

#[test]
fn test_teardown_drops_subscriptions_and_fades_held_ripples() {
    let mut fx = Fixture::new(RipplePatch::new());
    let a = fx.press(10.0, 10.0);
    let b = fx.press(20.0, 20.0);
    fx.clock.advance(300.0);

    fx.ripple.teardown(&mut fx.doc);
    assert_eq!(fx.ripple.release_subscriptions(), 0);
    assert_eq!(fx.ripple.phase(a), Some(RipplePhase::FadingOut));
    assert_eq!(fx.ripple.phase(b), Some(RipplePhase::FadingOut));

    fx.release();
    let node_b = fx.node(b);
    assert!(fx.finish_transition(a));
    assert!(fx.ripple.on_transition_end(&mut fx.doc, &node_b, "opacity"));
    assert_eq!(fx.ripple.removed_count(), 2);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn test_transition_end_before_fade_paint_is_ignored() {
    let mut fx = Fixture::new(RipplePatch::new());
    let id = fx.press(10.0, 10.0);
    let node = fx.node(id);

    assert!(!fx.ripple.on_transition_end(&mut fx.doc, &node, "opacity"));

    fx.clock.advance(500.0);
    fx.release();
    // Fade styles are set but not yet painted.
    assert!(!fx.ripple.on_transition_end(&mut fx.doc, &node, "opacity"));
    assert!(fx.doc.contains(node));
}

#[test]
fn test_only_the_opacity_transition_removes() {
    let mut fx = Fixture::new(RipplePatch::new());
    let id = fx.press(10.0, 10.0);
    let node = fx.node(id);
    let container = fx.container().expect("container");

    fx.clock.advance(500.0);
    fx.release();
    fx.ripple.on_animation_frame(&mut fx.doc);

    assert!(!fx.ripple.on_transition_end(&mut fx.doc, &node, "transform"));
    assert!(fx.doc.contains(node));

    assert!(fx.ripple.on_transition_end(&mut fx.doc, &node, "opacity"));
    assert!(!fx.doc.contains(node));
    assert!(fx.doc.children(container).is_empty());
    assert!(!fx.ripple.on_transition_end(&mut fx.doc, &node, "opacity"));
    assert_eq!(fx.ripple.removed_count(), 1);
    assert_eq!(fx.ripple.phase(id), Some(RipplePhase::Removed));
}

#[test]
fn test_container_survives_its_ripples() {
    let mut fx = Fixture::new(RipplePatch::new());
    let id = fx.press(10.0, 10.0);
    fx.clock.advance(500.0);
    fx.release();
    assert!(fx.finish_transition(id));

    let container = fx.container().expect("container kept");
    fx.press(10.0, 10.0);
    assert_eq!(fx.container(), Some(container));
}

#[test]
fn test_ripple_class_constant_matches_spawned_nodes() {
    let mut fx = Fixture::new(RipplePatch::new());
    let id = fx.press(10.0, 10.0);
    let container = fx.container().expect("container");
    assert_eq!(
        fx.doc.children_with_class(container, DEFAULT_CLASS_NAME),
        vec![fx.node(id)]
    );
}

// ============================================================================
// Single Removal Under Arbitrary Interleavings
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Press(f64, f64),
    Frame,
    Timers,
    Advance(f64),
    Release,
    Cancel(u64),
    TransitionEnd,
    Teardown,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0.0..100.0_f64, 0.0..50.0_f64).prop_map(|(x, y)| Step::Press(x, y)),
        3 => Just(Step::Frame),
        2 => Just(Step::Timers),
        3 => (0.0..400.0_f64).prop_map(Step::Advance),
        2 => Just(Step::Release),
        1 => (0..8_u64).prop_map(Step::Cancel),
        2 => Just(Step::TransitionEnd),
        1 => Just(Step::Teardown),
    ]
}

fn end_all_transitions(fx: &mut Fixture, removed: &mut HashSet<NodeId>) {
    for id in fx.ripple.active_ripples() {
        let node = fx.node(id);
        if fx.ripple.on_transition_end(&mut fx.doc, &node, "opacity") {
            assert!(removed.insert(node), "{id} removed twice");
        }
    }
}

proptest! {
    #[test]
    fn prop_every_ripple_is_removed_exactly_once(
        auto in any::<bool>(),
        steps in prop::collection::vec(arb_step(), 0..60),
    ) {
        let mut fx = Fixture::new(RipplePatch::new().with_cancel_automatically(auto));
        let mut removed = HashSet::new();

        for step in steps {
            match step {
                Step::Press(x, y) => {
                    fx.ripple.trigger(&mut fx.doc, &PointerEvent::at(x, y));
                }
                Step::Frame => fx.ripple.on_animation_frame(&mut fx.doc),
                Step::Timers => fx.ripple.on_timers(&mut fx.doc),
                Step::Advance(ms) => fx.clock.advance(ms),
                Step::Release => fx.release(),
                Step::Cancel(raw) => fx.ripple.cancel(&mut fx.doc, RippleId::from_raw(raw)),
                Step::TransitionEnd => end_all_transitions(&mut fx, &mut removed),
                Step::Teardown => fx.ripple.teardown(&mut fx.doc),
            }
            let spawned = fx.ripple.spawned_count();
            prop_assert_eq!(fx.ripple.removed_count(), removed.len() as u64);
            prop_assert_eq!(fx.ripple.active_count() as u64 + fx.ripple.removed_count(), spawned);
        }

        // Settle: let everything spawn, release, fade and finish.
        for _ in 0..4 {
            fx.clock.advance(1000.0);
            fx.ripple.tick(&mut fx.doc);
            fx.release();
            fx.ripple.tick(&mut fx.doc);
            end_all_transitions(&mut fx, &mut removed);
        }

        prop_assert_eq!(fx.ripple.active_count(), 0);
        prop_assert_eq!(fx.ripple.removed_count(), fx.ripple.spawned_count());
        prop_assert!(fx.ripple.is_idle());
        let container_empty = fx.container().map_or(true, |c| fx.doc.children(c).is_empty());
        prop_assert!(container_empty);
    }
}
