//! The ripple lifecycle controller.
//!
//! One [`RippleController`] serves one host. Each [`trigger`] spawns an
//! independent ripple that moves through
//!
//! ```text
//! Created ─▶ Growing ─▶ WaitingForRelease ─┐
//!                  └──▶ AutoScheduled ─────┴─▶ FadingOut ─▶ Removed
//! ```
//!
//! Nothing here blocks. Work is queued on a [`FrameScheduler`] and runs when
//! the embedder reports a frame ([`on_animation_frame`]), timer expiry
//! ([`on_timers`]), a document-level release ([`on_pointer_release`]) or a
//! finished CSS transition ([`on_transition_end`]).
//!
//! [`trigger`]: RippleController::trigger
//! [`on_animation_frame`]: RippleController::on_animation_frame
//! [`on_timers`]: RippleController::on_timers
//! [`on_pointer_release`]: RippleController::on_pointer_release
//! [`on_transition_end`]: RippleController::on_transition_end

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::{position_at_pointer, ripple_size};
use crate::options::{OnSpawn, RippleConfig, RippleOptions};
use crate::scheduler::{Clock, FrameScheduler};
use crate::style::{
    apply_styles, container_styles, entrance_styles, fade_out_styles, grow_styles,
    host_position_styles, legacy_host_clip_styles, TRANSFORM_FACTOR,
};
use crate::subscription::{ReleaseRegistry, SubscriptionId};
use crate::{PointerEvent, ReleaseKind, Surface};

/// Share of the duration that must pass before a ripple may start fading.
pub const COMPLETED_FACTOR: f64 = 0.4;

/// Transition property whose end removes a fading ripple.
const OPACITY: &str = "opacity";

/// Identifier of one spawned ripple, unique per controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RippleId(u64);

impl RippleId {
    /// Wrap a raw counter value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RippleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ripple-{}", self.0)
    }
}

/// Shared, rebindable handle to a host element.
///
/// The UI layer binds it once the host exists; the controller reads it on
/// every trigger and silently does nothing while it is unbound.
pub struct HostRef<N>(Rc<RefCell<Option<N>>>);

impl<N> HostRef<N> {
    /// Create an unbound reference.
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Create a reference already bound to `node`.
    #[must_use]
    pub fn bound(node: N) -> Self {
        Self(Rc::new(RefCell::new(Some(node))))
    }

    /// Point the reference at `node`.
    pub fn bind(&self, node: N) {
        *self.0.borrow_mut() = Some(node);
    }

    /// Clear the reference, returning the previous node.
    pub fn unbind(&self) -> Option<N> {
        self.0.borrow_mut().take()
    }

    /// Check whether a host is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.0.borrow().is_some()
    }
}

impl<N: Clone> HostRef<N> {
    /// The bound host, if any.
    #[must_use]
    pub fn get(&self) -> Option<N> {
        self.0.borrow().clone()
    }
}

impl<N> Clone for HostRef<N> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<N> Default for HostRef<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Debug> Debug for HostRef<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostRef").field(&self.0.borrow()).finish()
    }
}

/// Requests cancellation of one ripple from outside the controller.
///
/// The request is queued and handled at the controller's next entry point,
/// following the same minimum-grow rule as a pointer release.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    ripple: RippleId,
    queue: Rc<RefCell<Vec<RippleId>>>,
}

impl CancelHandle {
    /// Queue the cancellation.
    pub fn cancel(&self) {
        self.queue.borrow_mut().push(self.ripple);
    }

    /// The ripple this handle cancels.
    #[must_use]
    pub fn ripple(&self) -> RippleId {
        self.ripple
    }
}

/// Everything the spawn hook gets to see.
#[derive(Debug, Clone)]
pub struct SpawnContext<N> {
    /// The ripple element.
    pub ripple: N,
    /// The ripple's identifier.
    pub ripple_id: RippleId,
    /// Cancels this ripple.
    pub cancel: CancelHandle,
    /// The host reference the controller reads.
    pub host_ref: HostRef<N>,
    /// The host the ripple was spawned on.
    pub host: N,
    /// The triggering event.
    pub event: PointerEvent,
    /// The element the ripple was appended to.
    pub container: N,
}

/// Where a ripple stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RipplePhase {
    /// Entrance styles applied, scale transition not yet started.
    Created,
    /// Scale transition in progress.
    Growing,
    /// Grown; fades on the next pointer release.
    WaitingForRelease,
    /// A fade-out timer is armed.
    AutoScheduled,
    /// Fade-out transition running.
    FadingOut,
    /// Detached from the tree.
    Removed,
}

/// How ripples are isolated from the host's own content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStrategy {
    /// A reusable clipping layer appended to the host.
    #[default]
    Container,
    /// `overflow: hidden` on the host itself, ripples appended to the host.
    ///
    /// Superseded by [`Container`](Self::Container): it changes how the host
    /// clips its own content.
    HostClip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CancelPolicy {
    OnRelease,
    Timer,
}

#[derive(Debug)]
enum Task<N> {
    Spawn {
        event: PointerEvent,
        host: N,
        container: N,
    },
    Grow(RippleId),
    FadeOut(RippleId),
    ArmRemoval(RippleId),
}

#[derive(Debug)]
struct RippleInstance<N> {
    node: N,
    started_at: f64,
    grown_at: Option<f64>,
    policy: CancelPolicy,
    subscription: Option<SubscriptionId>,
    fade_scheduled: bool,
    fading: bool,
    removal_armed: bool,
}

/// Spawns, animates and removes the ripples of one host.
pub struct RippleController<N> {
    config: RippleConfig,
    on_spawn: Option<OnSpawn<N>>,
    host_ref: HostRef<N>,
    strategy: ContainerStrategy,
    clock: Box<dyn Clock>,
    scheduler: FrameScheduler<Task<N>>,
    releases: ReleaseRegistry,
    ripples: BTreeMap<RippleId, RippleInstance<N>>,
    cancel_requests: Rc<RefCell<Vec<RippleId>>>,
    next_id: u64,
    removed: u64,
}

impl<N: Clone + PartialEq + Debug> RippleController<N> {
    /// Create a controller from options, resolving defaults.
    ///
    /// Uses the options' host reference when one is supplied, otherwise an
    /// internal unbound one (see [`host_ref`](Self::host_ref)).
    pub fn new(options: RippleOptions<N>, clock: impl Clock + 'static) -> Self {
        Self {
            config: options.patch.resolve(),
            on_spawn: options.on_spawn,
            host_ref: options.host_ref.unwrap_or_default(),
            strategy: ContainerStrategy::default(),
            clock: Box::new(clock),
            scheduler: FrameScheduler::new(),
            releases: ReleaseRegistry::new(),
            ripples: BTreeMap::new(),
            cancel_requests: Rc::new(RefCell::new(Vec::new())),
            next_id: 0,
            removed: 0,
        }
    }

    /// Choose the container strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ContainerStrategy) -> Self {
        self.set_strategy(strategy);
        self
    }

    /// Change the container strategy for ripples triggered from now on.
    pub fn set_strategy(&mut self, strategy: ContainerStrategy) {
        self.strategy = strategy;
    }

    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &RippleConfig {
        &self.config
    }

    /// The host reference to bind the host element to.
    #[must_use]
    pub fn host_ref(&self) -> &HostRef<N> {
        &self.host_ref
    }

    /// The active container strategy.
    #[must_use]
    pub fn strategy(&self) -> ContainerStrategy {
        self.strategy
    }

    /// Spawn a ripple for a press on the host.
    ///
    /// Returns `false` without touching the surface when the host is unbound
    /// or no longer in the tree, the ripple is disabled, or the event is a
    /// filtered non-primary click.
    /// Otherwise prepares the host and container now and defers the ripple
    /// itself to the next frame, so measurement sees the committed styles.
    pub fn trigger<S: Surface<Node = N>>(&mut self, surface: &mut S, event: &PointerEvent) -> bool {
        self.drain_cancel_requests(surface);

        let Some(host) = self.host_ref.get() else {
            tracing::trace!("Ripple trigger ignored: host not bound");
            return false;
        };
        if self.config.disabled {
            tracing::trace!("Ripple trigger ignored: disabled");
            return false;
        }
        if self.config.ignore_non_left_click && event.is_secondary_mouse_down() {
            tracing::trace!("Ripple trigger ignored: non-primary button");
            return false;
        }
        if !surface.is_connected(&host) {
            tracing::trace!("Ripple trigger ignored: host detached");
            return false;
        }

        if surface.computed_style(&host, "position").as_deref() == Some("static") {
            apply_styles(surface, Some(&host), &host_position_styles());
        }

        let Some(container) = self.resolve_container(surface, &host) else {
            return false;
        };

        self.scheduler.after_next_paint(Task::Spawn {
            event: event.clone(),
            host,
            container,
        });
        true
    }

    /// Run everything that was waiting for this frame.
    pub fn on_animation_frame<S: Surface<Node = N>>(&mut self, surface: &mut S) {
        self.drain_cancel_requests(surface);
        for task in self.scheduler.take_frame() {
            self.run(surface, task);
        }
    }

    /// Run every timer that is due.
    pub fn on_timers<S: Surface<Node = N>>(&mut self, surface: &mut S) {
        self.drain_cancel_requests(surface);
        let now = self.clock.now_ms();
        for task in self.scheduler.take_due(now) {
            self.run(surface, task);
        }
    }

    /// Run due timers, then one frame.
    pub fn tick<S: Surface<Node = N>>(&mut self, surface: &mut S) {
        self.on_timers(surface);
        self.on_animation_frame(surface);
    }

    /// A `mouseup`/`touchend` reached the document.
    ///
    /// Every ripple waiting for a release starts its fade: immediately if it
    /// has grown for at least [`COMPLETED_FACTOR`] of the duration, otherwise
    /// once it has.
    pub fn on_pointer_release<S: Surface<Node = N>>(&mut self, surface: &mut S, kind: ReleaseKind) {
        self.drain_cancel_requests(surface);
        let fired = self.releases.fire();
        if !fired.is_empty() {
            tracing::debug!("{} released {} ripple(s)", kind.event_name(), fired.len());
        }
        for id in fired {
            if let Some(instance) = self.ripples.get_mut(&id) {
                instance.subscription = None;
            }
            self.schedule_fade(surface, id);
        }
    }

    /// A CSS transition on `node` finished.
    ///
    /// Removes the ripple once its fade-out opacity transition has ended.
    /// Returns `true` if a ripple was removed.
    pub fn on_transition_end<S: Surface<Node = N>>(
        &mut self,
        surface: &mut S,
        node: &N,
        property: &str,
    ) -> bool {
        self.drain_cancel_requests(surface);
        if property != OPACITY {
            return false;
        }
        let Some(id) = self
            .ripples
            .iter()
            .find(|(_, r)| r.removal_armed && r.node == *node)
            .map(|(id, _)| *id)
        else {
            return false;
        };
        let Some(instance) = self.ripples.remove(&id) else {
            return false;
        };
        if let Err(e) = surface.remove(&instance.node) {
            tracing::warn!("Failed to detach {id}: {e}");
        }
        self.removed += 1;
        tracing::debug!("Ripple {id} removed");
        true
    }

    /// Cancel one ripple, as if its release had arrived now.
    ///
    /// No-op if the ripple is already scheduled to fade, fading, or gone.
    pub fn cancel<S: Surface<Node = N>>(&mut self, surface: &mut S, id: RippleId) {
        if let Some(sub) = self.ripples.get_mut(&id).and_then(|r| r.subscription.take()) {
            self.releases.unsubscribe(sub);
        }
        self.schedule_fade(surface, id);
    }

    /// The host is going away: drop every release subscription and let the
    /// ripples that were waiting on one fade out.
    pub fn teardown<S: Surface<Node = N>>(&mut self, surface: &mut S) {
        self.drain_cancel_requests(surface);
        let waiting = self.releases.clear();
        tracing::debug!("Host teardown, {} release subscription(s) dropped", waiting.len());
        for id in waiting {
            if let Some(instance) = self.ripples.get_mut(&id) {
                instance.subscription = None;
            }
            self.schedule_fade(surface, id);
        }
    }

    /// Where a ripple stands, or `None` for an ID this controller never issued.
    #[must_use]
    pub fn phase(&self, id: RippleId) -> Option<RipplePhase> {
        let Some(instance) = self.ripples.get(&id) else {
            return (id.0 < self.next_id).then_some(RipplePhase::Removed);
        };
        let now = self.clock.now_ms();
        let phase = if instance.fading {
            RipplePhase::FadingOut
        } else if let Some(grown_at) = instance.grown_at {
            if now - grown_at < self.config.duration * TRANSFORM_FACTOR {
                RipplePhase::Growing
            } else if instance.fade_scheduled {
                RipplePhase::AutoScheduled
            } else {
                RipplePhase::WaitingForRelease
            }
        } else {
            RipplePhase::Created
        };
        Some(phase)
    }

    /// The element of a live ripple.
    #[must_use]
    pub fn ripple_node(&self, id: RippleId) -> Option<&N> {
        self.ripples.get(&id).map(|r| &r.node)
    }

    /// IDs of every ripple still attached, oldest first.
    #[must_use]
    pub fn active_ripples(&self) -> Vec<RippleId> {
        self.ripples.keys().copied().collect()
    }

    /// Number of ripples still attached.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.ripples.len()
    }

    /// Number of ripples spawned so far.
    #[must_use]
    pub fn spawned_count(&self) -> u64 {
        self.next_id
    }

    /// Number of ripples removed so far.
    #[must_use]
    pub fn removed_count(&self) -> u64 {
        self.removed
    }

    /// Number of ripples waiting for a release.
    #[must_use]
    pub fn release_subscriptions(&self) -> usize {
        self.releases.len()
    }

    /// The earliest armed timer, for embedders that sleep between events.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.scheduler.next_deadline()
    }

    /// Check if there is nothing left to animate or wait for.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.ripples.is_empty() && self.scheduler.is_idle()
    }

    fn resolve_container<S: Surface<Node = N>>(&mut self, surface: &mut S, host: &N) -> Option<N> {
        if self.strategy == ContainerStrategy::HostClip {
            return apply_styles(surface, Some(host), &legacy_host_clip_styles());
        }
        if let Some(existing) = surface.find_child_with_class(host, &self.config.container_class_name)
        {
            return Some(existing);
        }

        let container = match surface.create_element("div") {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!("Failed to create ripple container: {e}");
                return None;
            }
        };
        surface.add_class(&container, &self.config.container_class_name);
        apply_styles(surface, Some(&container), &container_styles());
        if let Err(e) = surface.append_child(host, &container) {
            tracing::warn!("Failed to attach ripple container: {e}");
            surface.discard(&container);
            return None;
        }
        tracing::debug!("Ripple container created for {host:?}");
        Some(container)
    }

    fn run<S: Surface<Node = N>>(&mut self, surface: &mut S, task: Task<N>) {
        match task {
            Task::Spawn {
                event,
                host,
                container,
            } => self.spawn(surface, &event, host, container),
            Task::Grow(id) => {
                let now = self.clock.now_ms();
                if let Some(instance) = self.ripples.get_mut(&id) {
                    apply_styles(surface, Some(&instance.node), &grow_styles());
                    instance.grown_at = Some(now);
                    tracing::debug!("Ripple {id} growing");
                }
            }
            Task::FadeOut(id) => self.fade_out(surface, id),
            Task::ArmRemoval(id) => {
                if let Some(instance) = self.ripples.get_mut(&id) {
                    instance.removal_armed = true;
                }
            }
        }
    }

    fn spawn<S: Surface<Node = N>>(
        &mut self,
        surface: &mut S,
        event: &PointerEvent,
        host: N,
        container: N,
    ) {
        if !surface.is_connected(&container) {
            tracing::debug!("Ripple dropped: container detached before the spawn frame");
            return;
        }
        let started_at = self.clock.now_ms();
        let bounds = surface.bounding_rect(&host).unwrap_or_default();
        let size = ripple_size(event, &bounds);

        let node = match surface.create_element("div") {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!("Failed to create ripple element: {e}");
                return;
            }
        };
        surface.add_class(&node, &self.config.class_name);
        apply_styles(surface, Some(&node), &entrance_styles(&self.config, size));
        position_at_pointer(surface, event, &bounds, Some(&node));

        if let Err(e) = surface.append_child(&container, &node) {
            tracing::warn!("Failed to attach ripple: {e}");
            surface.discard(&node);
            return;
        }

        let id = RippleId(self.next_id);
        self.next_id += 1;
        self.scheduler.after_next_paint(Task::Grow(id));

        let touch = surface.touch_support().is_touch_device();
        let policy = if self.config.cancel_automatically || touch {
            CancelPolicy::Timer
        } else {
            CancelPolicy::OnRelease
        };
        let subscription = match policy {
            CancelPolicy::OnRelease => Some(self.releases.subscribe(id)),
            CancelPolicy::Timer => {
                self.scheduler.after_delay(
                    started_at,
                    self.config.duration * COMPLETED_FACTOR,
                    Task::FadeOut(id),
                );
                None
            }
        };

        self.ripples.insert(
            id,
            RippleInstance {
                node: node.clone(),
                started_at,
                grown_at: None,
                policy,
                subscription,
                fade_scheduled: policy == CancelPolicy::Timer,
                fading: false,
                removal_armed: false,
            },
        );
        tracing::debug!("Ripple {id} spawned ({size:.1}px, {policy:?}, touch: {touch})");

        if let Some(on_spawn) = self.on_spawn.clone() {
            on_spawn(&SpawnContext {
                ripple: node,
                ripple_id: id,
                cancel: CancelHandle {
                    ripple: id,
                    queue: Rc::clone(&self.cancel_requests),
                },
                host_ref: self.host_ref.clone(),
                host,
                event: event.clone(),
                container,
            });
            self.drain_cancel_requests(surface);
        }
    }

    /// Arm the fade of a ripple that is not yet scheduled to fade.
    fn schedule_fade<S: Surface<Node = N>>(&mut self, surface: &mut S, id: RippleId) {
        let now = self.clock.now_ms();
        let threshold = self.config.duration * COMPLETED_FACTOR;
        let Some(instance) = self.ripples.get_mut(&id) else {
            return;
        };
        if instance.fade_scheduled || instance.fading {
            return;
        }
        instance.fade_scheduled = true;
        let elapsed = now - instance.started_at;
        let policy = instance.policy;

        if elapsed >= threshold {
            self.fade_out(surface, id);
        } else {
            tracing::debug!(
                "Ripple {id} fade deferred {:.1}ms ({policy:?} policy)",
                threshold - elapsed
            );
            self.scheduler
                .after_delay(now, threshold - elapsed, Task::FadeOut(id));
        }
    }

    fn fade_out<S: Surface<Node = N>>(&mut self, surface: &mut S, id: RippleId) {
        let Some(instance) = self.ripples.get_mut(&id) else {
            return;
        };
        if instance.fading {
            return;
        }
        instance.fading = true;
        instance.fade_scheduled = true;
        if let Some(sub) = instance.subscription.take() {
            self.releases.unsubscribe(sub);
        }
        apply_styles(surface, Some(&instance.node), &fade_out_styles(&self.config));
        self.scheduler.after_next_paint(Task::ArmRemoval(id));
        tracing::debug!("Ripple {id} fading out");
    }

    fn drain_cancel_requests<S: Surface<Node = N>>(&mut self, surface: &mut S) {
        let requests = std::mem::take(&mut *self.cancel_requests.borrow_mut());
        for id in requests {
            self.cancel(surface, id);
        }
    }
}

impl<N: Debug> Debug for RippleController<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RippleController")
            .field("config", &self.config)
            .field("host_ref", &self.host_ref)
            .field("strategy", &self.strategy)
            .field("scheduler", &self.scheduler)
            .field("releases", &self.releases)
            .field("active", &self.ripples.len())
            .field("spawned", &self.next_id)
            .field("removed", &self.removed)
            .finish_non_exhaustive()
    }
}
