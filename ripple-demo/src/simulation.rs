//! Virtual-time ripple session.

use std::collections::HashMap;

use ripple_core::style::{FADE_DELAY_FACTOR, FADE_OPACITY_FACTOR};
use ripple_core::{
    use_ripple, Clock, Document, ManualClock, NodeId, PointerEvent, Rect, ReleaseKind,
    RippleController, RippleId, RippleOptions, RipplePhase, TouchSupport,
};
use serde::Serialize;

use crate::SimulationConfig;

/// Length of one simulated frame in milliseconds.
pub const FRAME_MS: f64 = 16.0;

/// Frames allowed after the last scripted event before giving up.
const SETTLE_FRAMES: u32 = 1000;

/// What a finished session did.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Ripples spawned.
    pub spawned: u64,
    /// Ripples removed after their fade.
    pub removed: u64,
    /// Frames run.
    pub frames: u32,
    /// Virtual milliseconds elapsed.
    pub elapsed_ms: f64,
    /// Most ripples attached at once.
    pub peak_active: usize,
    /// Final document tree as JSON, when requested.
    #[serde(skip)]
    pub tree: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum ScriptEvent {
    Press(u32),
    Release,
}

/// Drives one host through a scripted session.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    doc: Document,
    ripple: RippleController<NodeId>,
    clock: ManualClock,
    script: Vec<(f64, ScriptEvent)>,
    fade_started: HashMap<RippleId, f64>,
}

impl Simulation {
    /// Set up the document, host and controller for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the ripple options cannot be loaded.
    pub fn new(config: SimulationConfig) -> anyhow::Result<Self> {
        let patch = config.ripple_patch()?;
        let mut doc = if config.touch {
            Document::with_touch_support(TouchSupport::touch_screen())
        } else {
            Document::new()
        };
        let host = doc.add_root("button", Some(Rect::new(0.0, 0.0, config.width, config.height)));

        let clock = ManualClock::new();
        let options = RippleOptions::from_patch(patch).with_on_spawn(|ctx| {
            tracing::info!(
                "{} spawned at ({:.1}, {:.1})",
                ctx.ripple_id,
                ctx.event.client_x,
                ctx.event.client_y
            );
        });
        let ripple = use_ripple(options, clock.clone()).with_strategy(config.strategy);
        ripple.host_ref().bind(host);

        let script = build_script(&config);
        Ok(Self {
            config,
            doc,
            ripple,
            clock,
            script,
            fade_started: HashMap::new(),
        })
    }

    /// Run until every scripted event has happened and every ripple is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if ripples are still attached long after the last
    /// scripted event, or if the tree dump fails.
    pub fn run(mut self) -> anyhow::Result<SimulationReport> {
        let release_kind = if self.config.touch {
            ReleaseKind::TouchEnd
        } else {
            ReleaseKind::MouseUp
        };
        let mut script = std::mem::take(&mut self.script).into_iter().peekable();
        let mut frames = 0_u32;
        let mut idle_frames = 0_u32;
        let mut peak_active = 0;

        loop {
            let now = f64::from(frames) * FRAME_MS;
            self.clock.set(now);

            while let Some((_, event)) = script.next_if(|(at, _)| *at <= now) {
                match event {
                    ScriptEvent::Press(index) => self.press(index),
                    ScriptEvent::Release => {
                        tracing::debug!("{} at {now}ms", release_kind.event_name());
                        self.ripple.on_pointer_release(&mut self.doc, release_kind);
                    }
                }
            }

            self.ripple.tick(&mut self.doc);
            self.finish_fades(now);
            peak_active = peak_active.max(self.ripple.active_count());
            frames += 1;

            if script.peek().is_none() {
                if self.ripple.is_idle() {
                    break;
                }
                idle_frames += 1;
                if idle_frames > SETTLE_FRAMES {
                    anyhow::bail!(
                        "Session did not settle: {} ripple(s) still attached after {now}ms",
                        self.ripple.active_count()
                    );
                }
            }
        }

        let tree = if self.config.dump_tree {
            Some(self.doc.to_json()?)
        } else {
            None
        };
        let report = SimulationReport {
            spawned: self.ripple.spawned_count(),
            removed: self.ripple.removed_count(),
            frames,
            elapsed_ms: self.clock.now_ms(),
            peak_active,
            tree,
        };
        tracing::info!(
            "Session finished: {} spawned, {} removed in {} frames",
            report.spawned,
            report.removed,
            report.frames
        );
        Ok(report)
    }

    fn press(&mut self, index: u32) {
        let x = self.config.width * f64::from(index + 1) / f64::from(self.config.clicks + 1);
        let y = self.config.height / 2.0;
        let event = PointerEvent::mouse_down(x, y, 1);
        if !self.ripple.trigger(&mut self.doc, &event) {
            tracing::info!("Press {index} produced no ripple");
        }
    }

    /// Deliver `transitionend(opacity)` once a fade has had time to finish.
    fn finish_fades(&mut self, now: f64) {
        let duration = self.ripple.config().duration;
        let fade_ms = duration * (FADE_OPACITY_FACTOR + FADE_DELAY_FACTOR);

        for id in self.ripple.active_ripples() {
            if self.ripple.phase(id) != Some(RipplePhase::FadingOut) {
                continue;
            }
            let started = *self.fade_started.entry(id).or_insert(now);
            if now - started < fade_ms {
                continue;
            }
            let Some(node) = self.ripple.ripple_node(id).copied() else {
                continue;
            };
            if self.ripple.on_transition_end(&mut self.doc, &node, "opacity") {
                self.fade_started.remove(&id);
            }
        }
    }
}

/// Presses spread across the host, each followed by a release.
///
/// Releases are held for at least two frames: a release that lands before
/// the ripple's spawn frame has no subscription to fire.
fn build_script(config: &SimulationConfig) -> Vec<(f64, ScriptEvent)> {
    let hold = config.hold_ms.max(2.0 * FRAME_MS);
    let mut script: Vec<_> = (0..config.clicks)
        .flat_map(|i| {
            let at = f64::from(i) * config.interval_ms.max(0.0);
            [(at, ScriptEvent::Press(i)), (at + hold, ScriptEvent::Release)]
        })
        .collect();
    script.sort_by(|a, b| a.0.total_cmp(&b.0));
    script
}
