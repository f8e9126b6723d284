//! Frame and timer scheduling.
//!
//! Ripples need two kinds of deferral: "after the next paint" (let a style
//! commit before measuring, or before changing it again so it transitions)
//! and "after N milliseconds" (minimum grow time, automatic fade). Both are
//! plain queues here; the embedder decides when a frame happens and what time
//! it is, which keeps the lifecycle deterministic under a [`ManualClock`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Source of the current time in milliseconds.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> f64;
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to a controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    /// Jump to an absolute time.
    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Monotonic wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

struct Timer<T> {
    due: f64,
    seq: u64,
    task: T,
}

/// Queues of paint-deferred and time-deferred tasks.
pub struct FrameScheduler<T> {
    frame: Vec<T>,
    timers: Vec<Timer<T>>,
    next_seq: u64,
}

impl<T> FrameScheduler<T> {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: Vec::new(),
            timers: Vec::new(),
            next_seq: 0,
        }
    }

    /// Run `task` after the next paint.
    pub fn after_next_paint(&mut self, task: T) {
        self.frame.push(task);
    }

    /// Run `task` once `delay_ms` has passed since `now`.
    ///
    /// Negative delays count as zero.
    pub fn after_delay(&mut self, now: f64, delay_ms: f64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            due: now + delay_ms.max(0.0),
            seq,
            task,
        });
    }

    /// Take the tasks for the frame that is starting now.
    ///
    /// Anything scheduled while these run belongs to the following frame, so
    /// calling [`after_next_paint`](Self::after_next_paint) from a frame task
    /// means "after the next paint again".
    pub fn take_frame(&mut self) -> Vec<T> {
        std::mem::take(&mut self.frame)
    }

    /// Take every timer due at `now`, earliest first, FIFO among equals.
    pub fn take_due(&mut self, now: f64) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timers).into_iter().partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| t.task).collect()
    }

    /// The earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.iter().map(|t| t.due).min_by(f64::total_cmp)
    }

    /// Number of tasks waiting for a paint.
    #[must_use]
    pub fn pending_frame_tasks(&self) -> usize {
        self.frame.len()
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Check if nothing is scheduled.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.frame.is_empty() && self.timers.is_empty()
    }
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FrameScheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("frame_tasks", &self.frame.len())
            .field("timers", &self.timers.len())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}
