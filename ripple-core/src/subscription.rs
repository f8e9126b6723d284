//! Per-host release subscriptions.
//!
//! A ripple that waits for the pointer release holds exactly one entry here.
//! Firing drains the registry, so every subscription fires at most once, and
//! [`ReleaseRegistry::clear`] drops whatever is left when the host goes away.

use serde::{Deserialize, Serialize};

use crate::ripple::RippleId;

/// Handle to one release subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Release subscriptions of one host, in registration order.
#[derive(Debug, Default)]
pub struct ReleaseRegistry {
    entries: Vec<(SubscriptionId, RippleId)>,
    next_id: u64,
}

impl ReleaseRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a ripple to the next release.
    pub fn subscribe(&mut self, ripple: RippleId) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, ripple));
        id
    }

    /// Drop a subscription. Returns `false` if it had already fired.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sub, _)| *sub != id);
        self.entries.len() != before
    }

    /// Fire every subscription, emptying the registry.
    pub fn fire(&mut self) -> Vec<RippleId> {
        self.entries.drain(..).map(|(_, ripple)| ripple).collect()
    }

    /// Drop every subscription without firing. Returns the affected ripples.
    pub fn clear(&mut self) -> Vec<RippleId> {
        self.fire()
    }

    /// Check whether a subscription is still live.
    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.entries.iter().any(|(sub, _)| *sub == id)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no subscription is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
