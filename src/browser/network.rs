//! In-flight request bookkeeping for network-idle waits.

use std::collections::HashSet;
use std::time::{Duration, Instant};

/// A request starting or settling, keyed by CDP request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Started(String),
    Settled(String),
}

/// Tracks open requests and when the set last changed.
#[derive(Debug)]
pub struct InFlight {
    open: HashSet<String>,
    last_change: Instant,
}

impl InFlight {
    pub fn new(now: Instant) -> Self {
        Self {
            open: HashSet::new(),
            last_change: now,
        }
    }

    pub fn apply(&mut self, event: NetworkEvent, now: Instant) {
        let changed = match event {
            NetworkEvent::Started(id) => self.open.insert(id),
            NetworkEvent::Settled(id) => self.open.remove(&id),
        };
        if changed {
            self.last_change = now;
        }
    }

    pub fn open_requests(&self) -> usize {
        self.open.len()
    }

    /// How much longer the network must stay quiet, `None` once idle.
    ///
    /// While requests are open the full quiet window is returned, so callers
    /// keep waiting for the next event.
    pub fn remaining_quiet(&self, now: Instant, quiet: Duration) -> Option<Duration> {
        if !self.open.is_empty() {
            return Some(quiet);
        }
        let idle_for = now.saturating_duration_since(self.last_change);
        quiet.checked_sub(idle_for).filter(|left| !left.is_zero())
    }
}
