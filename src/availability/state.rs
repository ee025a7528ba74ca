//! Availability states and their published cell.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::observability::metrics;

/// Where a listener is in its up/down cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityState {
    /// Accepting connections and serving behaviors.
    Up,
    /// Closing the listener.
    GoingDown,
    /// No listener bound; connections are refused.
    Down,
    /// Waiting to rebind, or rebinding.
    Restarting,
}

impl AvailabilityState {
    pub fn is_up(self) -> bool {
        self == AvailabilityState::Up
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AvailabilityState::Up => "up",
            AvailabilityState::GoingDown => "going_down",
            AvailabilityState::Down => "down",
            AvailabilityState::Restarting => "restarting",
        }
    }
}

impl fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state of one controller, observable through watch receivers.
///
/// Only the controller's own task writes to it.
#[derive(Clone)]
pub struct StateCell {
    listener: &'static str,
    tx: Arc<watch::Sender<AvailabilityState>>,
}

impl StateCell {
    /// New cell for `listener`, starting out `Down`.
    pub fn new(listener: &'static str) -> Self {
        let (tx, _) = watch::channel(AvailabilityState::Down);
        Self {
            listener,
            tx: Arc::new(tx),
        }
    }

    pub fn get(&self) -> AvailabilityState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
        self.tx.subscribe()
    }

    /// Move to `to`. Repeating the current state is a no-op.
    pub fn transition(&self, to: AvailabilityState) {
        let mut from = to;
        let changed = self.tx.send_if_modified(|current| {
            if *current == to {
                return false;
            }
            from = std::mem::replace(current, to);
            true
        });

        if changed {
            tracing::info!(listener = self.listener, %from, %to, "Availability changed");
            metrics::record_availability(self.listener, to);
        }
    }
}
