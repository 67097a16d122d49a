use bevy::prelude::*;

/// One-deep command queue. A second post before the slot is taken replaces
/// the first; nothing is queued behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSlot<T = ()> {
    pending: Option<T>,
    overwritten: u32,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            pending: None,
            overwritten: 0,
        }
    }
}

impl<T> RequestSlot<T> {
    pub fn post(&mut self, request: T) {
        if self.pending.replace(request).is_some() {
            self.overwritten += 1;
        }
    }

    /// Consumes the pending request, leaving the slot empty.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of requests discarded by a later post before consumption.
    pub fn overwritten(&self) -> u32 {
        self.overwritten
    }
}

/// Pending mode-change requests, written by input or ability handling and
/// drained by the state machine once per tick.
#[derive(Component, Default, Debug, Clone)]
pub struct TransitionRequests {
    pub to_climb: RequestSlot,
    pub to_fly: RequestSlot,
    pub climb_dash: RequestSlot,
    pub leave_climb: RequestSlot,
}

impl TransitionRequests {
    pub fn request_start_climb(&mut self) {
        self.to_climb.post(());
    }

    pub fn request_leave_climb(&mut self) {
        self.leave_climb.post(());
    }

    pub fn request_climb_dash(&mut self) {
        self.climb_dash.post(());
    }

    pub fn request_toggle_flight(&mut self) {
        self.to_fly.post(());
    }

    pub fn any_pending(&self) -> bool {
        self.to_climb.is_pending()
            || self.to_fly.is_pending()
            || self.climb_dash.is_pending()
            || self.leave_climb.is_pending()
    }
}
