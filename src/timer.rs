//! Timer handles driven by caller-supplied instants.
//!
//! Nothing here sleeps or spawns; the event loop asks each handle whether it
//! is due and uses [`earliest`] to bound how long it may block on input.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default)]
pub struct OneShot {
    deadline: Option<Instant>,
}

impl OneShot {
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Fixed-period timer that never stops. Missed periods are skipped rather
/// than fired back to back.
#[derive(Debug, Clone, Copy)]
pub struct Repeating {
    period: Duration,
    next: Instant,
}

impl Repeating {
    pub fn new(period: Duration, first_at: Instant) -> Self {
        Self {
            period,
            next: first_at,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

/// One timer slot shared by several purposes: arming any purpose replaces
/// whatever was armed before, so at most one purpose is ever pending.
#[derive(Debug, Clone, Copy)]
pub struct Slot<P> {
    armed: Option<(P, Instant)>,
}

impl<P> Default for Slot<P> {
    fn default() -> Self {
        Self { armed: None }
    }
}

impl<P: Copy> Slot<P> {
    pub fn arm(&mut self, purpose: P, now: Instant, after: Duration) {
        self.armed = Some((purpose, now + after));
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn pending(&self) -> Option<P> {
        self.armed.map(|(purpose, _)| purpose)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.map(|(_, deadline)| deadline)
    }

    pub fn fire_if_due(&mut self, now: Instant) -> Option<P> {
        match self.armed {
            Some((purpose, deadline)) if now >= deadline => {
                self.armed = None;
                Some(purpose)
            }
            _ => None,
        }
    }
}

pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}
