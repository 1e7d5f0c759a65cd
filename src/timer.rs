//! Virtual time for fixed-delay effects.
//!
//! Every effect that reverts or advances after a delay owns a [`Timers`] and
//! exposes an `advance(dt)` that drains due events. Nothing here reads the
//! wall clock, so tests step time explicitly.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<E> {
    id: TimerId,
    deadline: Duration,
    event: E,
}

#[derive(Debug)]
pub struct Timers<E> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    #[cfg(test)]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        self.pending.push(Pending {
            id,
            deadline: self.now + delay,
            event,
        });
        id
    }

    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Fires the earliest event due at or before `target`.
    ///
    /// The clock moves to that event's deadline, so anything the caller
    /// schedules while handling it is relative to when it was due rather
    /// than to `target`. Ties fire in the order they were scheduled.
    pub fn pop_until(&mut self, target: Duration) -> Option<E> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= target)
            .min_by_key(|(_, p)| (p.deadline, p.id.0))
            .map(|(i, _)| i)?;

        let pending = self.pending.remove(index);
        self.now = self.now.max(pending.deadline);
        Some(pending.event)
    }

    /// Moves the clock to `target` once every due event has been popped.
    pub fn settle(&mut self, target: Duration) {
        self.now = self.now.max(target);
    }

    /// Drains everything due within `dt`, for callers that never reschedule
    /// from a handler.
    pub fn advance(&mut self, dt: Duration) -> Vec<E> {
        let target = self.now + dt;
        let mut fired = Vec::new();
        while let Some(event) = self.pop_until(target) {
            fired.push(event);
        }
        self.settle(target);
        fired
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
