//! Frame-polled timers.
//!
//! Deferred work (notice auto-dismiss, delayed hides) is stored as
//! `(expiry, action)` pairs and handed back from [`Scheduler::advance`] once
//! its expiry has passed. Nothing here knows about threads or UI loops.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Serialize)]
struct Timer<A> {
    id: TimerId,
    expires_at: f64,
    action: A,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scheduler<A> {
    now: f64,
    next_id: u64,
    pending: Vec<Timer<A>>,
    history: Vec<TimerId>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            pending: Vec::new(),
            history: Vec::new(),
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since the scheduler was created.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn schedule(&mut self, delay: f32, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer {
            id,
            expires_at: self.now + f64::from(delay.max(0.0)),
            action,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        before != self.pending.len()
    }

    /// Moves the clock forward and returns every action that expired, in
    /// expiry order (ties keep scheduling order).
    pub fn advance(&mut self, dt: f32) -> Vec<A> {
        self.now += f64::from(dt.max(0.0));
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|timer| timer.expires_at <= now);
        self.pending = pending;
        due.sort_by(|a, b| a.expires_at.total_cmp(&b.expires_at));
        due.into_iter()
            .map(|timer| {
                self.history.push(timer.id);
                timer.action
            })
            .collect()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl ExactSizeIterator<Item = &A> {
        self.pending.iter().map(|timer| &timer.action)
    }

    /// Ids of timers that have fired, oldest first.
    pub fn history(&self) -> &[TimerId] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_fire_once_their_expiry_passes() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2.0, "dismiss");
        scheduler.schedule(0.5, "hide");

        assert!(scheduler.advance(0.4).is_empty());
        assert_eq!(scheduler.advance(0.2), vec!["hide"]);
        assert!(scheduler.advance(1.0).is_empty());
        assert_eq!(scheduler.advance(0.5), vec!["dismiss"]);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.history().len(), 2);
    }

    #[test]
    fn one_large_step_returns_actions_in_expiry_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(3.0, 3);
        scheduler.schedule(1.0, 1);
        scheduler.schedule(2.0, 2);
        assert_eq!(scheduler.advance(10.0), vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(1.0, "notice");
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.advance(5.0).is_empty());
        assert!(!scheduler.is_pending(id));
    }
}
