use std::time::Duration;

use log::trace;

/// Identifies one arming of a [`DebounceTimer`]; stale tokens never fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// Time (on the driver's clock) at which the pass is due.
    pub at: Duration,
    pub token: TimerToken,
}

/// Single-slot cancellable timer. Arming while armed replaces the pending deadline; at most
/// one deadline is ever outstanding.
///
/// The timer never reads a clock: drivers pass `now` in and decide how to wait.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    slot: Option<Deadline>,
    generation: u64,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Duration, delay: Duration) -> Deadline {
        self.generation += 1;
        let deadline = Deadline { at: now + delay, token: TimerToken(self.generation) };
        if let Some(prev) = self.slot.replace(deadline) {
            trace!("DebounceTimer: {:?} superseded by {:?}", prev.token, deadline.token);
        }
        deadline
    }

    pub fn cancel(&mut self) -> Option<Deadline> {
        self.slot.take()
    }

    pub fn deadline(&self) -> Option<Deadline> {
        self.slot
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    /// Disarm and return the deadline if it has elapsed by `now`.
    pub fn take_due(&mut self, now: Duration) -> Option<Deadline> {
        match self.slot {
            Some(deadline) if deadline.at <= now => self.slot.take(),
            _ => None,
        }
    }

    /// Disarm and return the deadline if `token` names the current arming.
    pub fn take_token(&mut self, token: TimerToken) -> Option<Deadline> {
        match self.slot {
            Some(deadline) if deadline.token == token => self.slot.take(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_rearm_replaces() {
        let mut timer = DebounceTimer::new();
        let first = timer.arm(ms(0), ms(100));
        let second = timer.arm(ms(60), ms(100));
        assert_ne!(first.token, second.token);
        assert_eq!(timer.deadline(), Some(second));

        assert_eq!(timer.take_due(ms(100)), None);
        assert_eq!(timer.take_due(ms(160)), Some(second));
        assert!(!timer.is_armed());
        assert_eq!(timer.take_due(ms(1000)), None);
    }

    #[test]
    fn test_stale_token() {
        let mut timer = DebounceTimer::new();
        let first = timer.arm(ms(0), ms(100));
        let second = timer.arm(ms(10), ms(100));
        assert_eq!(timer.take_token(first.token), None);
        assert!(timer.is_armed());
        assert_eq!(timer.take_token(second.token), Some(second));
        assert_eq!(timer.take_token(second.token), None);
    }

    #[test]
    fn test_cancel() {
        let mut timer = DebounceTimer::new();
        let deadline = timer.arm(ms(0), ms(100));
        assert_eq!(timer.cancel(), Some(deadline));
        assert_eq!(timer.cancel(), None);
        assert_eq!(timer.take_token(deadline.token), None);
    }
}
