//! Scheduler module - timer abstraction driving turn progression
//!
//! The turn state machine never sleeps or spawns anything. It asks a [`Scheduler`]
//! for timers and the host pumps time through [`GameState::tick`]. Due timers come
//! back out in deadline order, each at its own deadline, so a long tick behaves the
//! same as many short ones.
//!
//! [`VirtualClock`] is the only implementation the game needs: a real-time host
//! feeds it wall-clock deltas, tests feed it exact milliseconds.
//!
//! [`GameState::tick`]: crate::game_state::GameState::tick

/// What a timer means when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// The player ran out of time on the current turn
    TurnTimeout,
    /// Feedback or review finished; move to the next turn
    Advance,
}

/// Opaque handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Timer service the turn state machine depends on.
pub trait Scheduler {
    /// Current clock reading
    fn now_ms(&self) -> u64;

    /// Fire `timer` after `delay_ms`
    fn schedule(&mut self, delay_ms: u32, timer: TimerKind) -> TimerHandle;

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    fn cancel_all(&mut self);

    /// Time left before `handle` fires, if it is still pending
    fn remaining_ms(&self, handle: TimerHandle) -> Option<u32>;

    /// Number of pending timers
    fn pending(&self) -> usize;

    /// Remove the earliest timer due at or before `until_ms`, moving the clock to
    /// its deadline.
    fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerKind)>;

    /// Move the clock forward to `now_ms`. Never moves backwards.
    fn advance_to(&mut self, now_ms: u64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    handle: TimerHandle,
    deadline_ms: u64,
    timer: TimerKind,
}

/// Manually advanced clock
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<PendingTimer>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn schedule(&mut self, delay_ms: u32, timer: TimerKind) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(PendingTimer {
            handle,
            deadline_ms: self.now_ms + u64::from(delay_ms),
            timer,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.handle != handle);
        self.pending.len() != before
    }

    fn cancel_all(&mut self) {
        self.pending.clear();
    }

    fn remaining_ms(&self, handle: TimerHandle) -> Option<u32> {
        self.pending
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.deadline_ms.saturating_sub(self.now_ms) as u32)
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerKind)> {
        // Ties go to the timer scheduled first.
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline_ms <= until_ms)
            .min_by_key(|(_, t)| (t.deadline_ms, t.handle))?;

        let due = self.pending.swap_remove(index);
        self.now_ms = self.now_ms.max(due.deadline_ms);
        Some((due.handle, due.timer))
    }

    fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut clock = VirtualClock::new();
        clock.schedule(100, TimerKind::TurnTimeout);
        assert_eq!(clock.pop_due(99), None);
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn test_due_timers_fire_in_deadline_order() {
        let mut clock = VirtualClock::new();
        let late = clock.schedule(300, TimerKind::Advance);
        let early = clock.schedule(100, TimerKind::TurnTimeout);

        assert_eq!(clock.pop_due(1000), Some((early, TimerKind::TurnTimeout)));
        assert_eq!(clock.now_ms(), 100);
        assert_eq!(clock.pop_due(1000), Some((late, TimerKind::Advance)));
        assert_eq!(clock.now_ms(), 300);
        assert_eq!(clock.pop_due(1000), None);
    }

    #[test]
    fn test_ties_fire_in_schedule_order() {
        let mut clock = VirtualClock::new();
        let first = clock.schedule(50, TimerKind::Advance);
        let second = clock.schedule(50, TimerKind::TurnTimeout);
        assert_eq!(clock.pop_due(50).map(|(h, _)| h), Some(first));
        assert_eq!(clock.pop_due(50).map(|(h, _)| h), Some(second));
    }

    #[test]
    fn test_schedule_is_relative_to_current_time() {
        let mut clock = VirtualClock::new();
        clock.advance_to(1_000);
        let handle = clock.schedule(250, TimerKind::Advance);
        assert_eq!(clock.remaining_ms(handle), Some(250));
        assert_eq!(clock.pop_due(1_249), None);
        assert!(clock.pop_due(1_250).is_some());
    }

    #[test]
    fn test_cancel() {
        let mut clock = VirtualClock::new();
        let handle = clock.schedule(10, TimerKind::TurnTimeout);
        assert!(clock.cancel(handle));
        assert!(!clock.cancel(handle));
        assert_eq!(clock.pop_due(100), None);
        assert_eq!(clock.remaining_ms(handle), None);
    }

    #[test]
    fn test_cancel_all() {
        let mut clock = VirtualClock::new();
        clock.schedule(10, TimerKind::TurnTimeout);
        clock.schedule(20, TimerKind::Advance);
        clock.cancel_all();
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_remaining_shrinks_as_time_passes() {
        let mut clock = VirtualClock::new();
        let handle = clock.schedule(500, TimerKind::TurnTimeout);
        clock.advance_to(200);
        assert_eq!(clock.remaining_ms(handle), Some(300));
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let mut clock = VirtualClock::new();
        clock.advance_to(500);
        clock.advance_to(100);
        assert_eq!(clock.now_ms(), 500);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut clock = VirtualClock::new();
        let a = clock.schedule(1, TimerKind::Advance);
        let b = clock.schedule(1, TimerKind::Advance);
        assert_ne!(a, b);
    }
}
