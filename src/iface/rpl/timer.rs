//! One-shot timers armed through an external [Scheduler].
//!
//! Every arming of a timer gets a fresh generation number. A [TimerHandle] that comes back from
//! the scheduler after its timer was cancelled or re-armed carries an old generation and is
//! dropped, so a cancel racing with an already expired timer never fires twice.

use crate::time::Duration;

/// The timers used by the RPL controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timer {
    TrickleTransmit,
    TrickleInterval,
    DaoDelay,
    NeighborTick,
}

/// Opaque identity of one arming of a [Timer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerHandle {
    timer: Timer,
    generation: u32,
}

impl TimerHandle {
    pub fn timer(&self) -> Timer {
        self.timer
    }
}

/// The scheduling primitive the controller is driven by.
///
/// When a scheduled delay elapses, the owner of the scheduler hands the handle back to
/// [`Rpl::handle_timer`](super::Rpl::handle_timer).
pub trait Scheduler {
    /// Deliver `handle` once `delay` has elapsed.
    fn schedule(&mut self, handle: TimerHandle, delay: Duration);

    /// Drop a pending delivery of `handle`. Cancelling a handle that is not pending is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OneShot {
    timer: Timer,
    generation: u32,
    armed: bool,
}

impl OneShot {
    pub(crate) const fn new(timer: Timer) -> Self {
        Self {
            timer,
            generation: 0,
            armed: false,
        }
    }

    fn handle(&self) -> TimerHandle {
        TimerHandle {
            timer: self.timer,
            generation: self.generation,
        }
    }

    /// Cancel any pending expiry and schedule a new one `delay` from now.
    pub(crate) fn arm<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, delay: Duration) {
        self.cancel(scheduler);
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
        scheduler.schedule(self.handle(), delay);
    }

    pub(crate) fn cancel<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.armed {
            scheduler.cancel(self.handle());
            self.armed = false;
        }
    }

    /// Consume an expiry. Returns `true` only for the handle of the current arming.
    pub(crate) fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.armed && handle == self.handle() {
            self.armed = false;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }
}


#[cfg(test)]
mod tests {
    use super::test_scheduler::RecordingScheduler;
    use super::*;

    #[test]
    fn rearm_invalidates_old_handle() {
        let mut sched = RecordingScheduler::default();
        let mut t = OneShot::new(Timer::DaoDelay);

        t.arm(&mut sched, Duration::from_millis(10));
        let old = sched.pending[0].0;
        t.arm(&mut sched, Duration::from_millis(20));

        assert_eq!(sched.pending.len(), 1);
        assert!(!t.fire(old));

        let (current, delay) = sched.take(Timer::DaoDelay).unwrap();
        assert_eq!(delay, Duration::from_millis(20));
        assert!(t.fire(current));
        assert!(!t.is_armed());
    }

    #[test]
    fn no_double_fire() {
        let mut sched = RecordingScheduler::default();
        let mut t = OneShot::new(Timer::NeighborTick);

        t.arm(&mut sched, Duration::from_secs(1));
        let (handle, _) = sched.take(Timer::NeighborTick).unwrap();
        assert!(t.fire(handle));
        assert!(!t.fire(handle));
    }

    #[test]
    fn cancelled_handle_is_ignored() {
        let mut sched = RecordingScheduler::default();
        let mut t = OneShot::new(Timer::TrickleTransmit);

        t.arm(&mut sched, Duration::from_secs(1));
        let handle = sched.pending[0].0;
        t.cancel(&mut sched);

        assert!(sched.pending.is_empty());
        assert!(!t.fire(handle));
    }
}
