//! Trickle algorithm, see [RFC 6206].
//!
//! The interval `I` ranges from `2^Imin` ms to `2^Imin` ms doubled `doublings` times. Each
//! interval arms two timers: a transmission timer at a random point of the second half of the
//! interval, and an interval timer at its end. A transmission happens only when fewer than `k`
//! consistent messages were heard during the interval.
//!
//! [RFC 6206]: https://datatracker.ietf.org/doc/html/rfc6206

use super::consts::{
    DEFAULT_DIO_INTERVAL_DOUBLINGS, DEFAULT_DIO_INTERVAL_MIN, DEFAULT_DIO_REDUNDANCY_CONSTANT,
};
use super::timer::{OneShot, Scheduler, Timer, TimerHandle};
use crate::{rand::Rand, time::Duration};

#[derive(Debug)]
pub struct TrickleTimer {
    running: bool,

    i_min: u8,
    doublings: u8,
    k: u8,

    /// Number of doublings applied to `2^i_min` for the current interval.
    i_curr: u8,
    counter: u8,

    transmit: OneShot,
    interval: OneShot,
}

impl Default for TrickleTimer {
    fn default() -> Self {
        Self::new(
            DEFAULT_DIO_INTERVAL_MIN,
            DEFAULT_DIO_INTERVAL_DOUBLINGS,
            DEFAULT_DIO_REDUNDANCY_CONSTANT,
        )
    }
}

impl TrickleTimer {
    /// Create a new Trickle timer.
    pub(crate) const fn new(i_min: u8, doublings: u8, k: u8) -> Self {
        Self {
            running: false,
            i_min,
            doublings,
            k,
            i_curr: 0,
            counter: 0,
            transmit: OneShot::new(Timer::TrickleTransmit),
            interval: OneShot::new(Timer::TrickleInterval),
        }
    }

    /// Change the parameters. They take effect at the next interval.
    pub(crate) fn set_parameters(&mut self, i_min: u8, doublings: u8, k: u8) {
        self.i_min = i_min;
        self.doublings = doublings;
        self.k = k;
        self.i_curr = self.i_curr.min(doublings);
    }

    /// Start with an interval drawn uniformly from all the possible interval sizes.
    pub(crate) fn start<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, rand: &mut Rand) {
        if self.running {
            return;
        }

        self.i_curr = rand.rand_inclusive(self.doublings as u32) as u8;
        self.running = true;
        self.begin_interval(scheduler, rand);
    }

    /// Go back to the minimum interval and restart.
    pub(crate) fn reset<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, rand: &mut Rand) {
        self.i_curr = 0;
        self.running = true;
        self.begin_interval(scheduler, rand);
    }

    pub(crate) fn stop<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.transmit.cancel(scheduler);
        self.interval.cancel(scheduler);
        self.running = false;
    }

    /// Signal the Trickle timer that a consistency has been heard.
    pub(crate) fn hear_consistent(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }

    /// Signal the Trickle timer that an inconsistency has been heard.
    pub(crate) fn hear_inconsistent<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        rand: &mut Rand,
    ) {
        if self.running && self.i_curr != 0 {
            self.reset(scheduler, rand);
        }
    }

    /// Handle an expiry of the transmission timer. Returns `true` when a message has to be sent.
    pub(crate) fn fire_transmit(&mut self, handle: TimerHandle) -> bool {
        self.transmit.fire(handle) && self.can_transmit()
    }

    /// Handle an expiry of the interval timer: double the interval and start the next one.
    pub(crate) fn fire_interval<S: Scheduler + ?Sized>(
        &mut self,
        handle: TimerHandle,
        scheduler: &mut S,
        rand: &mut Rand,
    ) {
        if !self.interval.fire(handle) {
            return;
        }

        if self.i_curr < self.doublings {
            self.i_curr += 1;
        }
        self.begin_interval(scheduler, rand);
    }

    fn begin_interval<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S, rand: &mut Rand) {
        let i = self.interval();
        let half = i.total_millis() / 2;
        let jitter = (i.total_millis() - half).saturating_sub(1);
        let t = half + rand.rand_inclusive(jitter.min(u32::MAX as u64) as u32) as u64;

        self.counter = 0;
        self.transmit.arm(scheduler, Duration::from_millis(t));
        self.interval.arm(scheduler, i);

        net_trace!("trickle: I={} t={}ms", i, t);
    }

    /// Check if the trickle timer can transmit.
    pub(crate) fn can_transmit(&self) -> bool {
        self.k != 0 && self.counter < self.k
    }

    /// The length of the current interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(1u64 << (self.i_min as u32 + self.i_curr as u32).min(63))
    }

    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(1u64 << self.i_min)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(1u64 << (self.i_min as u32 + self.doublings as u32).min(63))
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
