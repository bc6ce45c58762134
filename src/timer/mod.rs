//! Time keeping and software timers.
//!
//! The firmware only needs two kinds of timer: a periodic one (recompute the
//! display color every second, sample the battery every five) and a one-shot
//! one whose pending deadline is replaced whenever it is re-armed (the next
//! step of a color fade). Both are plain values polled with the current time
//! from a [`Clock`], so they work the same from a main loop, an RTOS thread or
//! a timer interrupt.
//!
//! Two ways to drive the display task are provided, mirroring each other:
//! - `run_display_loop` (feature `delay-loop`): a blocking loop paced by
//!   `embedded_hal::delay::DelayNs`
//! - `global_display_tick` and the `init_display!` / `setup_display!` macros
//!   (feature `timer-isr`): a `critical_section` singleton ticked from an ISR

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// A monotonic millisecond clock.
///
/// Implementations typically wrap the RTOS uptime or a free-running hardware
/// timer. The value must never go backwards.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Fires every `period_ms`, starting one period after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Periodic {
    period_ms: u32,
    next_due_ms: u64,
}

impl Periodic {
    /// Creates a timer whose first firing is at `now_ms + period_ms`.
    ///
    /// A zero period is treated as 1 ms.
    pub fn new(period_ms: u32, now_ms: u64) -> Self {
        let period_ms = period_ms.max(1);
        Self {
            period_ms,
            next_due_ms: now_ms + u64::from(period_ms),
        }
    }

    /// Returns `true` at most once per poll if a period has elapsed.
    ///
    /// After a late poll the schedule skips the missed periods instead of
    /// firing them back to back.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        let period = u64::from(self.period_ms);
        let missed = (now_ms - self.next_due_ms) / period;
        self.next_due_ms += (missed + 1) * period;
        true
    }

    /// Time of the next firing.
    pub fn next_due_ms(&self) -> u64 {
        self.next_due_ms
    }

    /// Configured period.
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }
}

/// A single pending deadline.
///
/// Arming the timer replaces any deadline that is still pending; that is the
/// only cancellation a fade ever needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct OneShot {
    due_ms: Option<u64>,
}

impl OneShot {
    /// A timer with nothing pending.
    pub const fn new() -> Self {
        Self { due_ms: None }
    }

    /// Arms the timer to fire `delay_ms` after `from_ms`.
    pub fn schedule(&mut self, from_ms: u64, delay_ms: u32) {
        self.due_ms = Some(from_ms + u64::from(delay_ms));
    }

    /// Drops the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.due_ms = None;
    }

    /// Whether a deadline is pending.
    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    /// The pending deadline.
    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    /// Consumes the deadline if it has passed and returns it.
    pub fn fire(&mut self, now_ms: u64) -> Option<u64> {
        match self.due_ms {
            Some(due) if due <= now_ms => self.due_ms.take(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_first_firing_after_one_period() {
        let mut t = Periodic::new(1000, 500);
        assert!(!t.poll(500));
        assert!(!t.poll(1499));
        assert!(t.poll(1500));
        assert!(!t.poll(1500));
        assert_eq!(t.next_due_ms(), 2500);
    }

    #[test]
    fn test_periodic_skips_missed_periods() {
        let mut t = Periodic::new(100, 0);
        assert!(t.poll(350));
        assert_eq!(t.next_due_ms(), 400);
        assert!(!t.poll(399));
        assert!(t.poll(400));
    }

    #[test]
    fn test_periodic_zero_period_is_clamped() {
        let mut t = Periodic::new(0, 10);
        assert_eq!(t.period_ms(), 1);
        assert!(t.poll(11));
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut t = OneShot::new();
        assert_eq!(t.fire(100), None);
        t.schedule(0, 50);
        assert_eq!(t.fire(49), None);
        assert_eq!(t.fire(60), Some(50));
        assert_eq!(t.fire(70), None);
        assert!(!t.is_pending());
    }

    #[test]
    fn test_one_shot_rescheduling_replaces_deadline() {
        let mut t = OneShot::new();
        t.schedule(0, 10);
        t.schedule(5, 100);
        assert_eq!(t.fire(20), None);
        assert_eq!(t.due_ms(), Some(105));
        t.cancel();
        assert_eq!(t.fire(1_000), None);
    }
}
