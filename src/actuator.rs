//! Smooth, integer-only color transitions for an RGB LED.
//!
//! [`SmoothColorActuator`] owns the physical output and walks its current
//! color towards a target one unit per channel per step. The step interval is
//! chosen by [`Color::delay_to_next_adjustment`] so that the whole fade takes
//! about the requested time no matter how far apart the colors are.
//!
//! ## State Machine
//!
//! ```text
//!            set_color_smooth                 poll: current == target
//!   Idle ---------------------> Adjusting ----------------------------> Idle
//!                               |      ^
//!                               +------+ poll: step, re-arm timer
//! ```
//!
//! Commanding a new target while adjusting re-computes the step interval
//! and replaces the pending step; nothing else has to be cancelled.

use core::fmt;

use crate::color::Color;
use crate::fmt::Dbg;
use crate::timer::OneShot;

/// Something that can show a color, usually three PWM channels.
pub trait RgbOutput {
    /// Error reported by the underlying hardware.
    type Error: fmt::Debug;

    /// Drives the physical output to `color`.
    fn actuate(&mut self, color: Color) -> Result<(), Self::Error>;
}

impl<T: RgbOutput + ?Sized> RgbOutput for &mut T {
    type Error = T::Error;

    fn actuate(&mut self, color: Color) -> Result<(), Self::Error> {
        (**self).actuate(color)
    }
}

/// Whether a fade is in progress.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ActuatorState {
    /// The output shows the target color; no step is pending.
    #[default]
    Idle,
    /// A step towards the target is scheduled.
    Adjusting,
}

/// Fades an [`RgbOutput`] between colors.
#[derive(Debug)]
pub struct SmoothColorActuator<L> {
    led: L,
    current: Color,
    target: Color,
    step_ms: u32,
    timer: OneShot,
}

impl<L: RgbOutput> SmoothColorActuator<L> {
    /// Takes ownership of `led`, assumed to be showing black.
    pub fn new(led: L) -> Self {
        Self {
            led,
            current: Color::BLACK,
            target: Color::BLACK,
            step_ms: 0,
            timer: OneShot::new(),
        }
    }

    /// Shows `color` right away and abandons any fade in progress.
    pub fn set_color(&mut self, color: Color) {
        self.current = color;
        self.target = color;
        self.step_ms = 0;
        self.timer.cancel();
        self.actuate();
    }

    /// Starts fading from the current color to `target` over about `total_ms`.
    ///
    /// # Arguments
    /// - `target`: color to end up at
    /// - `total_ms`: requested fade duration
    /// - `now_ms`: current time, the first step happens one interval later
    ///
    /// # Notes
    /// - Replaces the target and step interval of a fade that is still running.
    /// - A target equal to the current color stops any fade immediately.
    pub fn set_color_smooth(&mut self, target: Color, total_ms: u32, now_ms: u64) {
        self.target = target;
        if self.current == target {
            self.timer.cancel();
            return;
        }
        self.step_ms = self.current.delay_to_next_adjustment(target, total_ms);
        self.timer.schedule(now_ms, self.step_ms);
    }

    /// Performs every step that fell due up to `now_ms`.
    ///
    /// Steps are anchored to their scheduled time rather than to the time of
    /// the poll, so the fade keeps its overall duration even when polled late.
    /// The output is refreshed once per poll if anything changed.
    pub fn poll(&mut self, now_ms: u64) -> ActuatorState {
        let mut stepped = false;
        while let Some(due) = self.timer.fire(now_ms) {
            self.current.adjust(self.target);
            stepped = true;
            if self.current != self.target {
                self.timer.schedule(due, self.step_ms);
            }
        }
        if stepped {
            self.actuate();
        }
        self.state()
    }

    /// Current fade state.
    pub fn state(&self) -> ActuatorState {
        if self.timer.is_pending() {
            ActuatorState::Adjusting
        } else {
            ActuatorState::Idle
        }
    }

    /// Color currently shown.
    pub fn current(&self) -> Color {
        self.current
    }

    /// Color being faded to.
    pub fn target(&self) -> Color {
        self.target
    }

    /// Interval between two steps of the running fade.
    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }

    /// When the next step is due, if a fade is running.
    pub fn next_step_ms(&self) -> Option<u64> {
        self.timer.due_ms()
    }

    /// Shared access to the output.
    pub fn led(&self) -> &L {
        &self.led
    }

    /// Exclusive access to the output, e.g. to toggle its power rail.
    pub fn led_mut(&mut self) -> &mut L {
        &mut self.led
    }

    /// Gives the output back.
    pub fn release(self) -> L {
        self.led
    }

    fn actuate(&mut self) {
        if let Err(e) = self.led.actuate(self.current) {
            warn!("LED actuation failed: {}", Dbg(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    struct RecordingLed {
        shown: Vec<Color>,
    }

    impl RgbOutput for RecordingLed {
        type Error = Infallible;

        fn actuate(&mut self, color: Color) -> Result<(), Infallible> {
            self.shown.push(color);
            Ok(())
        }
    }

    #[test]
    fn test_set_color_is_immediate() {
        let mut act = SmoothColorActuator::new(RecordingLed::default());
        act.set_color(Color::new(1, 2, 3));
        assert_eq!(act.current(), Color::new(1, 2, 3));
        assert_eq!(act.state(), ActuatorState::Idle);
        assert_eq!(act.led().shown, [Color::new(1, 2, 3)]);
    }

    #[test]
    fn test_fade_reaches_midpoint_and_target_on_time() {
        let mut act = SmoothColorActuator::new(RecordingLed::default());
        let target = Color::new(254, 0, 0);
        act.set_color_smooth(target, 1000, 0);
        assert_eq!(act.state(), ActuatorState::Adjusting);
        assert_eq!(act.step_ms(), 4);

        let mut last_red = 0;
        for now in 1..=1_100u64 {
            let _ = act.poll(now);
            let c = act.current();
            assert!(c.r >= last_red, "red went backwards at {now}");
            assert!(c.r <= 254);
            assert_eq!((c.g, c.b), (0, 0));
            last_red = c.r;
            if now == 500 {
                assert!((117..=137).contains(&c.r), "red {} at 500 ms", c.r);
            }
        }
        assert_eq!(act.current(), target);
        assert_eq!(act.state(), ActuatorState::Idle);
        assert_eq!(act.led().shown.last(), Some(&target));
    }

    #[test]
    fn test_late_poll_catches_up() {
        let mut act = SmoothColorActuator::new(RecordingLed::default());
        act.set_color_smooth(Color::new(254, 0, 0), 1000, 0);
        assert_eq!(act.poll(500), ActuatorState::Adjusting);
        assert_eq!(act.current().r, 125);
        // One output refresh for the whole batch of steps.
        assert_eq!(act.led().shown.len(), 1);
        assert_eq!(act.poll(5_000), ActuatorState::Idle);
        assert_eq!(act.current(), Color::new(254, 0, 0));
    }

    #[test]
    fn test_new_target_replaces_running_fade() {
        let mut act = SmoothColorActuator::new(RecordingLed::default());
        act.set_color_smooth(Color::new(200, 0, 0), 1000, 0);
        let _ = act.poll(100);
        let halfway = act.current();
        assert!(halfway.r > 0);

        act.set_color_smooth(Color::BLACK, 500, 100);
        assert_eq!(act.target(), Color::BLACK);
        assert_eq!(
            act.step_ms(),
            halfway.delay_to_next_adjustment(Color::BLACK, 500)
        );
        let _ = act.poll(2_000);
        assert_eq!(act.current(), Color::BLACK);
        assert_eq!(act.state(), ActuatorState::Idle);
    }

    #[test]
    fn test_smooth_to_current_color_is_idle() {
        let mut act = SmoothColorActuator::new(RecordingLed::default());
        act.set_color_smooth(Color::BLACK, 1000, 0);
        assert_eq!(act.state(), ActuatorState::Idle);
        assert_eq!(act.next_step_ms(), None);
        assert_eq!(act.poll(10_000), ActuatorState::Idle);
        assert!(act.release().shown.is_empty());
    }

    #[test]
    fn test_set_color_cancels_fade() {
        let mut act = SmoothColorActuator::new(RecordingLed::default());
        act.set_color_smooth(Color::WHITE, 1000, 0);
        act.set_color(Color::new(0, 0, 9));
        assert_eq!(act.poll(10_000), ActuatorState::Idle);
        assert_eq!(act.current(), Color::new(0, 0, 9));
    }
}
