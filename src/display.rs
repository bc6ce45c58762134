//! Receiver display task: periodically turns the aggregated color into an LED fade.

use crate::actuator::{ActuatorState, RgbOutput, SmoothColorActuator};
use crate::aggregator::SharedAggregator;
use crate::config::DisplayConfig;
use crate::timer::Periodic;

/// Recomputes the display color every `refresh_period_ms` and fades to it.
///
/// Call [`tick`](Display::tick) often enough to honour the fade resolution
/// (a few milliseconds), either from a dedicated loop or from a timer
/// interrupt; see [`crate::timer`].
#[derive(Debug)]
pub struct Display<L> {
    actuator: SmoothColorActuator<L>,
    refresh: Periodic,
    transition_ms: u32,
}

impl<L: RgbOutput> Display<L> {
    /// Creates the task; the first refresh happens one period after `now_ms`.
    pub fn new(led: L, config: DisplayConfig, now_ms: u64) -> Self {
        Self {
            actuator: SmoothColorActuator::new(led),
            refresh: Periodic::new(config.refresh_period_ms, now_ms),
            transition_ms: config.transition_ms,
        }
    }

    /// Advances the display to `now_ms`.
    ///
    /// Reads the aggregator when a refresh is due, then performs pending fade
    /// steps. The aggregator lock is held only while reading the color.
    pub fn tick(&mut self, aggregator: &SharedAggregator, now_ms: u64) -> ActuatorState {
        if self.refresh.poll(now_ms) {
            let color = aggregator.current_color(now_ms);
            debug!("New color is {} {} {}", color.r, color.g, color.b);
            self.actuator
                .set_color_smooth(color, self.transition_ms, now_ms);
        }
        self.actuator.poll(now_ms)
    }

    /// The actuator driving the LED.
    pub fn actuator(&self) -> &SmoothColorActuator<L> {
        &self.actuator
    }

    /// Exclusive access to the actuator, e.g. to flash a color directly.
    pub fn actuator_mut(&mut self) -> &mut SmoothColorActuator<L> {
        &mut self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::packet::RadioPacket;
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    struct Led {
        color: Color,
    }

    impl RgbOutput for Led {
        type Error = Infallible;

        fn actuate(&mut self, color: Color) -> Result<(), Infallible> {
            self.color = color;
            Ok(())
        }
    }

    #[test]
    fn test_display_fades_to_aggregated_color() {
        let aggregator = SharedAggregator::new(Color::BLACK);
        let packet = RadioPacket {
            id: 2,
            color: Color::new(0, 100, 0),
            ..RadioPacket::default()
        };
        aggregator.record(&packet, 0).unwrap();

        let mut display = Display::new(Led::default(), DisplayConfig::default(), 0);
        assert_eq!(display.tick(&aggregator, 999), ActuatorState::Idle);
        assert_eq!(display.tick(&aggregator, 1_000), ActuatorState::Adjusting);
        assert_eq!(display.actuator().target(), Color::new(0, 100, 0));

        // The refresh at 2000 re-targets the same, still fresh, sender one step
        // short of it; the last step then follows a longer interval.
        for now in 1_001..=2_300 {
            let _ = display.tick(&aggregator, now);
        }
        assert_eq!(display.actuator().current(), Color::new(0, 100, 0));
        assert_eq!(display.actuator().led().color, Color::new(0, 100, 0));
    }

    #[test]
    fn test_display_falls_back_to_background() {
        let aggregator = SharedAggregator::new(Color::new(0, 0, 40));
        let mut display = Display::new(Led::default(), DisplayConfig::default(), 0);
        for now in 0..=2_100 {
            let _ = display.tick(&aggregator, now);
        }
        assert_eq!(display.actuator().current(), Color::new(0, 0, 40));
    }
}
