use crate::actuator::RgbOutput;
use crate::aggregator::SharedAggregator;
use crate::display::Display;
use crate::timer::Clock;
use embedded_hal::delay::DelayNs;

/// Runs a blocking loop that repeatedly ticks the display task.
///
/// This is a simple timing loop for use in environments where interrupts are unavailable
/// or undesired, typically a dedicated RTOS thread next to the scan loop.
///
/// # Arguments
/// - `display`: The display task.
/// - `aggregator`: The aggregator the scan loop records into.
/// - `clock`: The millisecond time source.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `tick_ms`: The delay between two ticks, a few milliseconds keeps fades smooth.
///
/// # Example
/// ```rust,ignore
/// use magicpath::timer::run_display_loop;
/// let mut display = Display::new(led, DisplayConfig::default(), clock.now_ms());
/// run_display_loop(&mut display, &AGGREGATOR, &clock, &mut delay, 5);
/// ```
///
/// # Notes
/// - This loop will never return.
/// - Fade steps missed by a coarse `tick_ms` are caught up on the next tick.
pub fn run_display_loop<L, C, D>(
    display: &mut Display<L>,
    aggregator: &SharedAggregator,
    clock: &C,
    delay: &mut D,
    tick_ms: u32,
) -> !
where
    L: RgbOutput,
    C: Clock,
    D: DelayNs,
{
    loop {
        let _ = display.tick(aggregator, clock.now_ms());
        delay.delay_ms(tick_ms);
    }
}
