use crate::actuator::{ActuatorState, RgbOutput};
use crate::aggregator::SharedAggregator;
use crate::config::DisplayConfig;
use crate::display::Display;
use core::cell::RefCell;
use critical_section::Mutex;

/// Used to initialize the global static [`Display`] for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust
/// use core::cell::RefCell;
/// use core::convert::Infallible;
/// use critical_section::Mutex;
/// use magicpath::actuator::RgbOutput;
/// use magicpath::color::Color;
/// use magicpath::display::Display;
/// use magicpath::timer::global_display_init;
///
/// struct BoardLed;
///
/// impl RgbOutput for BoardLed {
///     type Error = Infallible;
///
///     fn actuate(&mut self, _color: Color) -> Result<(), Infallible> {
///         Ok(())
///     }
/// }
///
/// static DISPLAY: Mutex<RefCell<Option<Display<BoardLed>>>> = global_display_init();
/// ```
pub const fn global_display_init<L: RgbOutput>() -> Mutex<RefCell<Option<Display<L>>>> {
    Mutex::new(RefCell::new(None))
}

/// Installs a display task in the global slot.
///
/// # Arguments
/// * The global static `Display`
/// * The LED it drives
/// * Refresh and fade settings
/// * The current time; the first refresh is one period later
pub fn global_display_setup<L: RgbOutput>(
    global_display: &'static Mutex<RefCell<Option<Display<L>>>>,
    led: L,
    config: DisplayConfig,
    now_ms: u64,
) {
    critical_section::with(|cs| {
        let _ = global_display
            .borrow(cs)
            .replace(Some(Display::new(led, config, now_ms)));
    });
}

/// Advances the display at each timer interrupt.
///
/// # Returns
/// The actuator state, or `None` before [`global_display_setup`].
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     let _ = global_display_tick(&DISPLAY, &AGGREGATOR, uptime_ms());
/// }
/// ```
pub fn global_display_tick<L: RgbOutput>(
    global_display: &'static Mutex<RefCell<Option<Display<L>>>>,
    aggregator: &SharedAggregator,
    now_ms: u64,
) -> Option<ActuatorState> {
    critical_section::with(|cs| {
        global_display
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .map(|display| display.tick(aggregator, now_ms))
    })
}
