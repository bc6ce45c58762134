/// Declares a static global `DISPLAY` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `DISPLAY` suitable for use in
/// interrupt-based environments, where both the main thread and an ISR need
/// to safely access the display task.
///
/// # Arguments
/// - `$led`: The concrete LED type (must implement `RgbOutput`)
///
/// # Example
/// ```rust,ignore
/// init_display!(BoardLed);
/// ```
#[macro_export]
macro_rules! init_display {
    ( $led:ty ) => {
        pub static DISPLAY: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::display::Display<$led>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Installs a display task in the global `DISPLAY` created by `init_display!`.
///
/// # Arguments
/// - `$led`: The LED value
/// - `$config`: Optional `DisplayConfig`, defaults to `DisplayConfig::default()`
/// - `$now`: The current time in milliseconds
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     setup_display!(led, uptime_ms());
/// }
/// ```
#[macro_export]
macro_rules! setup_display {
    ( $led:expr, $now:expr ) => {
        $crate::setup_display!($led, $crate::config::DisplayConfig::default(), $now)
    };
    ( $led:expr, $config:expr, $now:expr ) => {
        $crate::critical_section::with(|cs| {
            let _ = DISPLAY
                .borrow(cs)
                .replace(Some($crate::display::Display::new($led, $config, $now)));
        })
    };
}

/// Ticks the global `DISPLAY` if it has been set up.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     tick_display!(&AGGREGATOR, uptime_ms());
/// }
/// ```
///
/// # Notes
/// - Safe to call before `setup_display!`; it does nothing then.
#[macro_export]
macro_rules! tick_display {
    ( $aggregator:expr, $now:expr ) => {
        $crate::critical_section::with(|cs| {
            if let Some(display) = DISPLAY.borrow(cs).borrow_mut().as_mut() {
                let _ = display.tick($aggregator, $now);
            }
        })
    };
}
