//! Battery reporting and the receive power policy.

use core::fmt;

use crate::consts::{BATTERY_MV_PER_PERCENT, BATTERY_REPORT_PERIOD_MS};
use crate::fmt::Dbg;
use crate::timer::Periodic;

/// Source of battery voltage readings.
pub trait BatteryMonitor {
    /// ADC or driver error.
    type Error: fmt::Debug;

    /// Battery voltage in millivolts.
    fn read_millivolts(&mut self) -> Result<u16, Self::Error>;
}

impl<T: BatteryMonitor + ?Sized> BatteryMonitor for &mut T {
    type Error = T::Error;

    fn read_millivolts(&mut self) -> Result<u16, Self::Error> {
        (**self).read_millivolts()
    }
}

/// Battery level in percent, as published by the BLE battery service.
///
/// ```rust
/// use magicpath::power::battery_level;
///
/// assert_eq!(battery_level(2_400), 80);
/// assert_eq!(battery_level(3_300), 100);
/// ```
pub const fn battery_level(millivolts: u16) -> u8 {
    let percent = millivolts / BATTERY_MV_PER_PERCENT as u16;
    if percent > 100 { 100 } else { percent as u8 }
}

/// Samples a [`BatteryMonitor`] every [`BATTERY_REPORT_PERIOD_MS`].
#[derive(Debug)]
pub struct BatteryReporter<B> {
    monitor: B,
    period: Periodic,
    level: Option<u8>,
}

impl<B: BatteryMonitor> BatteryReporter<B> {
    /// Creates a reporter; the first sample is taken one period after `now_ms`.
    pub fn new(monitor: B, now_ms: u64) -> Self {
        Self {
            monitor,
            period: Periodic::new(BATTERY_REPORT_PERIOD_MS, now_ms),
            level: None,
        }
    }

    /// Samples the battery if a report is due.
    ///
    /// # Returns
    /// The new level when a sample was taken and succeeded, `None` otherwise.
    /// A failed sample keeps the previous [`level`](Self::level).
    pub fn poll(&mut self, now_ms: u64) -> Option<u8> {
        if !self.period.poll(now_ms) {
            return None;
        }
        match self.monitor.read_millivolts() {
            Ok(mv) => {
                let level = battery_level(mv);
                debug!("Battery {} mV, {}%", mv, level);
                self.level = Some(level);
                Some(level)
            }
            Err(e) => {
                warn!("Battery reading failed: {}", Dbg(&e));
                None
            }
        }
    }

    /// Last reported level.
    pub fn level(&self) -> Option<u8> {
        self.level
    }
}

/// Decides, once per scan pass, whether the receiver may use the radio.
pub trait PowerPolicy {
    /// `false` makes the pass skip every receive and only sleep.
    fn radio_enabled(&mut self) -> bool;
}

/// Receive on every pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlwaysOn;

impl PowerPolicy for AlwaysOn {
    fn radio_enabled(&mut self) -> bool {
        true
    }
}

/// Stops receiving while the battery is below `threshold_mv`.
#[derive(Debug)]
pub struct LowBatteryCutoff<B> {
    monitor: B,
    /// Voltage below which the radio stays off.
    pub threshold_mv: u16,
    enabled: bool,
}

impl<B: BatteryMonitor> LowBatteryCutoff<B> {
    /// Starts enabled; the first pass takes the first reading.
    pub fn new(monitor: B, threshold_mv: u16) -> Self {
        Self {
            monitor,
            threshold_mv,
            enabled: true,
        }
    }
}

impl<B: BatteryMonitor> PowerPolicy for LowBatteryCutoff<B> {
    fn radio_enabled(&mut self) -> bool {
        match self.monitor.read_millivolts() {
            Ok(mv) => {
                let enabled = mv >= self.threshold_mv;
                if enabled != self.enabled {
                    info!("Battery at {} mV, radio receive enabled: {}", mv, enabled);
                }
                self.enabled = enabled;
            }
            Err(e) => warn!("Battery reading failed: {}", Dbg(&e)),
        }
        self.enabled
    }
}
