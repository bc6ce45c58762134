//! Runtime configuration of the radio roles.
//!
//! Defaults reproduce the deployed fleet: the activator pins channel
//! [`ACTIVATOR_CHANNEL`] and re-sends every [`TRANSMIT_PERIOD_MS`]; fireflies
//! sweep [`DEFAULT_SCAN_CHANNELS`] with a [`RECEIVE_TIMEOUT_MS`] window each.
//! [`Deployment::validate`] turns the implicit agreement between the two into
//! a startup check.

use heapless::Vec;

use crate::consts::{
    ACTIVATOR_CHANNEL, DEFAULT_SCAN_CHANNELS, DISPLAY_REFRESH_MS, DISPLAY_TRANSITION_MS,
    MAX_SCAN_CHANNELS, RECEIVE_TIMEOUT_MS, SCAN_PAUSE_MS, TRANSMIT_PERIOD_MS,
};
use crate::error::Error;

/// Receive-side scan settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ScanConfig {
    /// Channels visited, in order, on every pass.
    pub channels: Vec<u8, MAX_SCAN_CHANNELS>,
    /// Listening time per channel.
    pub receive_timeout_ms: u32,
    /// Sleep after each full pass.
    pub pause_ms: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            channels: DEFAULT_SCAN_CHANNELS.iter().copied().collect(),
            receive_timeout_ms: RECEIVE_TIMEOUT_MS,
            pause_ms: SCAN_PAUSE_MS,
        }
    }
}

impl ScanConfig {
    /// Scan settings for an arbitrary channel list.
    ///
    /// # Errors
    /// [`Error::NoScanChannels`] for an empty list,
    /// [`Error::TooManyScanChannels`] beyond [`MAX_SCAN_CHANNELS`].
    pub fn with_channels(channels: &[u8]) -> Result<Self, Error> {
        if channels.is_empty() {
            return Err(Error::NoScanChannels);
        }
        let channels = Vec::from_slice(channels).map_err(|_| Error::TooManyScanChannels)?;
        Ok(Self {
            channels,
            ..Self::default()
        })
    }
}

/// Transmit-side settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TransmitConfig {
    /// Fixed transmit channel.
    pub channel: u8,
    /// Delay between two transmissions.
    pub period_ms: u32,
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            channel: ACTIVATOR_CHANNEL,
            period_ms: TRANSMIT_PERIOD_MS,
        }
    }
}

/// Display refresh settings of a receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct DisplayConfig {
    /// How often the aggregated color is recomputed.
    pub refresh_period_ms: u32,
    /// Fade duration towards each recomputed color.
    pub transition_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_period_ms: DISPLAY_REFRESH_MS,
            transition_ms: DISPLAY_TRANSITION_MS,
        }
    }
}

/// Settings shared by every device of one installation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Deployment {
    /// How receivers scan.
    pub scan: ScanConfig,
    /// How activators transmit.
    pub transmit: TransmitConfig,
}

impl Deployment {
    /// Checks that activators and receivers can actually hear each other.
    ///
    /// # Errors
    /// - [`Error::NoScanChannels`] if receivers scan nothing
    /// - [`Error::UnscannedChannel`] if the activator channel is never visited
    /// - [`Error::ReceiveWindowTooShort`] if a receive window can fall entirely
    ///   between two transmissions
    pub fn validate(&self) -> Result<(), Error> {
        if self.scan.channels.is_empty() {
            return Err(Error::NoScanChannels);
        }
        if !self.scan.channels.contains(&self.transmit.channel) {
            return Err(Error::UnscannedChannel(self.transmit.channel));
        }
        if self.scan.receive_timeout_ms <= self.transmit.period_ms {
            return Err(Error::ReceiveWindowTooShort {
                receive_timeout_ms: self.scan.receive_timeout_ms,
                transmit_period_ms: self.transmit.period_ms,
            });
        }
        info!(
            "Deployment ok: transmit channel {}, {} scan channels",
            self.transmit.channel,
            self.scan.channels.len()
        );
        Ok(())
    }
}
