//! CC1101 sub-GHz transceiver driver.
//!
//! This module provides [`Cc1101`], a blocking driver for the TI CC1101 over an
//! `embedded-hal` [`SpiDevice`], with the GDO0 line wired to an input pin.
//! It implements [`Transceiver`] for fixed-length [`PACKET_LEN`] frames.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::digital::Mock as Pin;
//! # use embedded_hal_mock::eh1::spi::Mock as Spi;
//! use magicpath::driver::{Cc1101, Cc1101Config, RadioMode};
//!
//! # let mut spi = Spi::new(&[]);
//! # let mut gdo0 = Pin::new(&[]);
//! let radio = Cc1101::new(spi.clone(), gdo0.clone(), NoopDelay, Cc1101Config::default());
//! assert_eq!(radio.mode, RadioMode::Idle);
//! # spi.done();
//! # gdo0.done();
//! ```
//!
//! ## Design Notes
//!
//! The radio is configured for fixed-length packets with a hardware CRC and
//! two appended status bytes, and GDO0 asserts on sync word and deasserts at
//! the end of the packet. Every wait on GDO0 is bounded; the driver never
//! blocks forever on a missing edge.
//!
//! For the register map and RF profile, see [`crate::regs`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin};
use embedded_hal::spi::{self, SpiDevice};
use thiserror::Error;

use crate::consts::{PACKET_LEN, PACKET_LEN_U8, TRANSMIT_TIMEOUT_MS};
use crate::radio::Transceiver;
use crate::regs::{
    APPENDED_STATUS_LEN, BURST_FLAG, Config, FIFO, PKTSTATUS_CRC_OK, READ_FLAG, RF_PROFILE,
    Status, Strobe, TxPower,
};

/// Settling time after a reset strobe.
const RESET_SETTLE_MS: u32 = 40;

/// Failure while talking to the CC1101.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RadioError<SPI, PIN> {
    /// SPI transfer failed.
    #[error("SPI error: {0:?}")]
    Spi(SPI),
    /// GDO0 could not be read.
    #[error("GDO0 pin error: {0:?}")]
    Pin(PIN),
    /// The end of a transmitted packet was never signalled.
    #[error("packet was not sent within the transmit timeout")]
    TransmitTimeout,
}

/// Operational state of the transceiver, as last commanded by the driver.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RadioMode {
    /// Powered down by [`Cc1101::power_down`]. Any SPI access wakes it up.
    Sleep,
    /// Calibrated and idle. The radio returns here after every packet.
    #[default]
    Idle,
    /// Sending one packet.
    Tx,
    /// Listening for one packet.
    Rx,
}

/// Driver tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Cc1101Config {
    /// Interval between two reads of GDO0 while waiting for a packet.
    pub poll_interval_us: u32,
    /// Upper bound on one transmission.
    pub tx_timeout_ms: u32,
    /// Output power written to the PA table on init.
    pub tx_power: TxPower,
}

impl Default for Cc1101Config {
    fn default() -> Self {
        Self {
            poll_interval_us: 250,
            tx_timeout_ms: TRANSMIT_TIMEOUT_MS,
            tx_power: TxPower::default(),
        }
    }
}

/// A TI CC1101 on an SPI bus.
///
/// ## Type Parameters
///
/// - `SPI`: the [`SpiDevice`] the chip is on (chip select is handled by the device)
/// - `GDO0`: the [`InputPin`] wired to GDO0
/// - `D`: a [`DelayNs`] used for the reset settle time and GDO0 polling
///
/// ## Notes
///
/// - One driver owns the radio. The receive and transmit loops each take it
///   by value or by `&mut`.
/// - Frames failing the hardware CRC are dropped and counted in `rx_bad`.
#[derive(Debug)]
pub struct Cc1101<SPI, GDO0, D>
where
    SPI: SpiDevice,
    GDO0: InputPin,
    D: DelayNs,
{
    /// The current mode of the radio.
    pub mode: RadioMode,
    spi: SPI,
    gdo0: GDO0,
    delay: D,
    config: Cc1101Config,
    channel: u8,
    sync_seen: bool,

    /// Counter of packets that left the radio.
    pub tx_good: u16,

    /// Counter of received packets that passed the CRC check.
    pub rx_good: u16,

    /// Counter of received packets dropped on a CRC failure.
    pub rx_bad: u16,

    /// Raw RSSI byte appended to the last good packet.
    pub last_rssi: u8,

    /// Raw LQI byte (CRC bit masked) appended to the last good packet.
    pub last_lqi: u8,
}

type Res<T, SPI, GDO0> = Result<
    T,
    RadioError<<SPI as spi::ErrorType>::Error, <GDO0 as digital::ErrorType>::Error>,
>;

impl<SPI, GDO0, D> Cc1101<SPI, GDO0, D>
where
    SPI: SpiDevice,
    GDO0: InputPin,
    D: DelayNs,
{
    /// Wraps the bus, pin and delay. No SPI traffic happens until
    /// [`init`](Transceiver::init).
    pub fn new(spi: SPI, gdo0: GDO0, delay: D, config: Cc1101Config) -> Self {
        Self {
            mode: RadioMode::Idle,
            spi,
            gdo0,
            delay,
            config,
            channel: 0,
            sync_seen: false,
            tx_good: 0,
            rx_good: 0,
            rx_bad: 0,
            last_rssi: 0,
            last_lqi: 0,
        }
    }

    /// The channel the radio is tuned to.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Releases the bus, pin and delay.
    pub fn release(self) -> (SPI, GDO0, D) {
        (self.spi, self.gdo0, self.delay)
    }

    /// Sends a command strobe.
    pub fn strobe(&mut self, strobe: Strobe) -> Res<(), SPI, GDO0> {
        self.spi
            .write(&[strobe.addr()])
            .map_err(RadioError::Spi)
    }

    /// Writes one configuration register.
    pub fn write_register(&mut self, reg: Config, value: u8) -> Res<(), SPI, GDO0> {
        self.spi
            .write(&[reg.addr(), value])
            .map_err(RadioError::Spi)
    }

    /// Reads one status register.
    pub fn read_status(&mut self, reg: Status) -> Res<u8, SPI, GDO0> {
        let mut buf = [reg.read_header(), 0];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(RadioError::Spi)?;
        Ok(buf[1])
    }

    /// Puts the radio into its lowest power state.
    ///
    /// The radio wakes up on the next SPI access; call
    /// [`init`](Transceiver::init) again afterwards, the configuration
    /// registers survive but the PA table does not.
    pub fn power_down(&mut self) -> Res<(), SPI, GDO0> {
        self.strobe(Strobe::SIDLE)?;
        self.strobe(Strobe::SPWD)?;
        self.mode = RadioMode::Sleep;
        Ok(())
    }

    /// Checks whether the packet in flight has completed.
    ///
    /// GDO0 goes high on the sync word and low again at the end of the packet.
    /// This returns `Ok(())` once both edges have been observed since the last
    /// [`transmit`](Transceiver::transmit) or [`receive`](Transceiver::receive)
    /// started, and [`nb::Error::WouldBlock`] until then.
    pub fn poll_end_of_packet(
        &mut self,
    ) -> nb::Result<(), RadioError<SPI::Error, GDO0::Error>> {
        let high = self
            .gdo0
            .is_high()
            .map_err(|e| nb::Error::Other(RadioError::Pin(e)))?;
        if high {
            self.sync_seen = true;
            Err(nb::Error::WouldBlock)
        } else if self.sync_seen {
            self.sync_seen = false;
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Polls [`poll_end_of_packet`](Self::poll_end_of_packet) for up to
    /// `timeout_ms`. Returns whether the packet completed.
    fn wait_end_of_packet(&mut self, timeout_ms: u32) -> Res<bool, SPI, GDO0> {
        let interval = self.config.poll_interval_us.max(1);
        let polls = timeout_ms.saturating_mul(1_000) / interval;
        self.sync_seen = false;
        for _ in 0..polls.max(1) {
            match self.poll_end_of_packet() {
                Ok(()) => return Ok(true),
                Err(nb::Error::WouldBlock) => self.delay.delay_us(interval),
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
        Ok(false)
    }

    /// Sets the packet length and recalibrates the synthesizer, as done
    /// before every packet.
    fn prepare(&mut self) -> Res<(), SPI, GDO0> {
        self.write_register(Config::PKTLEN, PACKET_LEN_U8)?;
        self.strobe(Strobe::SIDLE)?;
        self.strobe(Strobe::SCAL)?;
        self.mode = RadioMode::Idle;
        Ok(())
    }

    fn read_fifo(&mut self) -> Res<[u8; PACKET_LEN], SPI, GDO0> {
        let mut buf = [0u8; 1 + PACKET_LEN + APPENDED_STATUS_LEN];
        buf[0] = FIFO | READ_FLAG | BURST_FLAG;
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(RadioError::Spi)?;
        let mut frame = [0u8; PACKET_LEN];
        frame.copy_from_slice(&buf[1..=PACKET_LEN]);
        self.last_rssi = buf[1 + PACKET_LEN];
        self.last_lqi = buf[2 + PACKET_LEN] & !PKTSTATUS_CRC_OK;
        Ok(frame)
    }
}

impl<SPI, GDO0, D> Transceiver for Cc1101<SPI, GDO0, D>
where
    SPI: SpiDevice,
    GDO0: InputPin,
    D: DelayNs,
{
    type Error = RadioError<SPI::Error, GDO0::Error>;

    /// Resets the chip and loads the RF profile.
    ///
    /// # Notes
    /// Leaves the radio idle on channel 0 with the configured output power.
    fn init(&mut self) -> Result<(), Self::Error> {
        self.strobe(Strobe::SRES)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        for &(reg, value) in RF_PROFILE {
            self.write_register(reg, value)?;
        }
        self.strobe(Strobe::SFRX)?;
        self.write_register(Config::PATABLE, self.config.tx_power.value())?;
        self.set_channel(0)?;
        self.mode = RadioMode::Idle;
        info!("CC1101 ready, PA {}", self.config.tx_power.value());
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error> {
        self.write_register(Config::CHANNR, channel)?;
        self.channel = channel;
        Ok(())
    }

    /// Sends one frame and waits for the end-of-packet edge.
    ///
    /// # Errors
    /// [`RadioError::TransmitTimeout`] if GDO0 does not complete a packet
    /// within `tx_timeout_ms`; the TX FIFO is flushed in that case.
    fn transmit(&mut self, frame: &[u8; PACKET_LEN]) -> Result<(), Self::Error> {
        self.prepare()?;
        let mut buf = [0u8; 1 + PACKET_LEN];
        buf[0] = FIFO | BURST_FLAG;
        buf[1..].copy_from_slice(frame);
        self.spi.write(&buf).map_err(RadioError::Spi)?;
        self.strobe(Strobe::STX)?;
        self.mode = RadioMode::Tx;

        let sent = self.wait_end_of_packet(self.config.tx_timeout_ms)?;
        self.mode = RadioMode::Idle;
        if !sent {
            self.strobe(Strobe::SIDLE)?;
            self.strobe(Strobe::SFTX)?;
            return Err(RadioError::TransmitTimeout);
        }
        self.tx_good = self.tx_good.wrapping_add(1);
        Ok(())
    }

    /// Listens on the current channel for up to `timeout_ms`.
    ///
    /// # Returns
    /// - `Ok(Some(frame))`: a frame arrived and passed the CRC check
    /// - `Ok(None)`: nothing arrived, or the frame was corrupt
    fn receive(&mut self, timeout_ms: u32) -> Result<Option<[u8; PACKET_LEN]>, Self::Error> {
        self.prepare()?;
        self.strobe(Strobe::SFRX)?;
        self.strobe(Strobe::SRX)?;
        self.mode = RadioMode::Rx;

        if !self.wait_end_of_packet(timeout_ms)? {
            self.strobe(Strobe::SIDLE)?;
            self.mode = RadioMode::Idle;
            return Ok(None);
        }
        self.mode = RadioMode::Idle;

        let status = self.read_status(Status::PKTSTATUS)?;
        if status & PKTSTATUS_CRC_OK == 0 {
            self.rx_bad = self.rx_bad.wrapping_add(1);
            warn!("Dropping frame, PKTSTATUS {}", status);
            self.strobe(Strobe::SFRX)?;
            return Ok(None);
        }
        let frame = self.read_fifo()?;
        self.rx_good = self.rx_good.wrapping_add(1);
        Ok(Some(frame))
    }
}
