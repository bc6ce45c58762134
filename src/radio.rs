//! Half-duplex transceiver boundary.
//!
//! The scan and transmit loops only need four operations from the radio, all
//! blocking and all bounded: bring it up, tune a channel, send one frame,
//! wait a bounded time for one frame. [`crate::driver::Cc1101`] implements
//! them for the TI CC1101; tests and simulators implement them in memory.
//!
//! Frame integrity (CRC) is the transceiver's job. A frame returned from
//! [`Transceiver::receive`] has already passed the hardware check.

use core::fmt;

use crate::consts::PACKET_LEN;

/// One sub-GHz radio, owned by exactly one loop.
pub trait Transceiver {
    /// Transport or device error.
    type Error: fmt::Debug;

    /// Resets and configures the radio.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Tunes to `channel`.
    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Sends one frame and blocks until it is on the air.
    fn transmit(&mut self, frame: &[u8; PACKET_LEN]) -> Result<(), Self::Error>;

    /// Listens for up to `timeout_ms`.
    ///
    /// Returns `Ok(None)` when nothing valid arrived in time, which is the
    /// normal outcome on a quiet channel.
    fn receive(&mut self, timeout_ms: u32) -> Result<Option<[u8; PACKET_LEN]>, Self::Error>;
}

impl<T: Transceiver + ?Sized> Transceiver for &mut T {
    type Error = T::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        (**self).init()
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error> {
        (**self).set_channel(channel)
    }

    fn transmit(&mut self, frame: &[u8; PACKET_LEN]) -> Result<(), Self::Error> {
        (**self).transmit(frame)
    }

    fn receive(&mut self, timeout_ms: u32) -> Result<Option<[u8; PACKET_LEN]>, Self::Error> {
        (**self).receive(timeout_ms)
    }
}
