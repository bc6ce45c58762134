//! Activator transmit side: the shared packet and the re-broadcast loop.

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

use crate::config::TransmitConfig;
use crate::error::Error;
use crate::fmt::Dbg;
use crate::packet::{PacketField, RadioPacket};
use crate::radio::Transceiver;

/// The packet an activator broadcasts, shared between the transmit loop and
/// the BLE write handlers.
///
/// Every access runs inside one critical section, so a reader never sees a
/// packet half way through a write.
pub struct PacketStore {
    inner: Mutex<Cell<RadioPacket>>,
}

impl fmt::Debug for PacketStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketStore")
            .field("packet", &self.snapshot())
            .finish()
    }
}

impl Default for PacketStore {
    fn default() -> Self {
        Self::new(RadioPacket::default())
    }
}

impl PacketStore {
    /// Wraps `packet`. Usable in a `static`.
    pub const fn new(packet: RadioPacket) -> Self {
        Self {
            inner: Mutex::new(Cell::new(packet)),
        }
    }

    /// Copy of the current packet.
    pub fn snapshot(&self) -> RadioPacket {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    /// Replaces the packet, returning the previous one.
    pub fn replace(&self, packet: RadioPacket) -> RadioPacket {
        critical_section::with(|cs| self.inner.borrow(cs).replace(packet))
    }

    /// Read-modify-write under one lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut RadioPacket) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut packet = cell.get();
            let result = f(&mut packet);
            cell.set(packet);
            result
        })
    }

    /// See [`RadioPacket::read_field`].
    pub fn read_field(&self, field: PacketField, offset: usize, out: &mut [u8]) -> Result<usize, Error> {
        self.snapshot().read_field(field, offset, out)
    }

    /// See [`RadioPacket::write_field`]. A rejected write changes nothing.
    pub fn write_field(&self, field: PacketField, offset: usize, data: &[u8]) -> Result<(), Error> {
        self.update(|packet| packet.write_field(field, offset, data))
    }
}

/// Re-broadcasts the [`PacketStore`] contents forever on a fixed channel.
///
/// ## Notes
///
/// - The packet is copied out of the store before the radio is touched, so
///   a BLE write never waits for a transmission to finish.
/// - A failed transmission is logged and counted; the next period retries.
#[derive(Debug)]
pub struct Transmitter<T> {
    radio: T,
    config: TransmitConfig,
    /// Transmissions the radio completed.
    pub tx_good: u32,
    /// Transmissions the radio failed.
    pub tx_errors: u32,
}

impl<T: Transceiver> Transmitter<T> {
    /// Takes ownership of the radio.
    pub fn new(radio: T, config: TransmitConfig) -> Self {
        Self {
            radio,
            config,
            tx_good: 0,
            tx_errors: 0,
        }
    }

    /// Initializes the radio and tunes the transmit channel.
    pub fn start(&mut self) -> Result<(), T::Error> {
        self.radio.init()?;
        self.radio.set_channel(self.config.channel)?;
        info!("Transmitting on channel {}", self.config.channel);
        Ok(())
    }

    /// Sends the current packet once. Returns whether the radio accepted it.
    pub fn transmit_once(&mut self, store: &PacketStore) -> bool {
        let frame = store.snapshot().encode();
        match self.radio.transmit(&frame) {
            Ok(()) => {
                self.tx_good = self.tx_good.wrapping_add(1);
                true
            }
            Err(e) => {
                self.tx_errors = self.tx_errors.wrapping_add(1);
                warn!("Transmit failed: {}", Dbg(&e));
                false
            }
        }
    }

    /// Transmits every `period_ms`, forever.
    pub fn run<D: DelayNs>(&mut self, store: &PacketStore, delay: &mut D) -> ! {
        loop {
            let _ = self.transmit_once(store);
            delay.delay_ms(self.config.period_ms);
        }
    }

    /// The radio.
    pub fn radio(&self) -> &T {
        &self.radio
    }

    /// Releases the radio.
    pub fn release(self) -> T {
        self.radio
    }
}
