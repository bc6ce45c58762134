//! Persistence of the activator packet across power cycles.
//!
//! The record is [`PACKET_RECORD_LEN`] bytes at [`PACKET_RECORD_OFFSET`]: a
//! little-endian [`PACKET_RECORD_MAGIC`] followed by the encoded packet. A
//! missing or foreign magic means the storage was never written by this
//! firmware and the default packet is stored instead.

use core::fmt;

use embedded_storage::Storage;

use crate::consts::{PACKET_LEN, PACKET_RECORD_LEN, PACKET_RECORD_MAGIC, PACKET_RECORD_OFFSET};
use crate::error::Error;
use crate::fmt::Dbg;
use crate::packet::RadioPacket;

const MAGIC_LEN: usize = PACKET_RECORD_LEN - PACKET_LEN;

/// A [`RadioPacket`] kept in non-volatile storage.
#[derive(Debug)]
pub struct PersistentPacket<S> {
    storage: S,
}

impl<S> PersistentPacket<S>
where
    S: Storage,
    S::Error: fmt::Debug,
{
    /// Wraps a storage region large enough for one record.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Loads the stored packet, or stores and returns `default` if there is
    /// none.
    ///
    /// # Errors
    /// [`Error::Storage`] if the read fails, or if the default cannot be written.
    pub fn load_or_init(&mut self, default: RadioPacket) -> Result<RadioPacket, Error> {
        let mut record = [0u8; PACKET_RECORD_LEN];
        self.storage
            .read(PACKET_RECORD_OFFSET, &mut record)
            .map_err(|e| storage_error("read", e))?;

        let (magic, body) = record.split_at(MAGIC_LEN);
        let mut magic_bytes = [0u8; MAGIC_LEN];
        magic_bytes.copy_from_slice(magic);
        if u32::from_le_bytes(magic_bytes) == PACKET_RECORD_MAGIC {
            let packet = RadioPacket::from_slice(body)?;
            debug!("Loaded stored packet for id {}", packet.id);
            return Ok(packet);
        }

        info!("No stored packet, initializing");
        self.save(&default)?;
        Ok(default)
    }

    /// Writes `packet` with the record magic.
    ///
    /// # Errors
    /// [`Error::Storage`] if the write fails.
    pub fn save(&mut self, packet: &RadioPacket) -> Result<(), Error> {
        let mut record = [0u8; PACKET_RECORD_LEN];
        record[..MAGIC_LEN].copy_from_slice(&PACKET_RECORD_MAGIC.to_le_bytes());
        record[MAGIC_LEN..].copy_from_slice(&packet.encode());
        self.storage
            .write(PACKET_RECORD_OFFSET, &record)
            .map_err(|e| storage_error("write", e))
    }

    /// Releases the storage.
    pub fn release(self) -> S {
        self.storage
    }
}

fn storage_error<E: fmt::Debug>(op: &'static str, e: E) -> Error {
    warn!("Storage {} failed: {}", op, Dbg(&e));
    Error::Storage
}
