//! Error types.
//!
//! Nothing in this crate escalates past the scan or transmit loop: errors are
//! returned to the caller of a single operation, logged there, and the loop
//! carries on with its next cycle.

use thiserror::Error;

use crate::consts::{MAX_SCAN_CHANNELS, MAX_SENDERS, PACKET_LEN};
use crate::packet::PacketField;

/// Protocol, configuration and storage errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Error {
    /// A packet carried a sender id outside `0..MAX_SENDERS`.
    #[error("sender id {0} is outside 0..{max}", max = MAX_SENDERS)]
    InvalidSenderId(u8),

    /// A byte slice of the wrong length was offered as a packet.
    #[error("expected {expected} packet bytes, got {0}", expected = PACKET_LEN)]
    PacketLength(usize),

    /// A characteristic access ran past the end of its packet field.
    #[error("{len} bytes at offset {offset} do not fit the {field} field")]
    InvalidOffset {
        /// Field being accessed.
        field: PacketField,
        /// Offset requested by the client.
        offset: usize,
        /// Number of bytes requested or supplied.
        len: usize,
    },

    /// The scan list is empty.
    #[error("the scan channel list is empty")]
    NoScanChannels,

    /// The scan list does not fit the fixed-capacity channel buffer.
    #[error("more than {max} scan channels", max = MAX_SCAN_CHANNELS)]
    TooManyScanChannels,

    /// The activator transmits on a channel no receiver visits.
    #[error("transmit channel {0} is not in the scan list")]
    UnscannedChannel(u8),

    /// A receiver would listen for less than one transmit period per channel.
    #[error(
        "receive window of {receive_timeout_ms} ms does not cover a transmit period of {transmit_period_ms} ms"
    )]
    ReceiveWindowTooShort {
        /// Per-channel receive timeout.
        receive_timeout_ms: u32,
        /// Activator re-transmit period.
        transmit_period_ms: u32,
    },

    /// The persistent storage rejected a read or write.
    #[error("persistent storage access failed")]
    Storage,
}
