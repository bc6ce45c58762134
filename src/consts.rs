//! Constants used across the marker radio protocol.
//!
//! This module defines the protocol-wide constants for packet sizing,
//! sender bookkeeping, scan and transmit cadence, LED transitions and
//! the persistent record layout.
//!
//! ## Key Concepts
//!
//! - **Packet**: a fixed 8-byte broadcast frame, see [`crate::packet`].
//! - **Senders**: up to [`MAX_SENDERS`] anonymous devices, identified by a small id.
//! - **Stale window**: how long a sender keeps contributing after its last packet.
//! - **Cadence**: the activator re-sends every [`TRANSMIT_PERIOD_MS`]; a firefly
//!   listens [`RECEIVE_TIMEOUT_MS`] per channel, then pauses [`SCAN_PAUSE_MS`].
//!
//! The receive window is deliberately longer than the transmit period so that a
//! visited channel carrying a transmitter catches at least one frame per pass.

/// Length (in bytes) of an encoded radio packet.
///
/// Layout: `id, r, g, b, r_background, g_background, b_background, configure_mode`.
pub const PACKET_LEN: usize = 8;

/// See [`PACKET_LEN`](crate::consts::PACKET_LEN)
pub const PACKET_LEN_U8: u8 = PACKET_LEN as u8;

/// Number of sender slots tracked by the aggregator. Valid ids are `0..MAX_SENDERS`.
pub const MAX_SENDERS: usize = 20;

/// A sender stops contributing once `now - last_seen >= STALE_WINDOW_MS`.
pub const STALE_WINDOW_MS: u64 = 3_000;

/// Channels visited by a receiving device on every scan pass.
pub const DEFAULT_SCAN_CHANNELS: [u8; 4] = [0, 1, 2, 3];

/// Upper bound on the number of channels in a scan list.
pub const MAX_SCAN_CHANNELS: usize = 8;

/// How long a receiver listens on each channel, in milliseconds.
pub const RECEIVE_TIMEOUT_MS: u32 = 63;

/// Pause after a full scan pass, in milliseconds.
///
/// Bounds the radio duty cycle of a battery powered receiver.
pub const SCAN_PAUSE_MS: u32 = 810;

/// Channel the activator transmits on.
pub const ACTIVATOR_CHANNEL: u8 = 1;

/// Delay between two consecutive activator transmissions, in milliseconds.
pub const TRANSMIT_PERIOD_MS: u32 = 36;

/// Upper bound on waiting for the end-of-packet signal after `STX`.
pub const TRANSMIT_TIMEOUT_MS: u32 = 100;

/// How often a receiver recomputes its display color.
pub const DISPLAY_REFRESH_MS: u32 = 1_000;

/// Duration of the fade towards a newly computed display color.
pub const DISPLAY_TRANSITION_MS: u32 = 1_000;

/// How often the battery voltage is sampled and reported.
pub const BATTERY_REPORT_PERIOD_MS: u32 = 5_000;

/// Millivolts per battery level percent: `level = mv / 30`, capped at 100.
pub const BATTERY_MV_PER_PERCENT: u32 = 30;

/// Tag placed in front of the persisted activator packet.
///
/// A record whose tag differs is treated as uninitialized storage.
pub const PACKET_RECORD_MAGIC: u32 = 0x4d50_0108;

/// Byte offset of the persisted packet record inside the EEPROM.
pub const PACKET_RECORD_OFFSET: u32 = 0;

/// Length of the persisted record: 4 magic bytes followed by the packet.
pub const PACKET_RECORD_LEN: usize = 4 + PACKET_LEN;
