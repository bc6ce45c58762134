//! # magicpath
//!
//! A portable, no_std Rust implementation of the marker tag radio protocol:
//! activators broadcast an 8-byte color packet over a CC1101 sub-GHz radio,
//! and fireflies sweep a few channels, blend the colors of every sender heard
//! in the last three seconds and fade their RGB LED towards the result.
//!
//! The crate provides:
//! - the packet codec and the BLE characteristic view of it
//! - the multi-sender color aggregator
//! - the receive scan loop and the transmit loop over a [`radio::Transceiver`]
//! - a CC1101 driver on `embedded-hal` SPI, GPIO and delay traits
//! - an integer-only smooth color fade on three PWM channels
//! - interrupt-safe sharing with `critical-section`
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` |
//! | `timer-isr` (default) | Display task singleton ticked from a timer interrupt |
//! | `delay-loop`          | Blocking display loop paced by `embedded_hal::delay::DelayNs` |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Usage
//!
//! A firefly runs the scan loop on one thread and the display on a timer:
//!
//! ```rust,ignore
//! use magicpath::{aggregator::SharedAggregator, color::Color, config::ScanConfig};
//! use magicpath::driver::{Cc1101, Cc1101Config};
//! use magicpath::scan::Scanner;
//!
//! static AGGREGATOR: SharedAggregator = SharedAggregator::new(Color::BLACK);
//!
//! let radio = Cc1101::new(spi, gdo0, delay, Cc1101Config::default());
//! let mut scanner = Scanner::new(radio, ScanConfig::default());
//! scanner.start()?;
//! scanner.run(&AGGREGATOR, &clock, &mut sleep);
//! ```
//!
//! An activator serves BLE writes into a [`transmit::PacketStore`] and
//! re-broadcasts it:
//!
//! ```rust,ignore
//! static PACKET: PacketStore = PacketStore::new(RadioPacket::default());
//!
//! let mut activator = Activator::boot(&PACKET, eeprom, led, RadioPacket::default());
//! let mut transmitter = Transmitter::new(radio, TransmitConfig::default());
//! transmitter.start()?;
//! transmitter.run(&PACKET, &mut sleep);
//! ```
//!
//! ## Integration Notes
//!
//! - Only one loop may own the radio.
//! - [`config::Deployment::validate`] checks at startup that the transmit
//!   channel is scanned and that a receive window covers a transmit period.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub use critical_section;
pub use heapless;

pub mod activator;
pub mod actuator;
pub mod aggregator;
pub mod color;
pub mod config;
pub mod consts;
pub mod display;
pub mod driver;
pub mod error;
pub mod led;
pub mod packet;
pub mod power;
pub mod radio;
pub mod regs;
pub mod scan;
pub mod storage;
pub mod timer;
pub mod transmit;

pub use error::Error;
