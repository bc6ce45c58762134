//! Fixed-format broadcast packet and its byte-exact wire encoding.
//!
//! Every marker device on the air speaks the same 8-byte frame. The layout is
//! defined here field by field, never by memory layout, so that two devices
//! built with different toolchains always agree on the bytes.
//!
//! ## Wire Layout
//!
//! | Offset | Field            | Meaning                                      |
//! |--------|------------------|----------------------------------------------|
//! | 0      | `id`             | sender identity, `0..MAX_SENDERS` valid      |
//! | 1..4   | `color`          | sender's marker color, `r, g, b`             |
//! | 4..7   | `background`     | proposed background color, `r, g, b`         |
//! | 7      | `configure_mode` | `0` normal, anything else updates background |
//!
//! The same byte ranges are exposed one by one as BLE characteristics on the
//! activator, see [`PacketField`].
//!
//! ## Validation
//!
//! Decoding never fails: any 8 bytes are *some* packet. Whether `id` is usable
//! is decided by the consumer, [`crate::aggregator::ColorAggregator`].

use core::fmt;
use core::ops::Range;

use crate::color::Color;
use crate::consts::PACKET_LEN;
use crate::error::Error;

/// One broadcast frame.
///
/// ```
/// use magicpath::color::Color;
/// use magicpath::packet::RadioPacket;
///
/// let packet = RadioPacket {
///     id: 1,
///     color: Color::new(0, 255, 0),
///     background_color: Color::BLACK,
///     configure_mode: false,
/// };
/// assert_eq!(packet.encode(), [1, 0, 255, 0, 0, 0, 0, 0]);
/// assert_eq!(RadioPacket::decode(&packet.encode()), packet);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct RadioPacket {
    /// Sender identity.
    pub id: u8,
    /// Sender's current marker color.
    pub color: Color,
    /// Background color proposed to receivers, applied only in configure mode.
    pub background_color: Color,
    /// When set, receivers adopt `background_color`.
    pub configure_mode: bool,
}

impl RadioPacket {
    /// Serializes the packet into its 8 wire bytes.
    pub const fn encode(&self) -> [u8; PACKET_LEN] {
        [
            self.id,
            self.color.r,
            self.color.g,
            self.color.b,
            self.background_color.r,
            self.background_color.g,
            self.background_color.b,
            self.configure_mode as u8,
        ]
    }

    /// Parses 8 wire bytes. Any non-zero configure byte reads as `true`.
    pub const fn decode(bytes: &[u8; PACKET_LEN]) -> Self {
        Self {
            id: bytes[0],
            color: Color::new(bytes[1], bytes[2], bytes[3]),
            background_color: Color::new(bytes[4], bytes[5], bytes[6]),
            configure_mode: bytes[7] != 0,
        }
    }

    /// Parses a slice that must be exactly [`PACKET_LEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let raw: &[u8; PACKET_LEN] = bytes
            .try_into()
            .map_err(|_| Error::PacketLength(bytes.len()))?;
        Ok(Self::decode(raw))
    }

    /// Copies the bytes of `field`, starting `offset` bytes into it, into `out`.
    ///
    /// Mirrors a GATT read: at most `out.len()` bytes are copied and the number
    /// copied is returned. An offset past the end of the field is rejected.
    pub fn read_field(&self, field: PacketField, offset: usize, out: &mut [u8]) -> Result<usize, Error> {
        if offset > field.len() {
            return Err(Error::InvalidOffset {
                field,
                offset,
                len: out.len(),
            });
        }
        let raw = self.encode();
        let available = &raw[field.range()][offset..];
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        Ok(n)
    }

    /// Overwrites part of `field` with `data`, starting `offset` bytes into it.
    ///
    /// Mirrors a GATT write: `offset + data.len()` must stay inside the field,
    /// otherwise nothing is changed.
    pub fn write_field(&mut self, field: PacketField, offset: usize, data: &[u8]) -> Result<(), Error> {
        let fits = offset
            .checked_add(data.len())
            .is_some_and(|end| end <= field.len());
        if !fits {
            return Err(Error::InvalidOffset {
                field,
                offset,
                len: data.len(),
            });
        }
        let mut raw = self.encode();
        let start = field.range().start + offset;
        raw[start..start + data.len()].copy_from_slice(data);
        *self = Self::decode(&raw);
        Ok(())
    }
}

impl TryFrom<&[u8]> for RadioPacket {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl From<RadioPacket> for [u8; PACKET_LEN] {
    fn from(packet: RadioPacket) -> Self {
        packet.encode()
    }
}

/// A packet field as exposed through its own BLE characteristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PacketField {
    /// Byte `[0, 1)`.
    Id,
    /// Bytes `[1, 4)`.
    Color,
    /// Bytes `[4, 7)`.
    BackgroundColor,
    /// Byte `[7, 8)`.
    ConfigureMode,
}

impl PacketField {
    /// All fields in wire order.
    pub const ALL: [PacketField; 4] = [
        PacketField::Id,
        PacketField::Color,
        PacketField::BackgroundColor,
        PacketField::ConfigureMode,
    ];

    /// Byte range of the field inside the encoded packet.
    pub const fn range(self) -> Range<usize> {
        match self {
            PacketField::Id => 0..1,
            PacketField::Color => 1..4,
            PacketField::BackgroundColor => 4..7,
            PacketField::ConfigureMode => 7..8,
        }
    }

    /// Width of the field in bytes.
    pub const fn len(self) -> usize {
        let range = self.range();
        range.end - range.start
    }
}

impl fmt::Display for PacketField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PacketField::Id => "id",
            PacketField::Color => "color",
            PacketField::BackgroundColor => "background color",
            PacketField::ConfigureMode => "configure mode",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RadioPacket {
        RadioPacket {
            id: 3,
            color: Color::new(10, 20, 30),
            background_color: Color::new(40, 50, 60),
            configure_mode: true,
        }
    }

    #[test]
    fn test_encode_field_order() {
        assert_eq!(sample().encode(), [3, 10, 20, 30, 40, 50, 60, 1]);
    }

    #[test]
    fn test_decode_is_inverse_of_encode() {
        let colors = [
            Color::BLACK,
            Color::WHITE,
            Color::new(1, 2, 3),
            Color::new(0x80, 0x7f, 0x01),
            Color::new(255, 0, 255),
        ];
        for id in 0..=u8::MAX {
            for configure_mode in [false, true] {
                for (i, &color) in colors.iter().enumerate() {
                    let background_color = colors[(i + 1) % colors.len()];
                    let p = RadioPacket {
                        id,
                        color,
                        background_color,
                        configure_mode,
                    };
                    let bytes = p.encode();
                    assert_eq!(bytes[0], id);
                    assert_eq!(bytes[1..4], [color.r, color.g, color.b]);
                    assert_eq!(
                        bytes[4..7],
                        [background_color.r, background_color.g, background_color.b]
                    );
                    assert_eq!(bytes[7], u8::from(configure_mode));
                    assert_eq!(RadioPacket::decode(&bytes), p);
                }
            }
        }
    }

    #[test]
    fn test_decode_accepts_any_bytes() {
        let p = RadioPacket::decode(&[200, 1, 2, 3, 4, 5, 6, 0x7f]);
        assert_eq!(p.id, 200);
        assert!(p.configure_mode);
        assert_eq!(p.background_color, Color::new(4, 5, 6));
    }

    #[test]
    fn test_from_slice_checks_length() {
        assert_eq!(
            RadioPacket::from_slice(&[1, 2, 3]),
            Err(Error::PacketLength(3))
        );
        let p = RadioPacket::try_from(&[0u8; 8][..]);
        assert_eq!(p, Ok(RadioPacket::default()));
    }

    #[test]
    fn test_field_ranges_tile_the_packet() {
        let mut next = 0;
        for field in PacketField::ALL {
            assert_eq!(field.range().start, next);
            next = field.range().end;
        }
        assert_eq!(next, PACKET_LEN);
    }

    #[test]
    fn test_write_field_with_offset() {
        let mut p = sample();
        p.write_field(PacketField::Color, 1, &[99, 98]).unwrap();
        assert_eq!(p.color, Color::new(10, 99, 98));
        assert_eq!(p.background_color, Color::new(40, 50, 60));
    }

    #[test]
    fn test_write_field_rejects_overrun() {
        let mut p = sample();
        let err = p.write_field(PacketField::Id, 0, &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidOffset {
                field: PacketField::Id,
                offset: 0,
                len: 2
            }
        );
        assert!(p.write_field(PacketField::BackgroundColor, 2, &[1, 2]).is_err());
        assert_eq!(p, sample());
    }

    #[test]
    fn test_write_configure_mode_normalizes() {
        let mut p = RadioPacket::default();
        p.write_field(PacketField::ConfigureMode, 0, &[5]).unwrap();
        assert!(p.configure_mode);
        assert_eq!(p.encode()[7], 1);
    }

    #[test]
    fn test_read_field_honours_offset_and_buffer() {
        let p = sample();
        let mut out = [0u8; 3];
        assert_eq!(p.read_field(PacketField::BackgroundColor, 0, &mut out), Ok(3));
        assert_eq!(out, [40, 50, 60]);

        let mut short = [0u8; 1];
        assert_eq!(p.read_field(PacketField::Color, 1, &mut short), Ok(1));
        assert_eq!(short, [20]);

        assert_eq!(p.read_field(PacketField::Id, 1, &mut out), Ok(0));
        assert!(p.read_field(PacketField::Id, 2, &mut out).is_err());
    }
}
