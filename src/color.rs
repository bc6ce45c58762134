//! 8-bit RGB color and the integer stepping used for smooth fades.
//!
//! All arithmetic is per channel and integer only. A fade is a sequence of
//! [`Color::adjust`] calls spaced [`Color::delay_to_next_adjustment`] apart.

use core::ops::Add;

/// An RGB color with one byte per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// All channels off.
    pub const BLACK: Color = Color::new(0, 0, 0);

    /// All channels full.
    pub const WHITE: Color = Color::new(255, 255, 255);

    /// Creates a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the channels as `[r, g, b]`.
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Builds a color from `[r, g, b]`.
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Moves every channel one unit towards `target`, never past it.
    pub fn adjust(&mut self, target: Color) {
        self.adjust_by(target, 1);
    }

    /// Moves every channel up to `step` units towards `target`, never past it.
    pub fn adjust_by(&mut self, target: Color, step: u8) {
        self.r = step_towards(self.r, target.r, step);
        self.g = step_towards(self.g, target.g, step);
        self.b = step_towards(self.b, target.b, step);
    }

    /// Interval between two [`adjust`](Color::adjust) calls so that the fade
    /// from `self` to `target` takes roughly `total_ms`.
    ///
    /// Per channel the delay is `total_ms / (|distance| + 4) + 1`; the smallest
    /// one wins, so the channel with the longest way to go sets the pace. The
    /// bias terms keep the result at least 1 ms even for equal colors.
    pub fn delay_to_next_adjustment(&self, target: Color, total_ms: u32) -> u32 {
        channel_delay(self.r, target.r, total_ms)
            .min(channel_delay(self.g, target.g, total_ms))
            .min(channel_delay(self.b, target.b, total_ms))
    }

    /// Channel-wise sum clamped to 255.
    pub const fn saturating_add(self, other: Color) -> Color {
        Color::new(
            self.r.saturating_add(other.r),
            self.g.saturating_add(other.g),
            self.b.saturating_add(other.b),
        )
    }
}

impl Add for Color {
    type Output = Color;

    /// Saturating, see [`Color::saturating_add`].
    fn add(self, rhs: Color) -> Color {
        self.saturating_add(rhs)
    }
}

impl From<[u8; 3]> for Color {
    fn from(bytes: [u8; 3]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        color.to_bytes()
    }
}

fn step_towards(from: u8, to: u8, step: u8) -> u8 {
    if from < to {
        from.saturating_add(step).min(to)
    } else {
        from.saturating_sub(step).max(to)
    }
}

fn channel_delay(from: u8, to: u8, total_ms: u32) -> u32 {
    total_ms / (u32::from(from.abs_diff(to)) + 4) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_moves_one_unit_per_channel() {
        let mut c = Color::new(10, 10, 10);
        c.adjust(Color::new(20, 0, 10));
        assert_eq!(c, Color::new(11, 9, 10));
    }

    #[test]
    fn test_adjust_by_does_not_overshoot() {
        let mut c = Color::new(250, 3, 100);
        c.adjust_by(Color::new(255, 0, 102), 10);
        assert_eq!(c, Color::new(255, 0, 102));
    }

    #[test]
    fn test_adjust_by_saturates_at_channel_bounds() {
        let mut c = Color::new(254, 1, 0);
        c.adjust_by(Color::new(255, 0, 0), 200);
        assert_eq!(c, Color::new(255, 0, 0));
    }

    #[test]
    fn test_delay_uses_largest_distance() {
        let from = Color::BLACK;
        // red: 1000 / 258 + 1 = 4, green/blue: 1000 / 4 + 1 = 251
        assert_eq!(from.delay_to_next_adjustment(Color::new(254, 0, 0), 1000), 4);
    }

    #[test]
    fn test_delay_is_never_zero() {
        let c = Color::new(7, 7, 7);
        assert_eq!(c.delay_to_next_adjustment(c, 0), 1);
        assert_eq!(Color::BLACK.delay_to_next_adjustment(Color::WHITE, 100), 1);
    }

    #[test]
    fn test_saturating_add_clamps() {
        let sum = Color::new(200, 10, 0) + Color::new(100, 20, 0);
        assert_eq!(sum, Color::new(255, 30, 0));
    }

    #[test]
    fn test_byte_conversions() {
        let c = Color::from([1, 2, 3]);
        assert_eq!(c, Color::new(1, 2, 3));
        let bytes: [u8; 3] = c.into();
        assert_eq!(bytes, [1, 2, 3]);
    }
}
