//! Multi-sender color aggregation.
//!
//! Receivers hear broadcasts from up to [`MAX_SENDERS`] devices over a lossy,
//! unordered radio link. The aggregator keeps one slot per sender id
//! (last write wins) and derives a single display color from the slots that
//! were refreshed within the last [`STALE_WINDOW_MS`].
//!
//! The display color is the channel-wise *sum* of all fresh colors, clamped to
//! 255, so more senders nearby make a brighter, more saturated light. With no
//! fresh sender the background color is shown instead.
//!
//! The scan loop writes and a display timer reads, possibly from an interrupt,
//! so shared access goes through [`SharedAggregator`], a
//! `critical_section::Mutex` around the plain [`ColorAggregator`].

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;

use crate::color::Color;
use crate::consts::{MAX_SENDERS, STALE_WINDOW_MS};
use crate::error::Error;
use crate::packet::RadioPacket;

/// Last color heard from one sender.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ColorSlot {
    /// Monotonic time of the last packet, `None` if the sender was never heard.
    pub last_seen_ms: Option<u64>,
    /// Color carried by that packet.
    pub color: Color,
}

impl ColorSlot {
    /// A slot that was never populated.
    pub const EMPTY: ColorSlot = ColorSlot {
        last_seen_ms: None,
        color: Color::BLACK,
    };

    /// Whether the slot still contributes at `now_ms`.
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        match self.last_seen_ms {
            Some(seen) => now_ms.saturating_sub(seen) < STALE_WINDOW_MS,
            None => false,
        }
    }
}

/// Per-sender color slots plus the background color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorAggregator {
    slots: [ColorSlot; MAX_SENDERS],
    background: Color,
}

impl Default for ColorAggregator {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl ColorAggregator {
    /// Creates an aggregator with every slot empty.
    pub const fn new(background: Color) -> Self {
        Self {
            slots: [ColorSlot::EMPTY; MAX_SENDERS],
            background,
        }
    }

    /// Records a received packet at `now_ms`.
    ///
    /// Overwrites the sender's slot unconditionally and, in configure mode,
    /// the background color as well.
    ///
    /// # Errors
    /// [`Error::InvalidSenderId`] if `packet.id >= MAX_SENDERS`. Nothing is
    /// changed in that case; the packet is only logged.
    pub fn record(&mut self, packet: &RadioPacket, now_ms: u64) -> Result<(), Error> {
        let Some(slot) = self.slots.get_mut(usize::from(packet.id)) else {
            warn!("Unexpected radio packet with id {}", packet.id);
            return Err(Error::InvalidSenderId(packet.id));
        };
        *slot = ColorSlot {
            last_seen_ms: Some(now_ms),
            color: packet.color,
        };
        if packet.configure_mode {
            self.background = packet.background_color;
        }
        Ok(())
    }

    /// Display color at `now_ms`: the clamped sum of fresh slots, or the
    /// background if no slot is fresh.
    pub fn current_color(&self, now_ms: u64) -> Color {
        let mut fresh = self.slots.iter().filter(|slot| slot.is_fresh(now_ms)).peekable();
        if fresh.peek().is_none() {
            return self.background;
        }
        fresh.fold(Color::BLACK, |sum, slot| sum + slot.color)
    }

    /// Number of senders contributing at `now_ms`.
    pub fn fresh_senders(&self, now_ms: u64) -> usize {
        self.slots.iter().filter(|slot| slot.is_fresh(now_ms)).count()
    }

    /// Slot for sender `id`, if the id is valid.
    pub fn slot(&self, id: u8) -> Option<&ColorSlot> {
        self.slots.get(usize::from(id))
    }

    /// Current background color.
    pub fn background(&self) -> Color {
        self.background
    }
}

/// A [`ColorAggregator`] shared between the scan loop and the display timer.
///
/// Every access runs inside a critical section, so a reader never observes a
/// half-applied packet. `new` is `const`, which allows a `static`:
///
/// ```
/// use magicpath::aggregator::SharedAggregator;
/// use magicpath::color::Color;
///
/// static AGGREGATOR: SharedAggregator = SharedAggregator::new(Color::BLACK);
///
/// assert_eq!(AGGREGATOR.current_color(0), Color::BLACK);
/// ```
pub struct SharedAggregator {
    inner: Mutex<RefCell<ColorAggregator>>,
}

impl fmt::Debug for SharedAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedAggregator").finish_non_exhaustive()
    }
}

impl Default for SharedAggregator {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl SharedAggregator {
    /// Creates a shared aggregator with every slot empty.
    pub const fn new(background: Color) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ColorAggregator::new(background))),
        }
    }

    /// See [`ColorAggregator::record`].
    pub fn record(&self, packet: &RadioPacket, now_ms: u64) -> Result<(), Error> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).record(packet, now_ms))
    }

    /// See [`ColorAggregator::current_color`].
    pub fn current_color(&self, now_ms: u64) -> Color {
        self.with(|aggregator| aggregator.current_color(now_ms))
    }

    /// Runs `f` on a consistent view of the aggregator. Only
    /// [`record`](Self::record) mutates it.
    pub fn with<R>(&self, f: impl FnOnce(&ColorAggregator) -> R) -> R {
        critical_section::with(|cs| f(&*self.inner.borrow_ref(cs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(id: u8, color: Color) -> RadioPacket {
        RadioPacket {
            id,
            color,
            ..RadioPacket::default()
        }
    }

    #[test]
    fn test_slot_goes_stale_at_window_boundary() {
        let mut agg = ColorAggregator::default();
        agg.record(&packet(1, Color::new(10, 20, 30)), 0).unwrap();
        assert_eq!(agg.current_color(2_999), Color::new(10, 20, 30));
        assert_eq!(agg.current_color(3_000), Color::BLACK);
        assert_eq!(agg.current_color(10_000), Color::BLACK);
    }

    #[test]
    fn test_sum_saturates_instead_of_averaging() {
        let mut agg = ColorAggregator::default();
        agg.record(&packet(0, Color::new(200, 0, 0)), 100).unwrap();
        agg.record(&packet(7, Color::new(100, 0, 0)), 100).unwrap();
        assert_eq!(agg.current_color(100), Color::new(255, 0, 0));
        assert_eq!(agg.fresh_senders(100), 2);
    }

    #[test]
    fn test_senders_add_up() {
        let mut agg = ColorAggregator::default();
        agg.record(&packet(2, Color::new(10, 0, 5)), 1_000).unwrap();
        agg.record(&packet(3, Color::new(0, 20, 5)), 2_000).unwrap();
        assert_eq!(agg.current_color(2_500), Color::new(10, 20, 10));
        // Sender 2 expires first.
        assert_eq!(agg.current_color(4_000), Color::new(0, 20, 5));
    }

    #[test]
    fn test_background_when_nothing_is_fresh() {
        let agg = ColorAggregator::new(Color::new(5, 5, 5));
        assert_eq!(agg.current_color(0), Color::new(5, 5, 5));
        assert_eq!(agg.current_color(123_456), Color::new(5, 5, 5));
    }

    #[test]
    fn test_fresh_black_sender_hides_background() {
        let mut agg = ColorAggregator::new(Color::new(5, 5, 5));
        agg.record(&packet(4, Color::BLACK), 10).unwrap();
        assert_eq!(agg.current_color(20), Color::BLACK);
    }

    #[test]
    fn test_invalid_id_changes_nothing() {
        let mut agg = ColorAggregator::new(Color::new(1, 2, 3));
        let before = agg.clone();
        let p = RadioPacket {
            id: 20,
            color: Color::WHITE,
            background_color: Color::WHITE,
            configure_mode: true,
        };
        assert_eq!(agg.record(&p, 50), Err(Error::InvalidSenderId(20)));
        assert_eq!(agg, before);
        assert!(agg.slot(20).is_none());
    }

    #[test]
    fn test_configure_mode_sets_background() {
        let mut agg = ColorAggregator::default();
        let p = RadioPacket {
            id: 3,
            color: Color::new(1, 1, 1),
            background_color: Color::new(9, 9, 9),
            configure_mode: true,
        };
        agg.record(&p, 0).unwrap();
        assert_eq!(agg.background(), Color::new(9, 9, 9));
        // Once sender 3 is stale, the new background shows.
        assert_eq!(agg.current_color(5_000), Color::new(9, 9, 9));
    }

    #[test]
    fn test_background_ignored_without_configure_mode() {
        let mut agg = ColorAggregator::default();
        let p = RadioPacket {
            id: 0,
            color: Color::BLACK,
            background_color: Color::WHITE,
            configure_mode: false,
        };
        agg.record(&p, 0).unwrap();
        assert_eq!(agg.background(), Color::BLACK);
    }

    #[test]
    fn test_last_write_wins() {
        let mut agg = ColorAggregator::default();
        agg.record(&packet(5, Color::new(1, 0, 0)), 0).unwrap();
        agg.record(&packet(5, Color::new(0, 1, 0)), 10).unwrap();
        assert_eq!(
            agg.slot(5),
            Some(&ColorSlot {
                last_seen_ms: Some(10),
                color: Color::new(0, 1, 0)
            })
        );
        assert_eq!(agg.current_color(10), Color::new(0, 1, 0));
    }

    #[test]
    fn test_shared_aggregator_round_trip() {
        let shared = SharedAggregator::new(Color::new(5, 5, 5));
        assert_eq!(shared.current_color(0), Color::new(5, 5, 5));
        shared.record(&packet(1, Color::new(0, 255, 0)), 0).unwrap();
        assert_eq!(shared.current_color(1), Color::new(0, 255, 0));
        assert_eq!(shared.with(|agg| agg.fresh_senders(1)), 1);
    }

    #[test]
    fn test_shared_background_changes_only_through_configure_packets() {
        let shared = SharedAggregator::new(Color::new(5, 5, 5));
        let mut p = RadioPacket {
            id: 2,
            color: Color::BLACK,
            background_color: Color::WHITE,
            configure_mode: false,
        };
        shared.record(&p, 0).unwrap();
        assert_eq!(shared.with(ColorAggregator::background), Color::new(5, 5, 5));

        p.configure_mode = true;
        shared.record(&p, 10).unwrap();
        assert_eq!(shared.with(ColorAggregator::background), Color::WHITE);
        assert_eq!(shared.current_color(3_010), Color::WHITE);
    }
}
