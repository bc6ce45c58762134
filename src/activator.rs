//! Activator role: the BLE characteristic boundary in front of the transmit packet.
//!
//! The four packet fields are exposed as separate characteristics. Writes land
//! in the shared [`PacketStore`], so the very next transmission carries them,
//! and are persisted so the activator comes back with the same packet after a
//! power cycle. A color write is also shown on the activator's own LED.

use core::fmt;

use embedded_storage::Storage;

use crate::actuator::{RgbOutput, SmoothColorActuator};
use crate::error::Error;
use crate::packet::{PacketField, RadioPacket};
use crate::storage::PersistentPacket;
use crate::transmit::PacketStore;

/// Characteristic handlers of one activator.
#[derive(Debug)]
pub struct Activator<'a, S, L> {
    store: &'a PacketStore,
    persistent: PersistentPacket<S>,
    led: SmoothColorActuator<L>,
}

impl<'a, S, L> Activator<'a, S, L>
where
    S: Storage,
    S::Error: fmt::Debug,
    L: RgbOutput,
{
    /// Loads the persisted packet (or `default`) into `store` and shows its
    /// color.
    ///
    /// A storage failure is logged and the activator runs from `default`.
    ///
    /// The LED is driven right away, so a power stabilizer feeding it should
    /// be enabled before calling this. It stays reachable afterwards through
    /// [`led_mut`](Self::led_mut).
    pub fn boot(
        store: &'a PacketStore,
        storage: S,
        led: L,
        default: RadioPacket,
    ) -> Self {
        let mut persistent = PersistentPacket::new(storage);
        let packet = match persistent.load_or_init(default) {
            Ok(packet) => packet,
            Err(e) => {
                error!("Cannot load packet: {}", e);
                default
            }
        };
        let _ = store.replace(packet);
        let mut led = SmoothColorActuator::new(led);
        led.set_color(packet.color);
        info!("Activator {} up", packet.id);
        Self {
            store,
            persistent,
            led,
        }
    }

    /// Serves a characteristic read.
    ///
    /// # Returns
    /// The number of bytes copied into `out`.
    pub fn read_characteristic(
        &self,
        field: PacketField,
        offset: usize,
        out: &mut [u8],
    ) -> Result<usize, Error> {
        self.store.read_field(field, offset, out)
    }

    /// Serves a characteristic write.
    ///
    /// # Returns
    /// The number of bytes accepted, always `data.len()` on success.
    ///
    /// # Errors
    /// [`Error::InvalidOffset`] if the write does not fit the field; the
    /// packet is left unchanged.
    ///
    /// # Notes
    /// A failure to persist is logged only: the new packet is already on the
    /// air and will be persisted again by the next write.
    pub fn write_characteristic(
        &mut self,
        field: PacketField,
        offset: usize,
        data: &[u8],
    ) -> Result<usize, Error> {
        let packet = self.store.update(|packet| {
            packet.write_field(field, offset, data).map(|()| *packet)
        })?;
        debug!("Wrote {} bytes of {}", data.len(), field);

        if let Err(e) = self.persistent.save(&packet) {
            warn!("Packet not persisted: {}", e);
        }
        if field == PacketField::Color {
            self.led.set_color(packet.color);
        }
        Ok(data.len())
    }

    /// The packet currently being broadcast.
    pub fn packet(&self) -> RadioPacket {
        self.store.snapshot()
    }

    /// The LED actuator.
    pub fn led(&self) -> &SmoothColorActuator<L> {
        &self.led
    }

    /// The LED actuator, e.g. to switch the LED power stabilizer.
    pub fn led_mut(&mut self) -> &mut SmoothColorActuator<L> {
        &mut self.led
    }

    /// Releases the storage and LED.
    pub fn release(self) -> (S, L) {
        (self.persistent.release(), self.led.release())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::consts::PACKET_RECORD_MAGIC;
    use crate::storage::tests::RamStorage;
    use core::convert::Infallible;

    #[derive(Debug, Default)]
    struct Led {
        shown: Vec<Color>,
        stabilizer: bool,
    }

    impl RgbOutput for Led {
        type Error = Infallible;

        fn actuate(&mut self, color: Color) -> Result<(), Infallible> {
            self.shown.push(color);
            Ok(())
        }
    }

    fn default_packet() -> RadioPacket {
        RadioPacket {
            id: 2,
            color: Color::new(10, 20, 30),
            ..RadioPacket::default()
        }
    }

    #[test]
    fn test_boot_from_blank_storage_uses_default() {
        let store = PacketStore::default();
        let activator = Activator::boot(&store, RamStorage::default(), Led::default(), default_packet());
        assert_eq!(activator.packet(), default_packet());
        assert_eq!(activator.led().current(), Color::new(10, 20, 30));

        let (storage, _) = activator.release();
        assert_eq!(&storage.bytes[..4], &PACKET_RECORD_MAGIC.to_le_bytes());
    }

    #[test]
    fn test_color_write_updates_packet_led_and_storage() {
        let store = PacketStore::default();
        let mut activator =
            Activator::boot(&store, RamStorage::default(), Led::default(), default_packet());

        assert_eq!(
            activator.write_characteristic(PacketField::Color, 0, &[0, 255, 0]),
            Ok(3)
        );
        assert_eq!(store.snapshot().color, Color::new(0, 255, 0));

        let (storage, led) = activator.release();
        assert_eq!(&storage.bytes[4..12], &[2, 0, 255, 0, 0, 0, 0, 0]);
        assert_eq!(led.shown.last(), Some(&Color::new(0, 255, 0)));

        // Comes back with the written packet.
        let store = PacketStore::default();
        let activator = Activator::boot(&store, storage, Led::default(), RadioPacket::default());
        assert_eq!(activator.packet().color, Color::new(0, 255, 0));
    }

    #[test]
    fn test_partial_write_honours_offset() {
        let store = PacketStore::default();
        let mut activator =
            Activator::boot(&store, RamStorage::default(), Led::default(), default_packet());
        assert_eq!(
            activator.write_characteristic(PacketField::BackgroundColor, 1, &[7, 8]),
            Ok(2)
        );
        assert_eq!(activator.packet().background_color, Color::new(0, 7, 8));

        let mut out = [0u8; 4];
        assert_eq!(
            activator.read_characteristic(PacketField::BackgroundColor, 1, &mut out),
            Ok(2)
        );
        assert_eq!(&out[..2], &[7, 8]);
    }

    #[test]
    fn test_overrunning_write_is_rejected() {
        let store = PacketStore::default();
        let mut activator =
            Activator::boot(&store, RamStorage::default(), Led::default(), default_packet());
        assert_eq!(
            activator.write_characteristic(PacketField::Id, 0, &[1, 2]),
            Err(Error::InvalidOffset {
                field: PacketField::Id,
                offset: 0,
                len: 2
            })
        );
        assert_eq!(activator.packet(), default_packet());
    }

    #[test]
    fn test_led_reachable_after_boot() {
        let store = PacketStore::default();
        let mut activator =
            Activator::boot(&store, RamStorage::default(), Led::default(), default_packet());
        activator.led_mut().led_mut().stabilizer = true;
        assert!(activator.led().led().stabilizer);

        let (_, led) = activator.release();
        assert!(led.stabilizer);
        assert_eq!(led.shown, vec![Color::new(10, 20, 30)]);
    }

    #[test]
    fn test_storage_failure_does_not_block_writes() {
        let store = PacketStore::default();
        let storage = RamStorage {
            read_only: true,
            ..RamStorage::default()
        };
        let mut activator = Activator::boot(&store, storage, Led::default(), default_packet());
        assert_eq!(activator.packet(), default_packet());
        assert_eq!(
            activator.write_characteristic(PacketField::ConfigureMode, 0, &[1]),
            Ok(1)
        );
        assert!(activator.packet().configure_mode);
    }
}
