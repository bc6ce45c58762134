//! CC1101 register map, command strobes and the RF profile.
//!
//! Addresses follow the datasheet (SWRS061), section 29 "Configuration
//! Registers" and table 45 "SPI Address Space".

/// Header bit selecting a read access.
pub const READ_FLAG: u8 = 0x80;
/// Header bit selecting a burst access (or a status register for 0x30..0x3D).
pub const BURST_FLAG: u8 = 0x40;

/// Configuration registers.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Config {
    IOCFG2 = 0x00,
    IOCFG1 = 0x01,
    IOCFG0 = 0x02,
    FIFOTHR = 0x03,
    SYNC1 = 0x04,
    SYNC0 = 0x05,
    PKTLEN = 0x06,
    PKTCTRL1 = 0x07,
    PKTCTRL0 = 0x08,
    ADDR = 0x09,
    CHANNR = 0x0A,
    FSCTRL1 = 0x0B,
    FSCTRL0 = 0x0C,
    FREQ2 = 0x0D,
    FREQ1 = 0x0E,
    FREQ0 = 0x0F,
    MDMCFG4 = 0x10,
    MDMCFG3 = 0x11,
    MDMCFG2 = 0x12,
    MDMCFG1 = 0x13,
    MDMCFG0 = 0x14,
    DEVIATN = 0x15,
    MCSM2 = 0x16,
    MCSM1 = 0x17,
    MCSM0 = 0x18,
    FOCCFG = 0x19,
    BSCFG = 0x1A,
    AGCCTRL2 = 0x1B,
    AGCCTRL1 = 0x1C,
    AGCCTRL0 = 0x1D,
    FREND1 = 0x21,
    FREND0 = 0x22,
    FSCAL3 = 0x23,
    FSCAL2 = 0x24,
    FSCAL1 = 0x25,
    FSCAL0 = 0x26,
    TEST2 = 0x2C,
    TEST1 = 0x2D,
    TEST0 = 0x2E,
    PATABLE = 0x3E,
}

impl Config {
    /// Register address.
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Command strobes.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Strobe {
    /// Reset chip.
    SRES = 0x30,
    /// Calibrate frequency synthesizer and turn it off.
    SCAL = 0x33,
    /// Enable RX.
    SRX = 0x34,
    /// Enable TX.
    STX = 0x35,
    /// Exit RX/TX, turn off frequency synthesizer.
    SIDLE = 0x36,
    /// Enter power down when CSn goes high.
    SPWD = 0x39,
    /// Flush the RX FIFO.
    SFRX = 0x3A,
    /// Flush the TX FIFO.
    SFTX = 0x3B,
    NOP = 0x3D,
}

impl Strobe {
    /// Command byte.
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Status registers, read with [`READ_FLAG`] | [`BURST_FLAG`].
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    PARTNUM = 0x30,
    VERSION = 0x31,
    LQI = 0x33,
    RSSI = 0x34,
    MARCSTATE = 0x35,
    PKTSTATUS = 0x38,
    RXBYTES = 0x3B,
}

impl Status {
    /// Header byte for a status read.
    pub const fn read_header(self) -> u8 {
        self as u8 | READ_FLAG | BURST_FLAG
    }
}

/// TX/RX FIFO address.
pub const FIFO: u8 = 0x3F;

/// `PKTSTATUS` bit set when the last received packet passed the CRC check.
pub const PKTSTATUS_CRC_OK: u8 = 0x80;

/// Number of status bytes (RSSI, LQI/CRC) appended to each received packet.
pub const APPENDED_STATUS_LEN: usize = 2;

/// PA table entries for 868 MHz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum TxPower {
    /// -30 dBm, enough for a room.
    #[default]
    Minus30dBm = 0x03,
    /// -20 dBm.
    Minus20dBm = 0x17,
    /// -10 dBm.
    Minus10dBm = 0x27,
    /// 0 dBm.
    Zero = 0x50,
    /// +10 dBm.
    Plus10dBm = 0xC5,
}

impl TxPower {
    /// PA table value.
    pub const fn value(self) -> u8 {
        self as u8
    }
}

/// GFSK, 868.3 MHz base frequency, fixed packet length with hardware CRC and
/// appended status. GDO0 asserts on sync word and deasserts at end of packet.
pub const RF_PROFILE: &[(Config, u8)] = &[
    (Config::FSCTRL1, 0x06),
    (Config::FSCTRL0, 0x00),
    (Config::FREQ2, 0x21),
    (Config::FREQ1, 0x65),
    (Config::FREQ0, 0x6A),
    (Config::MDMCFG4, 0xCA),
    (Config::MDMCFG3, 0x83),
    (Config::MDMCFG2, 0x13),
    (Config::MDMCFG1, 0x22),
    (Config::MDMCFG0, 0xF8),
    (Config::CHANNR, 0x00),
    (Config::DEVIATN, 0x35),
    (Config::FREND1, 0x56),
    (Config::FREND0, 0x10),
    (Config::MCSM0, 0x18),
    (Config::FOCCFG, 0x16),
    (Config::BSCFG, 0x6C),
    (Config::AGCCTRL2, 0x43),
    (Config::AGCCTRL1, 0x40),
    (Config::AGCCTRL0, 0x91),
    (Config::FSCAL3, 0xE9),
    (Config::FSCAL2, 0x2A),
    (Config::FSCAL1, 0x00),
    (Config::FSCAL0, 0x1F),
    (Config::TEST2, 0x81),
    (Config::TEST1, 0x35),
    (Config::TEST0, 0x09),
    (Config::FIFOTHR, 0x47),
    (Config::IOCFG2, 0x2E),
    (Config::IOCFG0, 0x06),
    (Config::PKTCTRL1, 0x04),
    (Config::PKTCTRL0, 0x04),
    (Config::MCSM2, 0x07),
    (Config::MCSM1, 0x30),
];
