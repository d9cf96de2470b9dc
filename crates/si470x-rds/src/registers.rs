//! Si470x register file
//!
//! The tuner exposes sixteen 16-bit registers. The serial
//! transport always moves the whole file at once: a read
//! fills a shadow copy of all sixteen words, and a write
//! sends the (modified) shadow back. Every tuner setting is
//! therefore a read / modify / write of a [`RegisterFile`].
//!
//! Register names and bit positions follow Silicon Labs
//! AN230 and the Si4702/03 datasheet.

use std::fmt;
use std::io;

use crate::group::Group;

/// Number of registers in the register file
pub const REGISTER_COUNT: usize = 16;

/// Register addresses
pub mod reg {
    pub const DEVICEID: usize = 0x00;
    pub const CHIPID: usize = 0x01;
    pub const POWERCFG: usize = 0x02;
    pub const CHANNEL: usize = 0x03;
    pub const SYSCONFIG1: usize = 0x04;
    pub const SYSCONFIG2: usize = 0x05;
    pub const SYSCONFIG3: usize = 0x06;
    pub const TEST1: usize = 0x07;
    pub const TEST2: usize = 0x08;
    pub const BOOTCONFIG: usize = 0x09;
    pub const STATUSRSSI: usize = 0x0A;
    pub const READCHANNEL: usize = 0x0B;
    pub const RDSA: usize = 0x0C;
    pub const RDSB: usize = 0x0D;
    pub const RDSC: usize = 0x0E;
    pub const RDSD: usize = 0x0F;
}

/// Bit positions and field masks
///
/// Single-bit flags are given as bit *positions*. Multi-bit
/// fields are given either as a shift (`*_SHIFT`) or as an
/// in-place mask.
pub mod bits {
    // POWERCFG
    pub const DSMUTE: u8 = 15;
    pub const DMUTE: u8 = 14;
    pub const MONO: u8 = 13;
    pub const RDSM: u8 = 11;
    pub const SKMODE: u8 = 10;
    pub const SEEKUP: u8 = 9;
    pub const SEEK: u8 = 8;
    pub const DISABLE: u8 = 6;
    pub const ENABLE: u8 = 0;

    // CHANNEL
    pub const TUNE: u8 = 15;
    pub const CHANNEL_MASK: u16 = 0x01FF;

    // SYSCONFIG1
    pub const RDSIEN: u8 = 15;
    pub const STCIEN: u8 = 14;
    pub const RDS: u8 = 12;
    pub const DE: u8 = 11;
    pub const AGCD: u8 = 10;

    // SYSCONFIG2
    pub const SEEKTH_SHIFT: u8 = 8;
    pub const SEEKTH_MASK: u16 = 0xFF << SEEKTH_SHIFT;
    pub const BAND_SHIFT: u8 = 6;
    pub const SPACE_SHIFT: u8 = 4;
    pub const VOLUME_MASK: u16 = 0x000F;

    // SYSCONFIG3
    pub const SMUTER_SHIFT: u8 = 14;
    pub const SMUTEA_SHIFT: u8 = 12;
    pub const VOLEXT: u8 = 8;
    pub const SKSNR_SHIFT: u8 = 4;
    pub const SKCNT_SHIFT: u8 = 0;

    // TEST1
    pub const XOSCEN: u8 = 15;
    pub const AHIZEN: u8 = 14;

    // STATUSRSSI
    pub const RDSR: u8 = 15;
    pub const STC: u8 = 14;
    pub const SFBL: u8 = 13;
    pub const AFCRL: u8 = 12;
    pub const RDSS: u8 = 11;
    pub const STEREO: u8 = 8;
    pub const RSSI_MASK: u16 = 0x007F;

    // READCHANNEL
    pub const READCHAN_MASK: u16 = 0x01FF;

    // CHIPID
    pub const FIRMWARE_MASK: u16 = 0x003F;
    pub const DEV_MASK: u16 = 0x03C0;
}

/// A snapshot of all sixteen tuner registers
///
/// ```
/// use si470x_rds::{RegisterFile, reg};
///
/// let mut regs = RegisterFile::default();
/// assert!(!regs.rds_ready());
///
/// regs[reg::STATUSRSSI] = 0x8000 | 42;
/// assert!(regs.rds_ready());
/// assert_eq!(42, regs.rssi());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RegisterFile([u16; REGISTER_COUNT]);

impl RegisterFile {
    /// Wrap raw register words, indexed by address
    pub fn new(words: [u16; REGISTER_COUNT]) -> Self {
        Self(words)
    }

    /// Raw register words
    pub fn words(&self) -> &[u16; REGISTER_COUNT] {
        &self.0
    }

    /// True if the given bit of register `addr` is set
    #[inline]
    pub fn bit(&self, addr: usize, bit: u8) -> bool {
        self.0[addr] & (1 << bit) != 0
    }

    /// Set or clear one bit of register `addr`
    #[inline]
    pub fn set_bit(&mut self, addr: usize, bit: u8, on: bool) {
        if on {
            self.0[addr] |= 1 << bit;
        } else {
            self.0[addr] &= !(1 << bit);
        }
    }

    /// Replace the bits of register `addr` selected by `mask`
    ///
    /// `value` must already be shifted into position. Bits of
    /// `value` outside of `mask` are discarded.
    #[inline]
    pub fn set_field(&mut self, addr: usize, mask: u16, value: u16) {
        self.0[addr] = (self.0[addr] & !mask) | (value & mask);
    }

    /// New RDS data is waiting in the `RDSA`..`RDSD` registers
    pub fn rds_ready(&self) -> bool {
        self.bit(reg::STATUSRSSI, bits::RDSR)
    }

    /// The RDS group currently held in `RDSA`..`RDSD`
    ///
    /// The group is only meaningful if [`rds_ready()`](Self::rds_ready).
    pub fn group(&self) -> Group {
        Group::new(
            self.0[reg::RDSA],
            self.0[reg::RDSB],
            self.0[reg::RDSC],
            self.0[reg::RDSD],
        )
    }

    /// Received signal strength, in dBµV
    pub fn rssi(&self) -> u8 {
        (self.0[reg::STATUSRSSI] & bits::RSSI_MASK) as u8
    }

    /// The station is stereo and the chip is decoding stereo
    pub fn is_stereo(&self) -> bool {
        self.bit(reg::STATUSRSSI, bits::STEREO)
    }

    /// Seek or tune complete
    pub fn is_tune_complete(&self) -> bool {
        self.bit(reg::STATUSRSSI, bits::STC)
    }

    /// Seek failed or hit the band limit
    pub fn is_seek_failed(&self) -> bool {
        self.bit(reg::STATUSRSSI, bits::SFBL)
    }

    /// Raw `READCHAN` field
    ///
    /// Convert to a frequency with
    /// [`Region::channel_to_tenths()`](crate::Region::channel_to_tenths).
    pub fn read_channel(&self) -> u16 {
        self.0[reg::READCHANNEL] & bits::READCHAN_MASK
    }

    /// The firmware and device fields read non-zero
    ///
    /// Both fields read back as zero until the chip finishes
    /// powering up.
    pub fn is_powered_up(&self) -> bool {
        self.0[reg::CHIPID] & (bits::FIRMWARE_MASK | bits::DEV_MASK) != 0
    }
}

impl From<[u16; REGISTER_COUNT]> for RegisterFile {
    fn from(words: [u16; REGISTER_COUNT]) -> Self {
        Self(words)
    }
}

impl std::ops::Index<usize> for RegisterFile {
    type Output = u16;

    fn index(&self, addr: usize) -> &u16 {
        &self.0[addr]
    }
}

impl std::ops::IndexMut<usize> for RegisterFile {
    fn index_mut(&mut self, addr: usize) -> &mut u16 {
        &mut self.0[addr]
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:04X}", word)?;
        }
        Ok(())
    }
}

/// A source of register file snapshots
///
/// The decoder needs nothing from the tuner except the
/// ability to read its registers. Implementations may block
/// while the transport runs. Every call returns a fresh
/// snapshot; no state is shared with the caller.
pub trait RegisterSource {
    /// Read all sixteen registers
    fn read_register_file(&mut self) -> io::Result<RegisterFile>;
}

/// A bidirectional register transport
///
/// The serial transport moves the entire register file in
/// both directions. The transport itself (3-wire, 2-wire,
/// bit-banged or not) is supplied by the integrator.
pub trait RegisterBus {
    /// Read all sixteen registers from the chip into `regs`
    fn read_registers(&mut self, regs: &mut RegisterFile) -> io::Result<()>;

    /// Write all sixteen registers from `regs` to the chip
    fn write_registers(&mut self, regs: &RegisterFile) -> io::Result<()>;
}

impl<S> RegisterSource for &mut S
where
    S: RegisterSource + ?Sized,
{
    fn read_register_file(&mut self) -> io::Result<RegisterFile> {
        (**self).read_register_file()
    }
}
