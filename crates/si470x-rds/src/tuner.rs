//! Tuner control
//!
//! Every tuner setting is a read / modify / write of the
//! entire [register file](crate::RegisterFile): read all
//! sixteen registers, change one field, and write them all
//! back. Tuning and seeking then poll the status register
//! until the chip reports completion.
//!
//! The chip never reports some failures. If it is miswired,
//! or not powered, the status bits we wait for will never
//! change. Every polling loop is therefore bounded by a
//! maximum number of register reads; see
//! [`TunerBuilder::with_poll_limit()`].

#[cfg(not(test))]
use log::{debug, info, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as info;
#[cfg(test)]
use std::println as warn;

use std::fmt;
use std::io;

use strum::EnumMessage;
use thiserror::Error;

use crate::builder::TunerBuilder;
use crate::registers::{bits, reg, RegisterBus, RegisterFile, RegisterSource};

/// Band and channel spacing
///
/// Regions may be parsed from strings, ignoring case:
///
/// ```
/// use std::str::FromStr;
/// use si470x_rds::Region;
///
/// assert_eq!(Region::Americas, Region::from_str("americas").unwrap());
/// assert_eq!(Region::EuropeJapan, Region::from_str("EU").unwrap());
/// assert!(Region::from_str("mars").is_err());
///
/// // channels are given in tenths of a MHz
/// assert_eq!(1041, Region::Americas.channel_to_tenths(83));
/// assert_eq!(Some(83), Region::Americas.tenths_to_channel(1041));
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage, strum_macros::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Region {
    /// 87.5 – 108 MHz with 200 kHz spacing
    #[strum(
        serialize = "americas",
        serialize = "us",
        detailed_message = "Americas (87.5-108 MHz, 200 kHz spacing)"
    )]
    Americas,

    /// 76 – 108 MHz with 100 kHz spacing
    #[strum(
        serialize = "europe-japan",
        serialize = "eu",
        serialize = "jp",
        detailed_message = "Europe/Japan (76-108 MHz, 100 kHz spacing)"
    )]
    EuropeJapan,
}

impl Region {
    /// Value for the `BAND` and `SPACE` fields
    pub fn code(&self) -> u16 {
        match self {
            Region::Americas => 0,
            Region::EuropeJapan => 1,
        }
    }

    /// Channel spacing, in tenths of a MHz
    pub fn spacing(&self) -> u16 {
        match self {
            Region::Americas => 2,
            Region::EuropeJapan => 1,
        }
    }

    /// Bottom of the band, in tenths of a MHz
    pub fn band_start(&self) -> u16 {
        match self {
            Region::Americas => 875,
            Region::EuropeJapan => 760,
        }
    }

    /// Top of the band, in tenths of a MHz
    pub fn band_end(&self) -> u16 {
        1080
    }

    /// Frequency of a raw channel number, in tenths of a MHz
    pub fn channel_to_tenths(&self, channel: u16) -> u16 {
        (channel & bits::CHANNEL_MASK) * self.spacing() + self.band_start()
    }

    /// Raw channel number for a frequency in tenths of a MHz
    ///
    /// Returns `None` if the frequency is outside the band.
    /// Frequencies between channels round down.
    pub fn tenths_to_channel(&self, tenths: u16) -> Option<u16> {
        if (self.band_start()..=self.band_end()).contains(&tenths) {
            Some((tenths - self.band_start()) / self.spacing())
        } else {
            None
        }
    }

    /// Short name, as accepted when parsing
    pub fn as_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// Human-readable description
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::Americas
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}

/// Seek direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeekDirection {
    Up,
    Down,
}

/// Seek sensitivity presets
///
/// Presets for the seek RSSI threshold, SNR threshold, and
/// FM impulse detection count, from Silicon Labs AN230.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::FromRepr)]
#[repr(u8)]
pub enum SeekPreset {
    /// Chip power-on defaults
    Default = 0,

    /// Recommended settings
    Recommended,

    /// Find more stations
    MoreStations,

    /// Stop only on good quality stations
    GoodQuality,

    /// Find the most stations
    MostStations,
}

impl SeekPreset {
    /// Register values: `(SEEKTH, SKSNR, SKCNT)`
    pub fn settings(&self) -> (u8, u8, u8) {
        match self {
            SeekPreset::Default => (0x19, 0x00, 0x00),
            SeekPreset::Recommended => (0x19, 0x04, 0x08),
            SeekPreset::MoreStations => (0x0C, 0x04, 0x08),
            SeekPreset::GoodQuality => (0x0C, 0x07, 0x0F),
            SeekPreset::MostStations => (0x00, 0x04, 0x0F),
        }
    }
}

impl Default for SeekPreset {
    fn default() -> Self {
        Self::Default
    }
}

/// Tuner control error
#[derive(Error, Debug)]
pub enum TunerError {
    /// The register transport failed
    #[error("register transport failed: {0}")]
    Bus(#[from] io::Error),

    /// The chip did not report its firmware version in time
    #[error("tuner did not power up after {0} register reads")]
    PowerUpTimeout(u32),

    /// A tune operation did not complete in time
    #[error("tune did not complete after {0} register reads")]
    TuneTimeout(u32),

    /// A seek operation did not complete in time
    #[error("seek did not complete after {0} register reads")]
    SeekTimeout(u32),

    /// Seek reached the end of the band without finding a station
    #[error("seek failed: no station found before the band limit")]
    SeekFailed,

    /// The requested frequency is not in the band
    #[error("{0} is outside the band for {1}")]
    ChannelOutOfBand(u16, Region),

    /// A setting is out of range
    #[error("invalid tuner setting: {0}")]
    InvalidSetting(&'static str),
}

/// Si470x tuner
///
/// Created by a [`TunerBuilder`], which powers up the chip.
/// The tuner keeps a shadow copy of the register file from
/// the most recent read.
///
/// The tuner is also a [`RegisterSource`], so it can drive the
/// [`Decoder`](crate::Decoder) directly:
///
/// ```
/// use si470x_rds::{Decoder, Region, TunerBuilder};
/// # use std::io;
/// # use std::time::Duration;
/// # use si470x_rds::{bits, reg, RegisterBus, RegisterFile};
/// #
/// # // a chip which is always powered up and finishes tuning at once
/// # #[derive(Default)]
/// # struct MyBus(RegisterFile);
/// #
/// # impl RegisterBus for MyBus {
/// #     fn read_registers(&mut self, regs: &mut RegisterFile) -> io::Result<()> {
/// #         self.0[reg::CHIPID] = 0x1053;
/// #         self.0[reg::STATUSRSSI] = 1 << bits::STC;
/// #         *regs = self.0;
/// #         Ok(())
/// #     }
/// #
/// #     fn write_registers(&mut self, regs: &RegisterFile) -> io::Result<()> {
/// #         for r in reg::POWERCFG..=reg::TEST1 {
/// #             self.0[r] = regs[r];
/// #         }
/// #         self.0[reg::READCHANNEL] = regs[reg::CHANNEL] & bits::CHANNEL_MASK;
/// #         Ok(())
/// #     }
/// # }
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let bus = MyBus::default();
/// let mut tuner = TunerBuilder::new(Region::Americas)
/// #   .with_settle_time(Duration::ZERO)
///     .build(bus)?;
/// tuner.set_channel(1041)?;
/// assert_eq!(1041, tuner.channel()?);
///
/// let mut decoder = Decoder::default();
/// for _ in 0..10 {
///     if let Some(evt) = decoder.poll(&mut tuner)? {
///         println!("{}", evt);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Tuner<B> {
    bus: B,
    regs: RegisterFile,
    region: Region,
    poll_limit: u32,
}

impl<B> Tuner<B>
where
    B: RegisterBus,
{
    /// Power up the chip and apply the builder's settings
    pub(crate) fn power_up(bus: B, cfg: &TunerBuilder) -> Result<Self, TunerError> {
        let mut tuner = Self {
            bus,
            regs: RegisterFile::default(),
            region: cfg.region(),
            poll_limit: u32::max(cfg.poll_limit(), 1),
        };

        // start the crystal oscillator and let it settle
        tuner.modify(|regs| regs.set_bit(reg::TEST1, bits::XOSCEN, true))?;
        if !cfg.settle_time().is_zero() {
            std::thread::sleep(cfg.settle_time());
        }

        let region = tuner.region.code();
        tuner.modify(|regs| {
            regs.set_bit(reg::POWERCFG, bits::DISABLE, false);
            regs.set_bit(reg::POWERCFG, bits::DMUTE, true);
            regs.set_bit(reg::POWERCFG, bits::ENABLE, true);
            regs.set_bit(reg::SYSCONFIG1, bits::RDS, true);
            regs.set_field(reg::SYSCONFIG2, 0x3 << bits::BAND_SHIFT, region << bits::BAND_SHIFT);
            regs.set_field(
                reg::SYSCONFIG2,
                0x3 << bits::SPACE_SHIFT,
                region << bits::SPACE_SHIFT,
            );
        })?;

        // firmware and device fields read zero until powered up
        let mut powered = false;
        for _ in 0..tuner.poll_limit {
            tuner.read()?;
            if tuner.regs.is_powered_up() {
                powered = true;
                break;
            }
        }
        if !powered {
            warn!("tuner: no response after power-up");
            return Err(TunerError::PowerUpTimeout(tuner.poll_limit));
        }

        info!(
            "tuner: powered up, chip id {:04X}, {}",
            tuner.regs[reg::CHIPID],
            tuner.region
        );

        if let Some(volume) = cfg.volume() {
            tuner.set_volume(volume)?;
        }
        if let Some(preset) = cfg.seek_preset() {
            tuner.set_seek_preset(preset)?;
        }
        Ok(tuner)
    }

    /// Band and channel spacing
    pub fn region(&self) -> Region {
        self.region
    }

    /// Register file, as of the most recent read or write
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Release the register transport
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Tune to a frequency, in tenths of a MHz
    ///
    /// For example, 104.1 MHz is `1041`. Blocks until the chip
    /// reports that tuning is complete.
    pub fn set_channel(&mut self, tenths: u16) -> Result<(), TunerError> {
        let channel = self
            .region
            .tenths_to_channel(tenths)
            .ok_or(TunerError::ChannelOutOfBand(tenths, self.region))?;

        self.modify(|regs| {
            regs.set_field(reg::CHANNEL, bits::CHANNEL_MASK, channel);
            regs.set_bit(reg::CHANNEL, bits::TUNE, true);
        })?;

        let done = self.wait_for_complete();
        self.regs.set_bit(reg::CHANNEL, bits::TUNE, false);
        self.write()?;
        if !done? {
            return Err(TunerError::TuneTimeout(self.poll_limit));
        }

        debug!("tuner: tuned to {}", tenths);
        Ok(())
    }

    /// Current frequency, in tenths of a MHz
    pub fn channel(&mut self) -> Result<u16, TunerError> {
        self.read()?;
        Ok(self.region.channel_to_tenths(self.regs.read_channel()))
    }

    /// Seek to the next station
    ///
    /// Blocks until the chip reports that the seek is complete.
    /// Returns the frequency found, in tenths of a MHz.
    pub fn seek(&mut self, direction: SeekDirection) -> Result<u16, TunerError> {
        self.modify(|regs| {
            regs.set_bit(reg::POWERCFG, bits::SEEKUP, direction == SeekDirection::Up);
            regs.set_bit(reg::POWERCFG, bits::SEEK, true);
        })?;

        let done = self.wait_for_complete();
        let failed = self.regs.is_seek_failed();
        self.regs.set_bit(reg::POWERCFG, bits::SEEK, false);
        self.write()?;

        if !done? {
            return Err(TunerError::SeekTimeout(self.poll_limit));
        }
        if failed {
            debug!("tuner: seek {:?} hit the band limit", direction);
            return Err(TunerError::SeekFailed);
        }

        let found = self.channel()?;
        debug!("tuner: seek {:?} found {}", direction, found);
        Ok(found)
    }

    /// Set volume, from 0 to 99
    ///
    /// The chip has sixteen volume steps. Values above 99 are
    /// treated as 99.
    pub fn set_volume(&mut self, volume: u8) -> Result<(), TunerError> {
        let step = u16::from(volume.min(99)) * 100 / 625;
        self.modify(|regs| regs.set_field(reg::SYSCONFIG2, bits::VOLUME_MASK, step))
    }

    /// Current volume, from 0 to 100
    pub fn volume(&mut self) -> Result<u8, TunerError> {
        self.read()?;
        let step = self.regs[reg::SYSCONFIG2] & bits::VOLUME_MASK;
        Ok((step * 667 / 100) as u8)
    }

    /// Mute or unmute the audio
    ///
    /// Returns the mute state read back from the chip.
    pub fn set_mute(&mut self, mute: bool) -> Result<bool, TunerError> {
        self.modify(|regs| regs.set_bit(reg::POWERCFG, bits::DMUTE, !mute))?;
        self.read()?;
        Ok(!self.regs.bit(reg::POWERCFG, bits::DMUTE))
    }

    /// Force mono reception
    ///
    /// Mono is less noisy on weak stations. Returns the mono
    /// state read back from the chip.
    pub fn set_mono(&mut self, mono: bool) -> Result<bool, TunerError> {
        self.modify(|regs| regs.set_bit(reg::POWERCFG, bits::MONO, mono))?;
        self.read()?;
        Ok(self.regs.bit(reg::POWERCFG, bits::MONO))
    }

    /// Apply a seek sensitivity preset
    pub fn set_seek_preset(&mut self, preset: SeekPreset) -> Result<(), TunerError> {
        let (threshold, snr, count) = preset.settings();
        self.modify(|regs| {
            regs.set_field(
                reg::SYSCONFIG2,
                bits::SEEKTH_MASK,
                u16::from(threshold) << bits::SEEKTH_SHIFT,
            );
            regs.set_field(
                reg::SYSCONFIG3,
                0xF << bits::SKSNR_SHIFT,
                u16::from(snr) << bits::SKSNR_SHIFT,
            );
            regs.set_field(
                reg::SYSCONFIG3,
                0xF << bits::SKCNT_SHIFT,
                u16::from(count) << bits::SKCNT_SHIFT,
            );
        })
    }

    /// Set the seek RSSI threshold, from 0 to 0x7F
    pub fn set_seek_threshold(&mut self, threshold: u8) -> Result<(), TunerError> {
        if threshold > 0x7F {
            return Err(TunerError::InvalidSetting("seek threshold must be at most 0x7F"));
        }
        self.modify(|regs| {
            regs.set_field(
                reg::SYSCONFIG2,
                bits::SEEKTH_MASK,
                u16::from(threshold) << bits::SEEKTH_SHIFT,
            )
        })
    }

    /// Extended volume range
    ///
    /// Attenuates the output by 30 dB for use with
    /// high-gain amplifiers.
    pub fn set_volext(&mut self, extended: bool) -> Result<(), TunerError> {
        self.modify(|regs| regs.set_bit(reg::SYSCONFIG3, bits::VOLEXT, extended))
    }

    /// Softmute rate and attenuation, from 0 to 3
    ///
    /// Sets both the softmute attack/recover rate and the
    /// softmute attenuation to `level`.
    pub fn set_softmute(&mut self, level: u8) -> Result<(), TunerError> {
        if level > 3 {
            return Err(TunerError::InvalidSetting("softmute level must be at most 3"));
        }
        let level = u16::from(level);
        self.modify(|regs| {
            regs.set_field(
                reg::SYSCONFIG3,
                0x3 << bits::SMUTER_SHIFT,
                level << bits::SMUTER_SHIFT,
            );
            regs.set_field(
                reg::SYSCONFIG3,
                0x3 << bits::SMUTEA_SHIFT,
                level << bits::SMUTEA_SHIFT,
            );
        })
    }

    /// Received signal strength, in dBµV
    pub fn signal_strength(&mut self) -> Result<u8, TunerError> {
        self.read()?;
        Ok(self.regs.rssi())
    }

    /// True if the station is stereo and the chip is decoding stereo
    pub fn is_stereo(&mut self) -> Result<bool, TunerError> {
        self.read()?;
        Ok(self.regs.is_stereo())
    }

    // Poll until the chip reports seek/tune complete
    //
    // Returns false if the poll limit is exhausted first.
    fn wait_for_complete(&mut self) -> Result<bool, TunerError> {
        for _ in 0..self.poll_limit {
            self.read()?;
            if self.regs.is_tune_complete() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    // Read, apply `change`, and write back
    fn modify<F>(&mut self, change: F) -> Result<(), TunerError>
    where
        F: FnOnce(&mut RegisterFile),
    {
        self.read()?;
        change(&mut self.regs);
        self.write()
    }

    #[inline]
    fn read(&mut self) -> Result<(), TunerError> {
        self.bus.read_registers(&mut self.regs)?;
        Ok(())
    }

    #[inline]
    fn write(&mut self) -> Result<(), TunerError> {
        self.bus.write_registers(&self.regs)?;
        Ok(())
    }
}

impl<B> RegisterSource for Tuner<B>
where
    B: RegisterBus,
{
    fn read_register_file(&mut self) -> io::Result<RegisterFile> {
        self.bus.read_registers(&mut self.regs)?;
        Ok(self.regs)
    }
}
