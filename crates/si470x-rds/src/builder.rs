use std::time::Duration;

use crate::decoder::Decoder;
use crate::registers::RegisterBus;
use crate::tuner::{Region, SeekPreset, Tuner, TunerError};

/// Builds an RDS decoder
///
/// Both station text assemblers are enabled by default.
/// If you only care about one of them, disabling the other
/// saves a little work per group.
///
/// ```
/// use si470x_rds::DecoderBuilder;
///
/// let decoder = DecoderBuilder::new()
///     .with_radio_text(false)
///     .build();
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecoderBuilder {
    service_name: bool,
    radio_text: bool,
}

impl DecoderBuilder {
    /// New decoder with all assemblers enabled
    pub fn new() -> Self {
        Self {
            service_name: true,
            radio_text: true,
        }
    }

    /// Build a decoder
    ///
    /// Once built, the decoder is immediately ready to accept
    /// groups.
    pub fn build(&self) -> Decoder {
        Decoder::from(self)
    }

    /// Decode program service names (groups 0A and 0B)
    pub fn with_service_name(&mut self, enable: bool) -> &mut Self {
        self.service_name = enable;
        self
    }

    /// Decode radio text (groups 2A and 2B)
    pub fn with_radio_text(&mut self, enable: bool) -> &mut Self {
        self.radio_text = enable;
        self
    }

    /// Program service names are decoded
    pub fn service_name(&self) -> bool {
        self.service_name
    }

    /// Radio text is decoded
    pub fn radio_text(&self) -> bool {
        self.radio_text
    }
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Powers up an Si470x tuner
///
/// The only mandatory parameter is the [`Region`], which
/// selects the band and channel spacing. Everything else
/// has a workable default.
///
/// The actual default values are *not* part of this crate's
/// API and may be revised in any minor release. If you care
/// very strongly about a setting, be sure to configure it
/// here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TunerBuilder {
    region: Region,
    volume: Option<u8>,
    seek_preset: Option<SeekPreset>,
    settle_time: Duration,
    poll_limit: u32,
}

impl TunerBuilder {
    /// New tuner configuration for the given region
    pub fn new(region: Region) -> Self {
        Self {
            region,
            volume: None,
            seek_preset: None,
            settle_time: Duration::from_millis(500),
            poll_limit: 100,
        }
    }

    /// Power up the tuner
    ///
    /// Runs the power-up sequence over the given register
    /// transport and applies any volume or seek settings.
    /// Blocks for at least the
    /// [settle time](TunerBuilder::with_settle_time).
    ///
    /// Fails if the transport fails or if the chip does not
    /// report its firmware revision within the
    /// [poll limit](TunerBuilder::with_poll_limit).
    pub fn build<B>(&self, bus: B) -> Result<Tuner<B>, TunerError>
    where
        B: RegisterBus,
    {
        Tuner::power_up(bus, self)
    }

    /// Initial volume, from 0 to 99
    ///
    /// If unset, the chip's power-on volume is kept.
    pub fn with_volume(&mut self, volume: u8) -> &mut Self {
        self.volume = Some(u8::min(volume, 99));
        self
    }

    /// Initial seek sensitivity
    ///
    /// If unset, the chip's power-on seek settings are kept.
    pub fn with_seek_preset(&mut self, preset: SeekPreset) -> &mut Self {
        self.seek_preset = Some(preset);
        self
    }

    /// Crystal oscillator settling time
    ///
    /// The oscillator must be allowed to settle before the
    /// chip is enabled. Silicon Labs recommends at least
    /// 500 ms. Use zero only with simulated hardware.
    pub fn with_settle_time(&mut self, settle: Duration) -> &mut Self {
        self.settle_time = settle;
        self
    }

    /// Maximum register reads per status wait
    ///
    /// Powering up, tuning, and seeking all poll the chip
    /// until a status bit changes. If it has not changed
    /// after `reads` register reads, the operation fails
    /// with a timeout. Seeks across the whole band may take
    /// many reads on slow transports.
    pub fn with_poll_limit(&mut self, reads: u32) -> &mut Self {
        self.poll_limit = u32::max(reads, 1);
        self
    }

    /// Band and channel spacing
    pub fn region(&self) -> Region {
        self.region
    }

    /// Initial volume
    pub fn volume(&self) -> Option<u8> {
        self.volume
    }

    /// Initial seek sensitivity
    pub fn seek_preset(&self) -> Option<SeekPreset> {
        self.seek_preset
    }

    /// Crystal oscillator settling time
    pub fn settle_time(&self) -> Duration {
        self.settle_time
    }

    /// Maximum register reads per status wait
    pub fn poll_limit(&self) -> u32 {
        self.poll_limit
    }
}

impl Default for TunerBuilder {
    fn default() -> Self {
        Self::new(Region::default())
    }
}
