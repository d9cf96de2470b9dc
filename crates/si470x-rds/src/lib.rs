//! # si470x-rds: RDS Text for Si470x FM Tuners
//!
//! This crate decodes station text from the
//! [Radio Data System](https://en.wikipedia.org/wiki/Radio_Data_System)
//! (RDS) as received by the Silicon Labs Si4702 and Si4703 FM
//! tuners. It recovers two kinds of text:
//!
//! * the eight-character **program service name**, which
//!   identifies the station; and
//! * the 64-character **radio text**, a free-form message
//!   which often carries the song title or artist.
//!
//! It also offers a small [`Tuner`] for powering up the chip,
//! tuning, and seeking.
//!
//! ## Example
//!
//! The Si470x demodulates RDS itself and presents each
//! received *group* of four 16-bit blocks in its register
//! file. All you need to provide is a way to read the
//! registers, via the [`RegisterSource`] trait. The serial
//! transport is up to you.
//!
//! ```
//! use si470x_rds::{DecoderBuilder, RegisterFile, reg};
//!
//! # let snapshots_from_your_tuner = || std::iter::empty::<RegisterFile>();
//! let mut decoder = DecoderBuilder::new().build();
//!
//! for regs in snapshots_from_your_tuner() {
//!     if let Some(evt) = decoder.observe_registers(&regs) {
//!         println!("{}", evt);
//!     }
//! }
//!
//! // registers are addressed by name
//! assert_eq!(reg::RDSA, 12);
//! ```
//!
//! The [`Decoder`] accepts one [`Group`] at a time. Groups
//! may come straight from a [`RegisterFile`], from a
//! [`RegisterSource`] via [`Decoder::poll()`], or from any
//! iterator via [`Decoder::iter()`].
//!
//! Whenever new text has been received and *verified*, the
//! decoder emits a [`DecoderEvent`]. RDS has no forward error
//! correction that the chip exposes to us, so the decoder
//! trusts only text which it has received more than once
//! with identical contents.
//!
//! ## Background
//!
//! RDS is a low-rate (1187.5 bps) digital subcarrier on FM
//! broadcast stations. Its data is organized into groups of
//! four blocks, `A` through `D`. Block `A` carries the
//! program identification (PI) code. The high bits of block
//! `B` carry the group type, which determines what the rest
//! of the group means.
//!
//! * Groups `0A` and `0B` carry two characters of the
//!   service name at a time.
//! * Groups `2A` and `2B` carry four (or two) characters
//!   of radio text at a time.
//!
//! All other group types are counted and ignored.

mod builder;
mod codes;
mod decoder;
mod group;
mod registers;
mod text;
mod tuner;

pub use builder::{DecoderBuilder, TunerBuilder};
pub use codes::ProgramType;
pub use decoder::{
    Decoder, DecoderEvent, GroupIter, RadioTextAssembler, ServiceNameAssembler, StationText,
};
pub use group::{Group, GroupKind, GroupType, GroupVersion, TextChars};
pub use registers::{bits, reg, RegisterBus, RegisterFile, RegisterSource, REGISTER_COUNT};
pub use text::{RadioText, ServiceName, RADIO_TEXT_LEN, SERVICE_NAME_LEN};
pub use tuner::{Region, SeekDirection, SeekPreset, Tuner, TunerError};
