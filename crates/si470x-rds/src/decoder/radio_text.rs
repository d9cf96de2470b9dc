//! Assembles radio text segments
//!
//! Radio text is up to 64 characters long. It is sent in
//! sixteen segments, in groups 2A or 2B:
//!
//! * Version A segments carry four characters (blocks C and
//!   D). Segment `n` begins at character `4n`.
//! * Version B segments carry two characters (block D only).
//!   Segment `n` begins at character `2n`.
//!
//! The tuner gives us no trustworthy per-block error
//! indication, so we rely on repetition instead. Every
//! character must be received identically on two complete
//! *sweeps* of the message before it is reported:
//!
//! 1. **First sweep**: segments are written into the buffer
//!    as they arrive. When every expected segment has been
//!    seen, the second sweep begins.
//!
//! 2. **Verification sweep**: each segment is compared with
//!    what the first sweep stored. Any disagreement discards
//!    the entire message and starts over with a blank buffer.
//!    When every expected segment has been verified, the text
//!    is reported.
//!
//! The *text A/B flag* flips whenever the broadcaster starts a
//! new message. A flip discards everything received so far.
//! So does a change between version A and version B groups,
//! since the two versions lay out segments differently.
//!
//! Stations repeat their radio text continuously. Once a text
//! has been reported, identical re-verifications of it are
//! suppressed until the A/B flag flips.

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use crate::group::GroupVersion;
use crate::text::{RadioText, RADIO_TEXT_LEN};

/// Number of radio text segment addresses
const SEGMENT_COUNT: u8 = 16;

/// Blank character
const BLANK: u8 = b' ';

/// Presence mask which completes a version A sweep
const TARGET_VERSION_A: u16 = 0xFFFF;

/// Presence mask which completes a version B sweep
///
/// Only the first eight version B segments (16 characters)
/// count toward completion. A sweep is complete once every
/// target segment is present, whatever else has arrived.
/// Characters outside the target are blanked when the
/// verification sweep begins, so a version B message which
/// uses segments 8 – 15 never verifies: segment 8 always
/// disagrees with the blank buffer.
const TARGET_VERSION_B: u16 = 0x00FF;

/// Which sweep is in progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    /// First sweep: accept everything
    First,

    /// Second sweep: compare against the first
    Verify,
}

/// Radio text assembler
///
/// See [module documentation](self).
#[derive(Clone, Debug)]
pub struct RadioTextAssembler {
    buffer: [u8; RADIO_TEXT_LEN],
    present: u16,
    pass: Pass,
    toggle: bool,
    version: Option<GroupVersion>,
    last_emitted: Option<RadioText>,
}

impl RadioTextAssembler {
    /// New assembler with a blank buffer
    pub fn new() -> Self {
        Self {
            buffer: [BLANK; RADIO_TEXT_LEN],
            present: 0,
            pass: Pass::First,
            toggle: false,
            version: None,
            last_emitted: None,
        }
    }

    /// Reset to zero initial conditions
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Most recently verified text for the current message
    pub fn last_verified(&self) -> Option<&RadioText> {
        self.last_emitted.as_ref()
    }

    /// Accept one segment
    ///
    /// Accepts the characters `chars` for the segment address
    /// `segment`, which is interpreted according to the group
    /// `version`. Only the low four bits of `segment` are used.
    /// `chars` should contain four characters for version A or
    /// two for version B; any excess is ignored. `toggle` is
    /// the text A/B flag.
    ///
    /// Returns a newly-verified radio text, if any.
    pub fn observe(
        &mut self,
        version: GroupVersion,
        segment: u8,
        toggle: bool,
        chars: &[u8],
    ) -> Option<RadioText> {
        if toggle != self.toggle {
            debug!(
                "radio text: A/B flag now {}, discarding partial message",
                toggle as u8
            );
            self.clear();
            self.toggle = toggle;
            self.last_emitted = None;
        }

        if self.version.replace(version).is_some_and(|prev| prev != version) {
            debug!(
                "radio text: now version {}, discarding partial message",
                version.as_str()
            );
            self.clear();
        }

        let segment = segment % SEGMENT_COUNT;
        let width = segment_width(version);
        let addr = usize::from(segment) * width;
        let len = usize::min(chars.len(), width);
        let slot = addr..addr + len;

        match self.pass {
            Pass::First => {
                self.buffer[slot].copy_from_slice(&chars[..len]);
            }
            Pass::Verify => {
                if self.buffer[slot] != chars[..len] {
                    debug!(
                        "radio text: segment {} failed verification, restarting",
                        segment
                    );
                    self.clear();
                    return None;
                }
            }
        }

        self.present |= 1 << segment;
        let target = target_mask(version);
        if self.present & target != target {
            return None;
        }

        self.present = 0;
        match self.pass {
            Pass::First => {
                // nothing outside the target will be verified
                let covered = target.count_ones() as usize * width;
                self.buffer[covered..].fill(BLANK);
                self.pass = Pass::Verify;
                None
            }
            Pass::Verify => {
                self.pass = Pass::First;
                self.emit()
            }
        }
    }

    // Report the buffer unless it was just reported
    fn emit(&mut self) -> Option<RadioText> {
        let text = RadioText::from_bytes(self.buffer);
        if self.last_emitted.as_ref() == Some(&text) {
            debug!("radio text: suppressed duplicate \"{}\"", text);
            return None;
        }

        debug!("radio text: verified \"{}\"", text);
        self.last_emitted = Some(text);
        Some(text)
    }

    // Discard all progress on the current message
    fn clear(&mut self) {
        self.buffer = [BLANK; RADIO_TEXT_LEN];
        self.present = 0;
        self.pass = Pass::First;
    }
}

impl Default for RadioTextAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Characters per segment
#[inline]
fn segment_width(version: GroupVersion) -> usize {
    match version {
        GroupVersion::A => 4,
        GroupVersion::B => 2,
    }
}

/// Presence mask for a complete sweep
#[inline]
fn target_mask(version: GroupVersion) -> u16 {
    match version {
        GroupVersion::A => TARGET_VERSION_A,
        GroupVersion::B => TARGET_VERSION_B,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(text: &str) -> [u8; RADIO_TEXT_LEN] {
        let mut out = [BLANK; RADIO_TEXT_LEN];
        out[..text.len()].copy_from_slice(text.as_bytes());
        out
    }

    // send every version A segment of `text` once, in order
    fn sweep_a(
        uut: &mut RadioTextAssembler,
        text: &[u8; RADIO_TEXT_LEN],
        toggle: bool,
    ) -> Vec<RadioText> {
        (0..SEGMENT_COUNT)
            .filter_map(|seg| {
                let addr = usize::from(seg) * 4;
                uut.observe(GroupVersion::A, seg, toggle, &text[addr..addr + 4])
            })
            .collect()
    }

    #[test]
    fn test_two_sweeps_verify() {
        let text = padded("Hello, World!   ");
        let mut uut = RadioTextAssembler::new();

        assert!(sweep_a(&mut uut, &text, false).is_empty());
        assert_eq!(uut.pass, Pass::Verify);

        let out = sweep_a(&mut uut, &text, false);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_bytes(), &text);
        assert_eq!(out[0].trimmed(), "Hello, World!");
        assert_eq!(uut.pass, Pass::First);
        assert_eq!(uut.present, 0);
    }

    #[test]
    fn test_resend_without_toggle_is_quiet() {
        let text = padded("Hello, World!   ");
        let mut uut = RadioTextAssembler::new();
        assert!(sweep_a(&mut uut, &text, false).is_empty());
        assert_eq!(sweep_a(&mut uut, &text, false).len(), 1);

        // the station keeps repeating the same text
        for _ in 0..5 {
            assert!(sweep_a(&mut uut, &text, false).is_empty());
        }

        // a new message with the same content is reported again
        assert!(sweep_a(&mut uut, &text, true).is_empty());
        let out = sweep_a(&mut uut, &text, true);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_bytes(), &text);
    }

    #[test]
    fn test_verification_failure_restarts() {
        let text = padded("The quick brown fox jumps over the lazy dog");
        let mut corrupt = text;
        corrupt[21] ^= 0x04;

        let mut uut = RadioTextAssembler::new();
        assert!(sweep_a(&mut uut, &text, false).is_empty());
        assert!(sweep_a(&mut uut, &corrupt, false).is_empty());

        // segment 5 failed; everything after it was taken as a
        // fresh first sweep, which is incomplete
        assert_eq!(uut.pass, Pass::First);
        assert_eq!(uut.present, 0xFFC0);
        assert_eq!(&uut.buffer[..24], &[BLANK; 24]);

        // a clean pair of sweeps recovers
        assert!(sweep_a(&mut uut, &text, false).is_empty());
        let out = sweep_a(&mut uut, &text, false);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_bytes(), &text);
    }

    #[test]
    fn test_mismatch_blanks_buffer() {
        let text = padded("ABCD");
        let mut uut = RadioTextAssembler::new();
        assert!(sweep_a(&mut uut, &text, false).is_empty());

        assert!(uut.observe(GroupVersion::A, 0, false, b"ABCE").is_none());
        assert_eq!(uut.buffer, [BLANK; RADIO_TEXT_LEN]);
        assert_eq!(uut.present, 0);
        assert_eq!(uut.pass, Pass::First);
    }

    #[test]
    fn test_toggle_discards_partial_sweep() {
        let old = padded("Old message which is almost completely received");
        let new = padded("New");
        let mut uut = RadioTextAssembler::new();

        // fifteen of sixteen segments
        for seg in 0..15u8 {
            let addr = usize::from(seg) * 4;
            assert!(uut
                .observe(GroupVersion::A, seg, false, &old[addr..addr + 4])
                .is_none());
        }

        // flag flips: the last segment belongs to a new message
        assert!(uut
            .observe(GroupVersion::A, 15, true, &new[60..64])
            .is_none());
        assert_eq!(uut.present, 0x8000);
        assert_eq!(&uut.buffer[..60], &[BLANK; 60]);

        assert!(sweep_a(&mut uut, &new, true).is_empty());
        let out = sweep_a(&mut uut, &new, true);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].trimmed(), "New");
    }

    #[test]
    fn test_toggle_during_verification() {
        let text = padded("Abandoned");
        let mut uut = RadioTextAssembler::new();
        assert!(sweep_a(&mut uut, &text, false).is_empty());
        assert_eq!(uut.pass, Pass::Verify);

        assert!(uut.observe(GroupVersion::A, 0, true, b"Next").is_none());
        assert_eq!(uut.pass, Pass::First);
        assert_eq!(&uut.buffer[..8], b"Next    ");
    }

    #[test]
    fn test_out_of_order_segments() {
        let text = padded("Segments may arrive in any order at all, really");
        let mut uut = RadioTextAssembler::new();
        let order = [3u8, 0, 15, 7, 7, 1, 2, 4, 5, 6, 8, 9, 10, 11, 12, 13, 14];

        for _ in 0..2 {
            for (i, seg) in order.iter().enumerate() {
                let addr = usize::from(*seg) * 4;
                let out = uut.observe(GroupVersion::A, *seg, false, &text[addr..addr + 4]);
                if i < order.len() - 1 {
                    assert!(out.is_none());
                } else if let Some(out) = out {
                    assert_eq!(out.as_bytes(), &text);
                }
            }
        }
        assert!(uut.last_emitted.is_some());
    }

    #[test]
    fn test_version_b_completes_on_eight_segments() {
        let mut uut = RadioTextAssembler::new();
        let text = b"Sixteen chars ok";
        let mut out = Vec::new();
        for _ in 0..2 {
            for seg in 0..8u8 {
                let addr = usize::from(seg) * 2;
                out.extend(uut.observe(GroupVersion::B, seg, false, &text[addr..addr + 2]));
            }
        }
        assert_eq!(out.len(), 1);
        assert_eq!(&out[0].as_bytes()[..16], text);
        assert_eq!(&out[0].as_bytes()[16..], &[BLANK; 48]);
    }

    #[test]
    fn test_version_b_upper_segments_never_complete() {
        let mut uut = RadioTextAssembler::new();
        let text = b"A version B message thirty-two..";
        for _ in 0..4 {
            for seg in 0..16u8 {
                let addr = usize::from(seg) * 2;
                assert!(uut
                    .observe(GroupVersion::B, seg, false, &text[addr..addr + 2])
                    .is_none());
            }
            // segments 0..7 complete the first sweep, then
            // segment 8 fails verification
            assert_eq!(uut.pass, Pass::First);
            assert_eq!(uut.present, 0xFE00);
        }
        assert!(uut.last_emitted.is_none());

        // the station drops to sixteen characters without
        // flipping the flag; the assembler still recovers
        let mut out = Vec::new();
        for _ in 0..2 {
            for seg in 0..8u8 {
                let addr = usize::from(seg) * 2;
                out.extend(uut.observe(GroupVersion::B, seg, false, &text[addr..addr + 2]));
            }
        }
        assert_eq!(out.len(), 1);
        assert_eq!(&out[0].as_bytes()[..16], &text[..16]);
        assert_eq!(&out[0].as_bytes()[16..], &[BLANK; 48]);
    }

    #[test]
    fn test_version_change_discards_partial_message() {
        let text = padded("Interrupted by a version B group");
        let mut uut = RadioTextAssembler::new();

        assert!(sweep_a(&mut uut, &text, false).is_empty());
        assert_eq!(uut.pass, Pass::Verify);

        // a 2B group in the middle of a 2A message starts over
        assert!(uut.observe(GroupVersion::B, 0, false, b"Xy").is_none());
        assert_eq!(uut.pass, Pass::First);
        assert_eq!(uut.present, 0x0001);
        assert_eq!(&uut.buffer[..4], b"Xy  ");

        // and so does going back to 2A
        assert!(uut.observe(GroupVersion::A, 1, false, &text[4..8]).is_none());
        assert_eq!(uut.present, 0x0002);
        assert_eq!(&uut.buffer[..4], &[BLANK; 4]);

        assert!(sweep_a(&mut uut, &text, false).is_empty());
        let out = sweep_a(&mut uut, &text, false);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_bytes(), &text);
    }

    #[test]
    fn test_short_chars_accepted() {
        let mut uut = RadioTextAssembler::new();
        assert!(uut.observe(GroupVersion::A, 1, false, b"AB").is_none());
        assert_eq!(&uut.buffer[4..8], b"AB  ");
        assert!(uut.observe(GroupVersion::A, 17, false, b"CDEFGH").is_none());
        assert_eq!(&uut.buffer[4..8], b"CDEF");
    }
}
