//! Assembles program service name segments
//!
//! The eight-character service name is sent as four segments
//! of two characters each, in groups 0A and 0B. Stations
//! repeat the name continuously, so every segment will be
//! received many times.
//!
//! Each segment is verified independently: a character pair
//! is trusted only when it is received twice in a row with
//! identical contents. A segment received with errors simply
//! waits for two more agreeing receptions. It never disturbs
//! the other three segments.
//!
//! The name is published when
//!
//! 1. the last segment (address 3) has just been confirmed;
//! 2. all four segments are confirmed and agree with the
//!    most recent receptions; and
//! 3. the result differs from the name we last published.

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use crate::text::{ServiceName, SERVICE_NAME_LEN};

/// Number of service name segments
const SEGMENT_COUNT: u8 = 4;

/// Characters per segment
const SEGMENT_WIDTH: usize = 2;

/// Confirmation mask with every segment present
const ALL_SEGMENTS: u8 = (1 << SEGMENT_COUNT) - 1;

/// Program service name assembler
///
/// See [module documentation](self).
#[derive(Clone, Debug)]
pub struct ServiceNameAssembler {
    // most recent reception of each segment, unconfirmed
    candidate: [u8; SERVICE_NAME_LEN],

    // receptions which matched the candidate
    confirmed: [u8; SERVICE_NAME_LEN],

    // bit n set once segment n has been confirmed
    confirmed_segments: u8,

    // the name we last published
    published: Option<ServiceName>,
}

impl ServiceNameAssembler {
    /// New assembler with nothing received
    pub fn new() -> Self {
        Self {
            candidate: [0u8; SERVICE_NAME_LEN],
            confirmed: [0u8; SERVICE_NAME_LEN],
            confirmed_segments: 0,
            published: None,
        }
    }

    /// Reset to zero initial conditions
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Most recently published name, if any
    pub fn published(&self) -> Option<&ServiceName> {
        self.published.as_ref()
    }

    /// Accept one segment
    ///
    /// Accepts the two characters `chars` for the given
    /// segment address. Only the low two bits of `segment` are
    /// used. Returns a newly-published service name, if any.
    pub fn observe(&mut self, segment: u8, chars: [u8; 2]) -> Option<ServiceName> {
        let segment = segment % SEGMENT_COUNT;
        let addr = usize::from(segment) * SEGMENT_WIDTH;
        let slot = addr..addr + SEGMENT_WIDTH;

        if self.candidate[slot.clone()] != chars {
            // new or changed; wait for it to repeat
            self.candidate[slot].copy_from_slice(&chars);
            return None;
        }

        self.confirmed[slot].copy_from_slice(&chars);
        self.confirmed_segments |= 1 << segment;

        if segment != SEGMENT_COUNT - 1
            || self.confirmed_segments != ALL_SEGMENTS
            || self.confirmed != self.candidate
        {
            return None;
        }

        let name = ServiceName::from_bytes(self.confirmed);
        if self.published.as_ref() == Some(&name) {
            return None;
        }

        debug!("service name: published \"{}\"", name.as_str());
        self.published = Some(name);
        Some(name)
    }
}

impl Default for ServiceNameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
