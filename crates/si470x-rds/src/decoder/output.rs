use std::fmt;

use crate::codes::ProgramType;
use crate::group::Group;
use crate::text::{RadioText, ServiceName};

/// A decoder output event
///
/// Events are emitted whenever one of the assemblers verifies
/// a new piece of station text. The
/// [`what()`](DecoderEvent::what) method returns the text.
/// The event also records the program identification and
/// program type of the group which completed it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecoderEvent {
    what: StationText,
    pi: u16,
    program_type: ProgramType,
    group_counter: u64,
}

impl DecoderEvent {
    /// The newly-verified station text
    pub fn what(&self) -> &StationText {
        &self.what
    }

    /// Consume event, returning its station text
    pub fn into_what(self) -> StationText {
        self.what
    }

    /// Program service name, if this event carries one
    pub fn service_name(&self) -> Option<&ServiceName> {
        match &self.what {
            StationText::ServiceName(ps) => Some(ps),
            _ => None,
        }
    }

    /// Radio text, if this event carries one
    pub fn radio_text(&self) -> Option<&RadioText> {
        match &self.what {
            StationText::RadioText(rt) => Some(rt),
            _ => None,
        }
    }

    /// Program identification code of the completing group
    pub fn pi(&self) -> u16 {
        self.pi
    }

    /// Program type of the completing group
    pub fn program_type(&self) -> ProgramType {
        self.program_type
    }

    /// Event time, measured in groups
    ///
    /// Reports the "time" of the event using a monotonic count
    /// of groups observed by the decoder, including ignored
    /// ones.
    pub fn group_counter(&self) -> u64 {
        self.group_counter
    }
}

impl DecoderEvent {
    /// Create from text and the group which completed it
    pub(crate) fn new<T>(what: T, group: &Group, group_counter: u64) -> Self
    where
        T: Into<StationText>,
    {
        Self {
            what: what.into(),
            pi: group.pi(),
            program_type: group.program_type(),
            group_counter,
        }
    }
}

impl From<DecoderEvent> for StationText {
    fn from(evt: DecoderEvent) -> Self {
        evt.into_what()
    }
}

impl fmt::Display for DecoderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:<10}]: PI {:04X} ({}): {}",
            self.group_counter, self.pi, self.program_type, self.what
        )
    }
}

/// Verified station text
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StationText {
    /// Program service name (station identifier)
    ServiceName(ServiceName),

    /// Radio text (free-form message)
    RadioText(RadioText),
}

impl StationText {
    /// Short code for the kind of text: `PS` or `RT`
    pub fn as_code_str(&self) -> &'static str {
        match self {
            StationText::ServiceName(_) => "PS",
            StationText::RadioText(_) => "RT",
        }
    }

    /// Text, without padding
    pub fn trimmed(&self) -> &str {
        match self {
            StationText::ServiceName(ps) => ps.trimmed(),
            StationText::RadioText(rt) => rt.trimmed(),
        }
    }
}

impl From<ServiceName> for StationText {
    fn from(inp: ServiceName) -> Self {
        Self::ServiceName(inp)
    }
}

impl From<RadioText> for StationText {
    fn from(inp: RadioText) -> Self {
        Self::RadioText(inp)
    }
}

impl AsRef<str> for StationText {
    fn as_ref(&self) -> &str {
        match self {
            StationText::ServiceName(_) => "service name",
            StationText::RadioText(_) => "radio text",
        }
    }
}

impl fmt::Display for StationText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{}\"", self.as_ref(), self.trimmed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let grp = Group::new(0xC201, 0x0003 | (4 << 5), 0, 0x2020);
        let evt = DecoderEvent::new(ServiceName::from_bytes(*b"SPORT   "), &grp, 42);

        assert_eq!(evt.pi(), 0xC201);
        assert_eq!(evt.program_type(), ProgramType::Sport);
        assert_eq!(evt.group_counter(), 42);
        assert_eq!(evt.what().as_code_str(), "PS");
        assert_eq!(evt.service_name().unwrap().as_str(), "SPORT   ");
        assert!(evt.radio_text().is_none());
        assert_eq!(
            format!("{}", evt),
            "[42        ]: PI C201 (Sport): service name: \"SPORT\""
        );

        match StationText::from(evt) {
            StationText::ServiceName(ps) => assert_eq!(ps.trimmed(), "SPORT"),
            _ => unreachable!(),
        }
    }
}
