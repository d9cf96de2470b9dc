//! RDS groups and group classification
//!
//! An RDS *group* is four 16-bit blocks, `A` through `D`. The
//! tuner delivers one group at a time in its `RDSA`..`RDSD`
//! registers. Block B identifies what the rest of the group
//! carries:
//!
//! ```txt
//! block B:  15..12   11    10    9..5   4..0
//!          [ group ][ B0 ][ TP ][ PTY ][ type-specific ]
//! ```
//!
//! The group number and the version bit `B0` together form
//! the [`GroupType`], written like `0A` or `2B`. Only two
//! group numbers carry text that we decode:
//!
//! * `0A`/`0B`: program service name, two characters per
//!   group in block D
//! * `2A`/`2B`: radio text, four characters per group in
//!   blocks C and D (version A) or two characters in block D
//!   (version B)
//!
//! Everything else is ignored.

use std::fmt;

use crate::codes::ProgramType;

/// Group number for the basic tuning group (program service name)
pub const GROUP_SERVICE_NAME: u8 = 0;

/// Group number for radio text
pub const GROUP_RADIO_TEXT: u8 = 2;

/// One RDS group, as read from the tuner
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Group {
    /// Block A: program identification (PI) code
    pub a: u16,

    /// Block B: group type, program type, and type-specific bits
    pub b: u16,

    /// Block C
    pub c: u16,

    /// Block D
    pub d: u16,
}

impl Group {
    /// Group from its four blocks
    pub fn new(a: u16, b: u16, c: u16, d: u16) -> Self {
        Self { a, b, c, d }
    }

    /// Group type from block B
    pub fn group_type(&self) -> GroupType {
        GroupType::from_block_b(self.b)
    }

    /// Program identification code
    pub fn pi(&self) -> u16 {
        self.a
    }

    /// Program type code
    pub fn program_type(&self) -> ProgramType {
        ProgramType::from_code(((self.b >> 5) & 0x1F) as u8)
    }

    /// Traffic program flag
    pub fn traffic_program(&self) -> bool {
        (self.b >> 10) & 0x1 != 0
    }

    /// Classify the group and extract its text payload
    ///
    /// Segment addresses are taken from the low bits of
    /// block B and can never exceed the range of their
    /// assembler.
    ///
    /// ```
    /// use si470x_rds::{Group, GroupKind, GroupVersion};
    ///
    /// // 2A, text A/B flag set, segment 3, "ABCD"
    /// let grp = Group::new(0x1234, 0x2013, 0x4142, 0x4344);
    /// match grp.kind() {
    ///     GroupKind::RadioText { version, segment, toggle, chars } => {
    ///         assert_eq!(GroupVersion::A, version);
    ///         assert_eq!(3, segment);
    ///         assert!(toggle);
    ///         assert_eq!(b"ABCD", chars.as_slice());
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn kind(&self) -> GroupKind {
        let gtype = self.group_type();
        let [d0, d1] = self.d.to_be_bytes();

        if gtype.is_service_name().is_some() {
            GroupKind::ServiceName {
                segment: (self.b & 0x0003) as u8,
                chars: [d0, d1],
            }
        } else if let Some(version) = gtype.is_radio_text() {
            let mut chars = TextChars::new();
            if version == GroupVersion::A {
                let [c0, c1] = self.c.to_be_bytes();
                chars.push(c0);
                chars.push(c1);
            }
            chars.push(d0);
            chars.push(d1);

            GroupKind::RadioText {
                version,
                segment: (self.b & 0x000F) as u8,
                toggle: (self.b >> 4) & 0x1 != 0,
                chars,
            }
        } else {
            GroupKind::Ignored(gtype)
        }
    }
}

impl From<[u16; 4]> for Group {
    fn from(blocks: [u16; 4]) -> Self {
        Self::new(blocks[0], blocks[1], blocks[2], blocks[3])
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:04X} {:04X} {:04X} {:04X}",
            self.group_type(),
            self.a,
            self.b,
            self.c,
            self.d
        )
    }
}

/// Group version
///
/// Version A groups carry a type-specific payload in block C.
/// Version B groups repeat the PI code in block C instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupVersion {
    A,
    B,
}

impl GroupVersion {
    /// Letter for this version
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupVersion::A => "A",
            GroupVersion::B => "B",
        }
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

/// Group number and version
///
/// ```
/// use si470x_rds::{GroupType, GroupVersion};
///
/// let gtype = GroupType::from_block_b(0x2800);
/// assert_eq!(2, gtype.number());
/// assert_eq!(GroupVersion::B, gtype.version());
/// assert_eq!(Some(GroupVersion::B), gtype.is_radio_text());
/// assert_eq!(None, gtype.is_service_name());
/// assert_eq!("2B", &format!("{}", gtype));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupType {
    number: u8,
    version: GroupVersion,
}

impl GroupType {
    /// Decode from block B
    ///
    /// The group number is the high nibble and the version
    /// is bit 11.
    pub fn from_block_b(b: u16) -> Self {
        Self {
            number: ((b >> 12) & 0x0F) as u8,
            version: if (b >> 11) & 0x1 == 0 {
                GroupVersion::A
            } else {
                GroupVersion::B
            },
        }
    }

    /// Group number, 0 – 15
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Group version
    pub fn version(&self) -> GroupVersion {
        self.version
    }

    /// Five-bit code: group number followed by the version bit
    pub fn code(&self) -> u8 {
        (self.number << 1) | (self.version == GroupVersion::B) as u8
    }

    /// If this group carries the program service name, its version
    pub fn is_service_name(&self) -> Option<GroupVersion> {
        (self.number == GROUP_SERVICE_NAME).then_some(self.version)
    }

    /// If this group carries radio text, its version
    pub fn is_radio_text(&self) -> Option<GroupVersion> {
        (self.number == GROUP_RADIO_TEXT).then_some(self.version)
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.version)
    }
}

/// Up to four text characters carried by a radio text group
pub type TextChars = arrayvec::ArrayVec<u8, 4>;

/// Classified group contents
///
/// See [`Group::kind()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupKind {
    /// Program service name segment (group 0A / 0B)
    ServiceName {
        /// Segment address, 0 – 3
        segment: u8,

        /// Two characters from block D
        chars: [u8; 2],
    },

    /// Radio text segment (group 2A / 2B)
    RadioText {
        /// Group version, which sets the segment width
        version: GroupVersion,

        /// Segment address, 0 – 15
        segment: u8,

        /// Text A/B flag
        toggle: bool,

        /// Four characters (version A) or two (version B)
        chars: TextChars,
    },

    /// Some other group type, which we do not decode
    Ignored(GroupType),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_type() {
        let gtype = GroupType::from_block_b(0x0000);
        assert_eq!(gtype.number(), 0);
        assert_eq!(gtype.version(), GroupVersion::A);
        assert_eq!(gtype.code(), 0);
        assert_eq!(gtype.is_service_name(), Some(GroupVersion::A));
        assert_eq!(gtype.is_radio_text(), None);

        let gtype = GroupType::from_block_b(0x0800);
        assert_eq!(gtype.is_service_name(), Some(GroupVersion::B));
        assert_eq!(gtype.code(), 1);

        let gtype = GroupType::from_block_b(0x2000);
        assert_eq!(gtype.is_radio_text(), Some(GroupVersion::A));
        assert_eq!(gtype.code(), 4);

        let gtype = GroupType::from_block_b(0xF8FF);
        assert_eq!(gtype.number(), 15);
        assert_eq!(gtype.version(), GroupVersion::B);
        assert_eq!(gtype.is_service_name(), None);
        assert_eq!(gtype.is_radio_text(), None);
        assert_eq!(format!("{}", gtype), "15B");
    }

    #[test]
    fn test_header_fields() {
        // TP set, PTY 10
        let grp = Group::new(0x52AB, 0x0400 | (10 << 5), 0, 0);
        assert_eq!(grp.pi(), 0x52AB);
        assert!(grp.traffic_program());
        assert_eq!(grp.program_type(), ProgramType::PopMusic);
    }

    #[test]
    fn test_kind_service_name() {
        // 0A, segment 2; PTY bits must not leak into the segment
        let grp = Group::new(0x1234, 0x0000 | (31 << 5) | 0x0006, 0xE0E0, 0x4546);
        assert_eq!(
            grp.kind(),
            GroupKind::ServiceName {
                segment: 2,
                chars: *b"EF"
            }
        );

        // 0B behaves identically
        let grp = Group::new(0x1234, 0x0803, 0x1234, 0x4748);
        assert_eq!(
            grp.kind(),
            GroupKind::ServiceName {
                segment: 3,
                chars: *b"GH"
            }
        );
    }

    #[test]
    fn test_kind_radio_text_b() {
        // 2B, toggle clear, segment 15
        let grp = Group::new(0x1234, 0x280F, 0x1234, 0x5859);
        match grp.kind() {
            GroupKind::RadioText {
                version,
                segment,
                toggle,
                chars,
            } => {
                assert_eq!(version, GroupVersion::B);
                assert_eq!(segment, 15);
                assert!(!toggle);
                assert_eq!(chars.as_slice(), b"XY");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_kind_ignored() {
        let grp = Group::new(0x1234, 0x5000, 0x4142, 0x4344);
        assert_eq!(
            grp.kind(),
            GroupKind::Ignored(GroupType::from_block_b(0x5000))
        );
        assert_eq!(format!("{}", grp), "5A: 1234 5000 4142 4344");
    }
}
