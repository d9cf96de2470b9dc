//! RDS program type codes

use std::fmt;

use strum::EnumMessage;

/// RDS program type (PTY)
///
/// Every group carries a five-bit program type code in
/// block B. This is the European (RDS) code table; North
/// American RBDS assigns some codes differently.
///
/// ```
/// use si470x_rds::ProgramType;
///
/// let pty = ProgramType::from_code(10);
/// assert_eq!(ProgramType::PopMusic, pty);
/// assert_eq!(10, pty.code());
/// assert_eq!("Pop Music", pty.as_display_str());
/// assert_eq!("Pop Music", &format!("{}", pty));
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumIter,
    strum_macros::FromRepr,
)]
#[repr(u8)]
pub enum ProgramType {
    /// No program type or undefined
    #[strum(detailed_message = "None")]
    None = 0,
    #[strum(detailed_message = "News")]
    News,
    #[strum(detailed_message = "Current Affairs")]
    CurrentAffairs,
    #[strum(detailed_message = "Information")]
    Information,
    #[strum(detailed_message = "Sport")]
    Sport,
    #[strum(detailed_message = "Education")]
    Education,
    #[strum(detailed_message = "Drama")]
    Drama,
    #[strum(detailed_message = "Culture")]
    Culture,
    #[strum(detailed_message = "Science")]
    Science,
    #[strum(detailed_message = "Varied")]
    Varied,
    #[strum(detailed_message = "Pop Music")]
    PopMusic,
    #[strum(detailed_message = "Rock Music")]
    RockMusic,
    #[strum(detailed_message = "Easy Listening")]
    EasyListening,
    #[strum(detailed_message = "Light Classical")]
    LightClassical,
    #[strum(detailed_message = "Serious Classical")]
    SeriousClassical,
    #[strum(detailed_message = "Other Music")]
    OtherMusic,
    #[strum(detailed_message = "Weather")]
    Weather,
    #[strum(detailed_message = "Finance")]
    Finance,
    #[strum(detailed_message = "Children's")]
    Children,
    #[strum(detailed_message = "Social Affairs")]
    SocialAffairs,
    #[strum(detailed_message = "Religion")]
    Religion,
    #[strum(detailed_message = "Phone In")]
    PhoneIn,
    #[strum(detailed_message = "Travel")]
    Travel,
    #[strum(detailed_message = "Leisure")]
    Leisure,
    #[strum(detailed_message = "Jazz Music")]
    JazzMusic,
    #[strum(detailed_message = "Country Music")]
    CountryMusic,
    #[strum(detailed_message = "National Music")]
    NationalMusic,
    #[strum(detailed_message = "Oldies Music")]
    OldiesMusic,
    #[strum(detailed_message = "Folk Music")]
    FolkMusic,
    #[strum(detailed_message = "Documentary")]
    Documentary,
    /// Emergency test
    #[strum(detailed_message = "Alarm Test")]
    AlarmTest,
    /// Emergency announcement
    #[strum(detailed_message = "Alarm")]
    Alarm,
}

impl ProgramType {
    /// Program type from its five-bit code
    ///
    /// Only the low five bits of `code` are used, so every
    /// input maps to some program type.
    pub fn from_code(code: u8) -> Self {
        Self::from_repr(code & 0x1F).unwrap_or(Self::None)
    }

    /// Five-bit program type code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Human-readable string representation
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }
}

impl Default for ProgramType {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_display_str().fmt(f)
    }
}
