//! Decoded station text

use std::fmt;

use arrayvec::ArrayString;

/// Length of the program service name, in characters
pub const SERVICE_NAME_LEN: usize = 8;

/// Maximum length of radio text, in characters
pub const RADIO_TEXT_LEN: usize = 64;

/// Radio text end-of-message marker
const CARRIAGE_RETURN: u8 = 0x0D;

/// Program service name
///
/// The eight-character station identifier, like "`KXYZ FM `".
/// The raw bytes are retained exactly as received. The string
/// representation replaces anything that is not printable
/// ASCII with a space.
///
/// ```
/// use si470x_rds::ServiceName;
///
/// let ps = ServiceName::from_bytes(*b"KXYZ\x01FM ");
/// assert_eq!("KXYZ FM ", ps.as_str());
/// assert_eq!(b"KXYZ\x01FM ", ps.as_bytes());
/// assert_eq!("KXYZ FM", &format!("{}", ps));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ServiceName {
    raw: [u8; SERVICE_NAME_LEN],
    text: ArrayString<SERVICE_NAME_LEN>,
}

impl ServiceName {
    /// Service name from raw received bytes
    pub fn from_bytes(raw: [u8; SERVICE_NAME_LEN]) -> Self {
        Self {
            raw,
            text: printable(&raw),
        }
    }

    /// All eight characters, printable
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Raw bytes, as received
    pub fn as_bytes(&self) -> &[u8; SERVICE_NAME_LEN] {
        &self.raw
    }

    /// Service name without trailing padding
    pub fn trimmed(&self) -> &str {
        self.text.trim_end()
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.trimmed().fmt(f)
    }
}

/// Radio text
///
/// Up to 64 characters of free-form text, like a song title.
/// Broadcasters pad short messages with spaces or end them
/// with a carriage return. [`as_str()`](RadioText::as_str)
/// returns the complete 64-character buffer;
/// [`trimmed()`](RadioText::trimmed) returns only the message.
///
/// ```
/// use si470x_rds::RadioText;
///
/// let mut raw = [b' '; 64];
/// raw[0..7].copy_from_slice(b"On air\r");
/// let rt = RadioText::from_bytes(raw);
///
/// assert_eq!(64, rt.as_str().len());
/// assert_eq!("On air", rt.trimmed());
/// assert_eq!("On air", &format!("{}", rt));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RadioText {
    raw: [u8; RADIO_TEXT_LEN],
    text: ArrayString<RADIO_TEXT_LEN>,
}

impl RadioText {
    /// Radio text from raw received bytes
    pub fn from_bytes(raw: [u8; RADIO_TEXT_LEN]) -> Self {
        Self {
            raw,
            text: printable(&raw),
        }
    }

    /// All 64 characters, printable
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Raw bytes, as received
    pub fn as_bytes(&self) -> &[u8; RADIO_TEXT_LEN] {
        &self.raw
    }

    /// Message text
    ///
    /// Ends at the first carriage return or NUL, if any, with
    /// trailing spaces removed.
    pub fn trimmed(&self) -> &str {
        let end = self
            .raw
            .iter()
            .position(|&b| b == CARRIAGE_RETURN || b == 0)
            .unwrap_or(RADIO_TEXT_LEN);
        self.text[..end].trim_end()
    }
}

impl AsRef<str> for RadioText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RadioText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.trimmed().fmt(f)
    }
}

// Map raw bytes to printable ASCII, one character per byte
fn printable<const N: usize>(raw: &[u8; N]) -> ArrayString<N> {
    let mut out = ArrayString::new();
    for &b in raw {
        out.push(if (0x20..=0x7e).contains(&b) {
            b as char
        } else {
            ' '
        });
    }
    out
}
