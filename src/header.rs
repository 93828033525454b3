//! Container header metadata.

use std::fmt;

/// Container format version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
}

impl FormatVersion {
    /// Creates a version.
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Four signature bytes at the start of the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Magic(pub [u8; 4]);

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl From<[u8; 4]> for Magic {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

/// Header fields the editing core can change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderMetadata {
    /// Format version.
    pub version: FormatVersion,
    /// Signature bytes.
    pub magic: Magic,
    /// Set while at least one entry is encrypted.
    pub encrypted: bool,
}

impl HeaderMetadata {
    /// Creates header metadata with the given version and signature.
    pub fn new(version: FormatVersion, magic: impl Into<Magic>) -> Self {
        Self {
            version,
            magic: magic.into(),
            encrypted: false,
        }
    }
}
