//! Path encoding predicates.
//!
//! Archive formats store entry names in a fixed character encoding. The
//! editing core never encodes names itself; it only asks a [`PathEncoding`]
//! whether a name would survive the round trip, so invalid names are refused
//! before any edit is recorded.

/// Decides whether a canonical path is representable in the target encoding.
pub trait PathEncoding: Send + Sync {
    /// Returns true if `path` can be stored without loss.
    fn is_valid(&self, path: &str) -> bool;

    /// Short human-readable name, used in error messages.
    fn name(&self) -> &str {
        "target"
    }
}

/// Accepts every path (UTF-8 names).
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Encoding;

impl PathEncoding for Utf8Encoding {
    fn is_valid(&self, _path: &str) -> bool {
        true
    }

    fn name(&self) -> &str {
        "utf-8"
    }
}

/// Accepts printable ASCII only.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiEncoding;

impl PathEncoding for AsciiEncoding {
    fn is_valid(&self, path: &str) -> bool {
        path.bytes().all(|b| (0x20..0x7f).contains(&b))
    }

    fn name(&self) -> &str {
        "ascii"
    }
}

/// Accepts code points up to U+00FF (ISO-8859-1).
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1Encoding;

impl PathEncoding for Latin1Encoding {
    fn is_valid(&self, path: &str) -> bool {
        path.chars().all(|c| (c as u32) <= 0xff)
    }

    fn name(&self) -> &str {
        "latin-1"
    }
}

impl<F> PathEncoding for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, path: &str) -> bool {
        self(path)
    }
}
