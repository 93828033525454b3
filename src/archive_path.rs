//! Canonical archive paths with case-insensitive keys.

use crate::encoding::PathEncoding;
use crate::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Path separator used in canonical paths.
pub const SEPARATOR: char = '/';

/// Maximum length for archive paths (in bytes).
const MAX_PATH_LENGTH: usize = 32768;

/// Characters that are never legal inside an archive path segment.
const ILLEGAL_CHARS: &[char] = &['*', '?', '"', '<', '>', '|', ':'];

/// Windows reserved device names that cannot be used as filenames.
const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Checks if a filename is a Windows reserved name.
///
/// Reserved names are case-insensitive and stay reserved behind an
/// extension (`CON.txt` is reserved).
fn is_windows_reserved(name: &str) -> bool {
    let base = match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    };

    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| base.eq_ignore_ascii_case(reserved))
}

/// Normalizes separators without validating segments.
///
/// Backslashes become `/`, runs of separators collapse into one, and
/// leading or trailing separators are dropped.
///
/// ```
/// use pakedit::archive_path::canonicalize;
///
/// assert_eq!(canonicalize("\\data//sub\\file.txt/"), "data/sub/file.txt");
/// assert_eq!(canonicalize("///"), "");
/// ```
pub fn canonicalize(s: &str) -> String {
    s.split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Computes the comparison key of an already canonical path.
fn key_of(canonical: &str) -> String {
    canonical.to_lowercase()
}

/// A canonical, validated path to an entry or directory inside an archive.
///
/// `ArchivePath` keeps the caller's spelling for display but compares,
/// hashes and orders by a lowercase key, so `Data/A.txt` and `data/a.TXT`
/// name the same entry.
///
/// Construction normalizes separators (see [`canonicalize`]) and then
/// rejects:
/// - empty paths
/// - NUL and other control characters
/// - `*`, `?`, `"`, `<`, `>`, `|` and `:`
/// - `.` and `..` segments
/// - Windows reserved device names
///
/// # Examples
///
/// ```
/// use pakedit::ArchivePath;
///
/// let path = ArchivePath::new("Data\\Sub//File.txt").unwrap();
/// assert_eq!(path.as_str(), "Data/Sub/File.txt");
/// assert_eq!(path.key(), "data/sub/file.txt");
/// assert_eq!(path, ArchivePath::new("data/sub/file.TXT").unwrap());
///
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ArchivePath {
    display: String,
    key: String,
}

impl ArchivePath {
    /// Creates a new `ArchivePath`, canonicalizing and validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the canonical form is empty or
    /// contains an illegal character, segment, or reserved name.
    pub fn new(s: &str) -> Result<Self> {
        let display = canonicalize(s);
        Self::validate(s, &display)?;
        let key = key_of(&display);
        Ok(Self { display, key })
    }

    /// Creates a new `ArchivePath` that must also satisfy `encoding`.
    pub fn with_encoding(s: &str, encoding: &dyn PathEncoding) -> Result<Self> {
        let path = Self::new(s)?;
        if !encoding.is_valid(path.as_str()) {
            return Err(Error::invalid_path(
                s,
                format!("not representable in {} encoding", encoding.name()),
            ));
        }
        Ok(path)
    }

    fn validate(original: &str, s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(Error::invalid_path(original, "empty path"));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::invalid_path(
                original,
                format!("path exceeds maximum length of {} bytes", MAX_PATH_LENGTH),
            ));
        }

        if let Some(c) = s
            .chars()
            .find(|c| c.is_control() || ILLEGAL_CHARS.contains(c))
        {
            let reason = if c == '\0' {
                "contains NUL byte".to_string()
            } else {
                format!("contains illegal character {:?}", c)
            };
            return Err(Error::invalid_path(original, reason));
        }

        for segment in s.split(SEPARATOR) {
            if segment == "." {
                return Err(Error::invalid_path(original, "'.' segment not allowed"));
            }
            if segment == ".." {
                return Err(Error::invalid_path(
                    original,
                    "'..' segment not allowed (path traversal)",
                ));
            }
            if is_windows_reserved(segment) {
                return Err(Error::invalid_path(
                    original,
                    format!("Windows reserved filename '{}' not allowed", segment),
                ));
            }
        }

        Ok(())
    }

    /// Returns the path as a string slice, in the caller's spelling.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Returns the lowercase key used for comparisons.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Joins this path with a relative path.
    pub fn join(&self, other: &str) -> Result<Self> {
        Self::new(&format!("{}/{}", self.display, other))
    }

    /// Joins an optional directory (`None` is the archive root) with a
    /// relative path.
    pub fn join_under(dir: Option<&ArchivePath>, other: &str) -> Result<Self> {
        match dir {
            Some(dir) => dir.join(other),
            None => Self::new(other),
        }
    }

    /// Returns the parent directory of this path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let idx = self.display.rfind(SEPARATOR)?;
        let display = self.display[..idx].to_string();
        let key = key_of(&display);
        Some(Self { display, key })
    }

    /// Returns every ancestor directory, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = ArchivePath> {
        std::iter::successors(self.parent(), |p| p.parent())
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.display.rsplit(SEPARATOR).next().unwrap_or(&self.display)
    }

    /// Returns the file extension, if any.
    ///
    /// A leading dot does not start an extension (`.gitignore` has none).
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        let dot_pos = file_name.rfind('.')?;
        if dot_pos == 0 {
            None
        } else {
            Some(&file_name[dot_pos + 1..])
        }
    }

    /// Returns an iterator over the path components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.display.split(SEPARATOR)
    }

    /// Number of components in this path.
    pub fn depth(&self) -> usize {
        self.key.split(SEPARATOR).count()
    }

    /// Returns true if `self` is `dir` or lies underneath it.
    ///
    /// Comparison is component-wise on keys: `data2/x` is not inside `data`.
    pub fn starts_with(&self, dir: &ArchivePath) -> bool {
        self.key == dir.key || self.is_within(dir)
    }

    /// Returns true if `self` lies strictly underneath `dir`.
    pub fn is_within(&self, dir: &ArchivePath) -> bool {
        self.key.len() > dir.key.len()
            && self.key.starts_with(&dir.key)
            && self.key.as_bytes()[dir.key.len()] == b'/'
    }

    /// Returns the part of this path below `dir`, in the caller's spelling.
    ///
    /// Returns `None` unless `self` lies strictly underneath `dir`.
    pub fn relative_to(&self, dir: &ArchivePath) -> Option<&str> {
        if !self.is_within(dir) {
            return None;
        }
        // Lowercasing may change byte lengths, so skip by component count.
        let mut rest = self.display.as_str();
        for _ in 0..dir.depth() {
            let idx = rest.find(SEPARATOR)?;
            rest = &rest[idx + 1..];
        }
        Some(rest)
    }

    /// Moves this path from underneath `from` to underneath `to`
    /// (`None` is the archive root).
    ///
    /// Returns `None` if `self` does not lie underneath `from`.
    pub fn rebase(&self, from: &ArchivePath, to: Option<&ArchivePath>) -> Option<Self> {
        let rest = self.relative_to(from)?;
        let display = match to {
            Some(to) => format!("{}/{}", to.display, rest),
            None => rest.to_string(),
        };
        let key = key_of(&display);
        Some(Self { display, key })
    }

    /// Returns true if both paths name the same entry but differ in spelling.
    pub fn differs_only_in_case(&self, other: &ArchivePath) -> bool {
        self.key == other.key && self.display != other.display
    }
}

impl PartialEq for ArchivePath {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ArchivePath {}

impl Hash for ArchivePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ArchivePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArchivePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.display
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::AsciiEncoding;
    use std::collections::HashSet;

    fn p(s: &str) -> ArchivePath {
        ArchivePath::new(s).unwrap()
    }

    #[test]
    fn test_valid_nested_path() {
        let path = p("dir/file.txt");
        assert_eq!(path.as_str(), "dir/file.txt");
        assert_eq!(path.key(), "dir/file.txt");
    }

    #[test]
    fn test_separators_normalized() {
        assert_eq!(p("a\\b\\c.txt").as_str(), "a/b/c.txt");
        assert_eq!(p("a//b///c").as_str(), "a/b/c");
        assert_eq!(p("/a/b/").as_str(), "a/b");
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let once = canonicalize("\\x//y\\\\z/");
        assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = p("Data/File.TXT");
        let b = p("data/file.txt");
        assert_eq!(a, b);
        assert!(a.differs_only_in_case(&b));
        assert!(!a.differs_only_in_case(&a.clone()));

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_invalid_empty() {
        assert!(matches!(
            ArchivePath::new("").unwrap_err(),
            Error::InvalidPath { .. }
        ));
        assert!(matches!(
            ArchivePath::new("//\\").unwrap_err(),
            Error::InvalidPath { .. }
        ));
    }

    #[test]
    fn test_invalid_nul_byte() {
        let err = ArchivePath::new("file\0.txt").unwrap_err();
        assert!(err.to_string().contains("NUL"));
    }

    #[test]
    fn test_invalid_wildcards() {
        assert!(ArchivePath::new("data/*.txt").is_err());
        assert!(ArchivePath::new("what?").is_err());
        assert!(ArchivePath::new("a|b").is_err());
    }

    #[test]
    fn test_invalid_dot_segments() {
        assert!(ArchivePath::new("./file").is_err());
        assert!(ArchivePath::new("a/../b").is_err());
        assert!(ArchivePath::new("file..txt").is_ok());
        assert!(ArchivePath::new("...").is_ok());
    }

    #[test]
    fn test_invalid_too_long() {
        let long_path = "a".repeat(MAX_PATH_LENGTH + 1);
        let err = ArchivePath::new(&long_path).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }

    #[test]
    fn test_windows_reserved_rejected() {
        for name in ["CON", "nul.log", "dir/Com1/x"] {
            let err = ArchivePath::new(name).unwrap_err();
            assert!(err.to_string().contains("reserved"), "{}", name);
        }
        for name in ["CONSOLE", "NULL", "COM10"] {
            assert!(ArchivePath::new(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_with_encoding() {
        assert!(ArchivePath::with_encoding("plain.txt", &AsciiEncoding).is_ok());
        let err = ArchivePath::with_encoding("файл.txt", &AsciiEncoding).unwrap_err();
        assert!(err.to_string().contains("ascii"));
    }

    #[test]
    fn test_parent_and_ancestors() {
        let path = p("a/b/c.txt");
        assert_eq!(path.parent().unwrap().as_str(), "a/b");
        let ancestors: Vec<_> = path.ancestors().map(|a| a.as_str().to_string()).collect();
        assert_eq!(ancestors, vec!["a/b", "a"]);
        assert!(p("top").parent().is_none());
    }

    #[test]
    fn test_file_name_and_extension() {
        let path = p("dir/archive.tar.gz");
        assert_eq!(path.file_name(), "archive.tar.gz");
        assert_eq!(path.extension(), Some("gz"));
        assert_eq!(p(".gitignore").extension(), None);
        assert_eq!(p("README").extension(), None);
    }

    #[test]
    fn test_within_is_component_wise() {
        let data = p("data");
        assert!(p("data/x").is_within(&data));
        assert!(p("DATA/sub/x").is_within(&data));
        assert!(!p("data2/x").is_within(&data));
        assert!(!p("data").is_within(&data));
        assert!(p("data").starts_with(&data));
        assert!(!p("dat").starts_with(&data));
    }

    #[test]
    fn test_relative_to_keeps_spelling() {
        let path = p("Data/Sub/File.txt");
        assert_eq!(path.relative_to(&p("data")), Some("Sub/File.txt"));
        assert_eq!(path.relative_to(&p("other")), None);
    }

    #[test]
    fn test_rebase() {
        let path = p("data/old/x.txt");
        let moved = path.rebase(&p("data/old"), Some(&p("data"))).unwrap();
        assert_eq!(moved.as_str(), "data/x.txt");

        let to_root = path.rebase(&p("data"), None).unwrap();
        assert_eq!(to_root.as_str(), "old/x.txt");

        assert!(path.rebase(&p("elsewhere"), None).is_none());
    }

    #[test]
    fn test_join_under() {
        assert_eq!(
            ArchivePath::join_under(Some(&p("dir")), "f.txt")
                .unwrap()
                .as_str(),
            "dir/f.txt"
        );
        assert_eq!(
            ArchivePath::join_under(None, "f.txt").unwrap().as_str(),
            "f.txt"
        );
        assert!(p("dir").join("..").is_err());
    }

    #[test]
    fn test_ordering_by_key() {
        assert!(p("A") < p("b"));
        assert!(p("a") < p("aa"));
        assert_eq!(p("X").cmp(&p("x")), Ordering::Equal);
    }
}
