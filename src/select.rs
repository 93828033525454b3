//! Entry selection by pattern.
//!
//! | Selector | Description |
//! |----------|-------------|
//! | `SelectByWildcard` | `*`/`?`/`[..]` wildcards, case-insensitive |
//! | `SelectByRegex` | Regex-based selection (requires `regex` feature) |
//! | `Fn(&ArchivePath) -> bool` | Custom selection |

use crate::archive_path::canonicalize;
use crate::{ArchivePath, Error, Result};

/// Decides which entries an operation applies to.
pub trait EntrySelector {
    /// Returns true if the entry at `path` should be selected.
    fn select(&self, path: &ArchivePath) -> bool;
}

impl<F> EntrySelector for F
where
    F: Fn(&ArchivePath) -> bool,
{
    fn select(&self, path: &ArchivePath) -> bool {
        self(path)
    }
}

/// Selects entries with a shell-style wildcard pattern.
///
/// A pattern without a separator is matched against the file name alone,
/// so `*.tmp` selects temporary files in every directory. A pattern with a
/// separator is matched against the whole path, where `*` stops at `/` and
/// `**` spans directories.
///
/// # Example
///
/// ```
/// use pakedit::ArchivePath;
/// use pakedit::select::{EntrySelector, SelectByWildcard};
///
/// let by_name = SelectByWildcard::new("*.TMP").unwrap();
/// assert!(by_name.select(&ArchivePath::new("cache/a.tmp").unwrap()));
///
/// let by_path = SelectByWildcard::new("cache/*").unwrap();
/// assert!(by_path.select(&ArchivePath::new("cache/a.tmp").unwrap()));
/// assert!(!by_path.select(&ArchivePath::new("cache/sub/b.tmp").unwrap()));
/// ```
#[derive(Debug, Clone)]
pub struct SelectByWildcard {
    pattern: glob::Pattern,
    whole_path: bool,
}

impl SelectByWildcard {
    /// Creates a selector for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern cannot be parsed.
    pub fn new(pattern: &str) -> Result<Self> {
        let canonical = canonicalize(pattern);
        if canonical.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "empty pattern".into(),
            });
        }
        let compiled = glob::Pattern::new(&canonical).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: compiled,
            whole_path: canonical.contains('/'),
        })
    }

    /// Returns the compiled pattern.
    pub fn pattern(&self) -> &glob::Pattern {
        &self.pattern
    }

    fn match_options() -> glob::MatchOptions {
        glob::MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        }
    }
}

impl EntrySelector for SelectByWildcard {
    fn select(&self, path: &ArchivePath) -> bool {
        let subject = if self.whole_path {
            path.as_str()
        } else {
            path.file_name()
        };
        self.pattern.matches_with(subject, Self::match_options())
    }
}

/// Selects entries whose full path matches a regular expression.
///
/// Matching is case-insensitive, like path comparison.
#[cfg(feature = "regex")]
#[derive(Debug, Clone)]
pub struct SelectByRegex {
    pattern: regex::Regex,
}

#[cfg(feature = "regex")]
impl SelectByRegex {
    /// Creates a selector with the given regex pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegex`] if the pattern is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = regex::RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { pattern: regex })
    }

    /// Returns the underlying regex pattern.
    pub fn pattern(&self) -> &regex::Regex {
        &self.pattern
    }
}

#[cfg(feature = "regex")]
impl EntrySelector for SelectByRegex {
    fn select(&self, path: &ArchivePath) -> bool {
        self.pattern.is_match(path.as_str())
    }
}
