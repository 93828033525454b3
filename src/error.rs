//! Error types for archive editing operations.
//!
//! This module provides the [`Error`] enum which represents every way a
//! structural edit can be refused, along with a convenient [`Result<T>`]
//! type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Every
//! structural check runs before the table is touched, so an `Err` from a
//! single edit always means nothing changed:
//!
//! ```rust
//! use pakedit::{Container, Error};
//!
//! let container: Container<Vec<u8>> = Container::new();
//! container.add_file("data/a.txt", b"one".to_vec(), ()).unwrap();
//!
//! match container.rename("data/missing.txt", "data/b.txt", ()) {
//!     Err(Error::PathNotFound { path }) => assert_eq!(path, "data/missing.txt"),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! assert!(container.contains_file("data/a.txt"));
//! ```
//!
//! ## Grouped edits
//!
//! When a command fails inside an open group, every command of the group that
//! already ran is undone in reverse order before the error reaches the caller.
//! The error returned is the one raised by the failing command.

/// The main error type for archive editing operations.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Path | [`InvalidPath`][Self::InvalidPath], [`PathNotFound`][Self::PathNotFound] | Bad or missing path |
/// | Conflict | [`AlreadyExists`][Self::AlreadyExists], [`SubfolderConflict`][Self::SubfolderConflict], [`HiddenFolderConflict`][Self::HiddenFolderConflict] | Name collisions |
/// | State | [`ConcurrentSaveInProgress`][Self::ConcurrentSaveInProgress], [`NestedTransaction`][Self::NestedTransaction], [`NoTransaction`][Self::NoTransaction], [`TransactionInProgress`][Self::TransactionInProgress] | Call made at the wrong time |
/// | Selection | [`InvalidPattern`][Self::InvalidPattern] | Bad wildcard or regex |
/// | Collaborators | [`Cipher`][Self::Cipher], [`Persist`][Self::Persist] | External payload transform or save failed |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A path is empty, malformed, or contains characters the target
    /// encoding cannot represent.
    ///
    /// Also returned when an edit would place a file where a directory
    /// exists (or the reverse), since one path cannot be both.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path, as supplied by the caller.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// No file or directory exists at the given path.
    #[error("Path not found: {path}")]
    PathNotFound {
        /// The path that was not found.
        path: String,
    },

    /// The destination of a rename or move is already taken.
    ///
    /// Directories are never combined by a rename; use
    /// [`Container::merge_folders`](crate::Container::merge_folders) to fold
    /// one directory into another.
    #[error("Path already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: String,
    },

    /// A directory was asked to move inside itself.
    #[error("Cannot move '{from}' into its own subfolder '{to}'")]
    SubfolderConflict {
        /// The directory being moved.
        from: String,
        /// The destination nested inside it.
        to: String,
    },

    /// The destination directory name is reserved as hidden.
    #[error("Folder name is reserved as hidden: {path}")]
    HiddenFolderConflict {
        /// The reserved directory path.
        path: String,
    },

    /// A save is running; edits are refused until it completes.
    #[error("a save operation is in progress")]
    ConcurrentSaveInProgress,

    /// The operation was cancelled through its progress reporter.
    ///
    /// Everything the operation had applied is rolled back before this is
    /// returned.
    #[error("Operation cancelled")]
    Cancelled,

    /// `begin` was called while a group was already open.
    #[error("a transaction is already open")]
    NestedTransaction,

    /// `end` or `cancel_edit` was called with no open group.
    #[error("no transaction is open")]
    NoTransaction,

    /// Undo, redo or save was requested while a group is open.
    #[error("operation not allowed while a transaction is open")]
    TransactionInProgress,

    /// A wildcard pattern could not be parsed.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The invalid pattern.
        pattern: String,
        /// Description of why the pattern is invalid.
        reason: String,
    },

    /// An invalid regular expression pattern was provided.
    #[cfg(feature = "regex")]
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegex {
        /// The invalid regex pattern.
        pattern: String,
        /// Description of why the pattern is invalid.
        reason: String,
    },

    /// The payload cipher failed to transform an entry.
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// The persistence collaborator reported a failure.
    #[error("Persist failed: {0}")]
    Persist(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Creates an `InvalidPath` error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `PathNotFound` error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::PathNotFound { path: path.into() }
    }

    /// Creates an `AlreadyExists` error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Error::AlreadyExists { path: path.into() }
    }

    /// Returns `true` if this error is a name collision of some kind.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::AlreadyExists { .. }
                | Error::SubfolderConflict { .. }
                | Error::HiddenFolderConflict { .. }
        )
    }

    /// Returns `true` if the path itself was rejected or missing.
    pub fn is_path_error(&self) -> bool {
        matches!(self, Error::InvalidPath { .. } | Error::PathNotFound { .. })
    }

    /// Returns `true` if retrying the same call later might succeed.
    ///
    /// - `ConcurrentSaveInProgress`: the save will finish
    /// - `Cancelled`: the operation can be restarted
    /// - `TransactionInProgress`: the open group will be closed
    /// - `Persist`: storage failures are often transient
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ConcurrentSaveInProgress
                | Error::Cancelled
                | Error::TransactionInProgress
                | Error::Persist(_)
        )
    }

    /// Returns the path associated with this error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::InvalidPath { path, .. } => Some(path.as_str()),
            Error::PathNotFound { path } => Some(path.as_str()),
            Error::AlreadyExists { path } => Some(path.as_str()),
            Error::SubfolderConflict { to, .. } => Some(to.as_str()),
            Error::HiddenFolderConflict { path } => Some(path.as_str()),
            _ => None,
        }
    }
}

/// A specialized Result type for editing operations.
pub type Result<T> = std::result::Result<T, Error>;
