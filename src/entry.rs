//! Archive entries.

use crate::ArchivePath;

/// Flag bits stored with an entry.
///
/// Moving an entry or undoing an edit keeps its flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EntryFlags {
    /// The payload is stored encrypted.
    pub encrypted: bool,
    /// The entry was added since the last save. Set by every add; the
    /// persister clears it once the entry is written.
    pub pending_add: bool,
    /// The entry is scheduled for removal on the next save. Owned by the
    /// caller: edits carry it along unchanged.
    pub pending_delete: bool,
    /// The entry was restored from a captured conflict.
    pub conflict_origin: bool,
}

/// A single archive entry: an opaque payload keyed by its path.
///
/// The core never looks inside `payload`. It moves entries between the
/// table and command-private storage, so undo puts back the very value
/// that was taken out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<P> {
    /// The entry's path, which is also its table key.
    pub path: ArchivePath,
    /// Caller-supplied payload.
    pub payload: P,
    /// Flag bits.
    pub flags: EntryFlags,
}

impl<P> Entry<P> {
    /// Creates an entry with default flags.
    pub fn new(path: ArchivePath, payload: P) -> Self {
        Self {
            path,
            payload,
            flags: EntryFlags::default(),
        }
    }

    /// Sets the flags.
    pub fn with_flags(mut self, flags: EntryFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns the entry path as a string slice.
    pub fn name(&self) -> &str {
        self.path.as_str()
    }

    /// Returns whether the payload is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.flags.encrypted
    }
}
