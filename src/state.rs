//! The mutable state that commands operate on.

use crate::header::HeaderMetadata;
use crate::table::EntryTable;

/// An archive's entry table together with its header metadata.
///
/// This is the only thing a [`Command`](crate::command::Command) may touch.
#[derive(Debug, Clone)]
pub struct ArchiveState<P> {
    /// Every live entry.
    pub table: EntryTable<P>,
    /// Header fields.
    pub header: HeaderMetadata,
}

impl<P> Default for ArchiveState<P> {
    fn default() -> Self {
        Self::new(HeaderMetadata::default())
    }
}

impl<P> ArchiveState<P> {
    /// Creates a state with an empty table.
    pub fn new(header: HeaderMetadata) -> Self {
        Self {
            table: EntryTable::new(),
            header,
        }
    }

    /// Recomputes the container-level encryption flag from the entries.
    pub fn refresh_encrypted(&mut self) {
        self.header.encrypted = self.table.any_encrypted();
    }
}
