//! Adding entries.

use std::any::Any;
use std::collections::{BTreeSet, HashSet};

use super::{Command, files_label};
use crate::observer::EditNotice;
use crate::state::ArchiveState;
use crate::{ArchivePath, Entry, Error, Result};

/// Inserts a batch of entries, overwriting any file already at the same path.
///
/// Each overwritten entry is captured and put back on undo.
pub struct AddEntries<P> {
    /// Entries waiting to be inserted (before execute, and after undo).
    pending: Vec<Entry<P>>,
    /// Paths inserted by the last execute.
    inserted: Vec<ArchivePath>,
    /// Entries displaced by the last execute.
    conflicts: Vec<Entry<P>>,
    sources: Vec<String>,
    new_folders: Vec<ArchivePath>,
}

impl<P> AddEntries<P> {
    /// Creates a command adding `entries`.
    pub fn new(entries: Vec<Entry<P>>) -> Self {
        Self {
            pending: entries,
            inserted: Vec::new(),
            conflicts: Vec::new(),
            sources: Vec::new(),
            new_folders: Vec::new(),
        }
    }

    /// Records the caller-side sources the entries were created from.
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Number of entries this command adds.
    pub fn len(&self) -> usize {
        self.pending.len().max(self.inserted.len())
    }

    /// Returns true if the command adds nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries displaced by the last execute.
    pub fn conflicts(&self) -> &[Entry<P>] {
        &self.conflicts
    }

    fn validate(&self, state: &ArchiveState<P>) -> Result<()> {
        let mut keys = HashSet::with_capacity(self.pending.len());
        for entry in &self.pending {
            if !keys.insert(entry.path.key()) {
                return Err(Error::already_exists(entry.path.as_str()));
            }
            state.table.check_file_slot(&entry.path)?;
        }
        // A file in the batch may not sit where another one needs a directory.
        for entry in &self.pending {
            if let Some(ancestor) = entry.path.ancestors().find(|a| keys.contains(a.key())) {
                return Err(Error::invalid_path(
                    entry.path.as_str(),
                    format!("'{}' is a file, not a directory", ancestor),
                ));
            }
        }
        Ok(())
    }
}

impl<P: Send + 'static> Command<P> for AddEntries<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        self.validate(state)?;

        let mut folders = BTreeSet::new();
        for entry in &self.pending {
            for ancestor in entry.path.ancestors() {
                if !state.table.contains_directory(&ancestor) {
                    folders.insert(ancestor);
                }
            }
        }
        self.new_folders = folders.into_iter().collect();

        self.inserted.clear();
        self.conflicts.clear();
        for mut entry in self.pending.drain(..) {
            let path = entry.path.clone();
            entry.flags.pending_add = true;
            entry.flags.conflict_origin = state.table.contains_file(&path);
            if let Some(previous) = state.table.insert(entry) {
                self.conflicts.push(previous);
            }
            self.inserted.push(path);
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        for path in self.inserted.iter().rev() {
            match state.table.remove(path) {
                Some(entry) => self.pending.push(entry),
                None => {
                    log::error!("undo add: '{}' is missing from the table", path);
                    debug_assert!(false, "added entry vanished: {}", path);
                }
            }
        }
        self.pending.reverse();
        for conflict in self.conflicts.drain(..) {
            state.table.insert(conflict);
        }
    }

    fn description(&self) -> String {
        if self.len() != 1 {
            return format!("Add {}", files_label(self.len()));
        }
        match self.pending.first().map(|e| &e.path).or(self.inserted.first()) {
            Some(path) => format!("Add '{}'", path),
            None => "Add nothing".to_string(),
        }
    }

    fn notice(&self) -> Option<EditNotice> {
        let paths = if self.inserted.is_empty() {
            self.pending.iter().map(|e| e.path.clone()).collect()
        } else {
            self.inserted.clone()
        };
        Some(EditNotice {
            sources: self.sources.clone(),
            paths,
            new_folders: self.new_folders.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
