//! The path-keyed entry table.
//!
//! Directories are never stored. A path names a directory exactly when some
//! entry lies underneath it, so removing the last file of a directory makes
//! the directory disappear and an empty directory cannot exist.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use crate::{ArchivePath, Entry, Error, Result};

/// Unique, case-insensitively keyed mapping of every live entry.
#[derive(Debug, Clone)]
pub struct EntryTable<P> {
    entries: BTreeMap<String, Entry<P>>,
    hidden: BTreeSet<String>,
}

impl<P> Default for EntryTable<P> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            hidden: BTreeSet::new(),
        }
    }
}

impl<P> EntryTable<P> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of file entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `entry` under its own path.
    ///
    /// Returns the entry previously stored at that key. Overwriting is not an
    /// error; the caller keeps the displaced entry if it needs to restore it.
    pub fn insert(&mut self, entry: Entry<P>) -> Option<Entry<P>> {
        log::trace!("insert {}", entry.path);
        self.entries.insert(entry.path.key().to_string(), entry)
    }

    /// Removes and returns the entry at `path`.
    pub fn remove(&mut self, path: &ArchivePath) -> Option<Entry<P>> {
        log::trace!("remove {}", path);
        self.entries.remove(path.key())
    }

    /// Re-keys the entry at `old` to `new` in one step.
    ///
    /// Returns the entry displaced at `new`, if any. A case-only rename keeps
    /// the same key and never displaces anything.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPath`] if `new` lies underneath `old`
    /// - [`Error::PathNotFound`] if no entry exists at `old`
    pub fn rename(&mut self, old: &ArchivePath, new: &ArchivePath) -> Result<Option<Entry<P>>> {
        if new.is_within(old) {
            return Err(Error::invalid_path(
                new.as_str(),
                format!("'{}' cannot be nested inside itself", old),
            ));
        }
        let mut entry = self
            .entries
            .remove(old.key())
            .ok_or_else(|| Error::not_found(old.as_str()))?;
        log::trace!("rename {} -> {}", old, new);
        entry.path = new.clone();
        Ok(self.entries.insert(new.key().to_string(), entry))
    }

    /// Returns the entry at `path`.
    pub fn get(&self, path: &ArchivePath) -> Option<&Entry<P>> {
        self.entries.get(path.key())
    }

    /// Returns the entry at `path` mutably.
    pub fn get_mut(&mut self, path: &ArchivePath) -> Option<&mut Entry<P>> {
        self.entries.get_mut(path.key())
    }

    /// Returns true if a file entry exists at `path`.
    pub fn contains_file(&self, path: &ArchivePath) -> bool {
        self.entries.contains_key(path.key())
    }

    /// Returns true if some entry lies underneath `path`.
    pub fn contains_directory(&self, path: &ArchivePath) -> bool {
        let prefix = format!("{}/", path.key());
        self.entries
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }

    /// Returns true if `path` is either a file or a directory.
    pub fn exists(&self, path: &ArchivePath) -> bool {
        self.contains_file(path) || self.contains_directory(path)
    }

    /// Returns the entries underneath `dir` (`None` is the archive root).
    ///
    /// With `recursive == false` only direct children are returned.
    pub fn files_under(&self, dir: Option<&ArchivePath>, recursive: bool) -> Vec<&Entry<P>> {
        let depth = dir.map_or(0, |d| d.depth());
        let in_scope = |entry: &&Entry<P>| recursive || entry.path.depth() == depth + 1;
        match dir {
            None => self.entries.values().filter(in_scope).collect(),
            Some(dir) => {
                let prefix = format!("{}/", dir.key());
                self.entries
                    .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
                    .take_while(|(key, _)| key.starts_with(&prefix))
                    .map(|(_, entry)| entry)
                    .filter(in_scope)
                    .collect()
            }
        }
    }

    /// Returns the paths of every entry underneath `dir`, recursively.
    pub fn paths_under(&self, dir: &ArchivePath) -> Vec<ArchivePath> {
        self.files_under(Some(dir), true)
            .into_iter()
            .map(|e| e.path.clone())
            .collect()
    }

    /// Returns the immediate subdirectories of `dir` (`None` is the root).
    pub fn directories_under(&self, dir: Option<&ArchivePath>) -> Vec<ArchivePath> {
        let depth = dir.map_or(0, |d| d.depth());
        let mut found = BTreeSet::new();
        for entry in self.files_under(dir, true) {
            if entry.path.depth() > depth + 1 {
                if let Some(sub) = entry
                    .path
                    .ancestors()
                    .find(|a| a.depth() == depth + 1)
                {
                    found.insert(sub);
                }
            }
        }
        found.into_iter().collect()
    }

    /// Checks that a file may be stored at `path` without breaking the
    /// file/directory distinction.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPath`] if `path` is a directory or one of its
    /// ancestors is a file.
    pub fn check_file_slot(&self, path: &ArchivePath) -> Result<()> {
        self.check_file_slot_ignoring(path, |_| false)
    }

    /// Like [`check_file_slot`](Self::check_file_slot), but entries whose
    /// key satisfies `vacated` are treated as already gone.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPath`] if a remaining entry lies underneath `path` or
    /// sits on one of its ancestors.
    pub fn check_file_slot_ignoring<F>(&self, path: &ArchivePath, vacated: F) -> Result<()>
    where
        F: Fn(&str) -> bool,
    {
        let prefix = format!("{}/", path.key());
        let occupied = self
            .entries
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&prefix))
            .any(|(key, _)| !vacated(key));
        if occupied {
            return Err(Error::invalid_path(
                path.as_str(),
                "a directory with this name already exists",
            ));
        }
        if let Some(ancestor) = path
            .ancestors()
            .find(|a| self.contains_file(a) && !vacated(a.key()))
        {
            return Err(Error::invalid_path(
                path.as_str(),
                format!("'{}' is a file, not a directory", ancestor),
            ));
        }
        Ok(())
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<P>> {
        self.entries.values()
    }

    /// Returns every entry path in key order.
    pub fn paths(&self) -> Vec<ArchivePath> {
        self.entries.values().map(|e| e.path.clone()).collect()
    }

    /// Returns true if any entry is encrypted.
    pub fn any_encrypted(&self) -> bool {
        self.entries.values().any(|e| e.flags.encrypted)
    }

    /// Reserves `dir` as a hidden folder name.
    pub fn hide(&mut self, dir: &ArchivePath) -> bool {
        self.hidden.insert(dir.key().to_string())
    }

    /// Releases a hidden folder reservation.
    pub fn unhide(&mut self, dir: &ArchivePath) -> bool {
        self.hidden.remove(dir.key())
    }

    /// Returns true if `dir` is reserved as hidden.
    pub fn is_hidden(&self, dir: &ArchivePath) -> bool {
        self.hidden.contains(dir.key())
    }
}
