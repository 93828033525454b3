//! Removing entries.

use std::any::Any;
use std::collections::BTreeSet;

use super::{Command, files_label};
use crate::observer::EditNotice;
use crate::state::ArchiveState;
use crate::{ArchivePath, Entry, Error, Result};

/// Removes files, or every file underneath whole folders.
///
/// Folder contents are resolved when the command executes, so a redo
/// removes exactly what is there at that moment. The removed entries
/// themselves are held by the command until undo puts them back; their
/// paths are kept past undo so the notice reports the same paths both ways.
pub struct DeleteEntries<P> {
    files: Vec<ArchivePath>,
    folders: Vec<ArchivePath>,
    missing_ok: bool,
    removed: Vec<Entry<P>>,
    removed_paths: Vec<ArchivePath>,
}

impl<P> DeleteEntries<P> {
    /// Creates a command removing the given files.
    pub fn files(paths: Vec<ArchivePath>) -> Self {
        Self {
            files: paths,
            folders: Vec::new(),
            missing_ok: false,
            removed: Vec::new(),
            removed_paths: Vec::new(),
        }
    }

    /// Creates a command removing everything underneath the given folders.
    pub fn folders(dirs: Vec<ArchivePath>) -> Self {
        Self {
            files: Vec::new(),
            folders: dirs,
            missing_ok: false,
            removed: Vec::new(),
            removed_paths: Vec::new(),
        }
    }

    /// Skips targets that do not exist instead of failing.
    pub fn missing_ok(mut self) -> Self {
        self.missing_ok = true;
        self
    }

    /// Entries removed by the last execute.
    pub fn removed(&self) -> &[Entry<P>] {
        &self.removed
    }

    fn resolve(&self, state: &ArchiveState<P>) -> Result<BTreeSet<ArchivePath>> {
        let mut targets = BTreeSet::new();
        for file in &self.files {
            if state.table.contains_file(file) {
                targets.insert(file.clone());
            } else if !self.missing_ok {
                return Err(Error::not_found(file.as_str()));
            }
        }
        for dir in &self.folders {
            let under = state.table.paths_under(dir);
            if under.is_empty() && !self.missing_ok {
                return Err(Error::not_found(dir.as_str()));
            }
            targets.extend(under);
        }
        Ok(targets)
    }
}

impl<P: Send + 'static> Command<P> for DeleteEntries<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        let targets = self.resolve(state)?;
        self.removed.clear();
        for path in &targets {
            if let Some(entry) = state.table.remove(path) {
                self.removed.push(entry);
            }
        }
        self.removed_paths = self.removed.iter().map(|e| e.path.clone()).collect();
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        for entry in self.removed.drain(..).rev() {
            if let Some(occupant) = state.table.insert(entry) {
                log::error!("undo delete: '{}' was occupied", occupant.path);
                debug_assert!(false, "deleted path reoccupied: {}", occupant.path);
            }
        }
    }

    fn description(&self) -> String {
        match (self.files.as_slice(), self.folders.as_slice()) {
            ([file], []) => format!("Delete '{}'", file),
            ([], [dir]) => format!("Delete folder '{}'", dir),
            ([], dirs) => format!("Delete {} folders", dirs.len()),
            (files, []) => format!("Delete {}", files_label(files.len())),
            (files, dirs) => format!(
                "Delete {} and {} folders",
                files_label(files.len()),
                dirs.len()
            ),
        }
    }

    fn notice(&self) -> Option<EditNotice> {
        let paths = if self.removed_paths.is_empty() {
            self.files.iter().chain(&self.folders).cloned().collect()
        } else {
            self.removed_paths.clone()
        };
        Some(EditNotice::for_paths(paths))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
