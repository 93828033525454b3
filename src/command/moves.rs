//! Moving and merging folders.

use std::any::Any;
use std::collections::HashSet;

use super::{Command, DeleteEntries, GroupCommand, Timing};
use crate::observer::EditNotice;
use crate::state::ArchiveState;
use crate::{ArchivePath, Entry, Error, Result};

/// Re-keys every file underneath a folder so it lives underneath another
/// folder instead (`None` is the archive root).
///
/// The move is applied as a whole: every source is taken out of the table
/// before any target is put in, so a target may land on a slot another
/// source is leaving. Targets are checked against the table without the
/// sources. Undo takes the targets out, puts back the displaced entries and
/// then the sources.
pub struct MoveEntries<P> {
    from_dir: ArchivePath,
    to_dir: Option<ArchivePath>,
    overwrite: bool,
    moves: Vec<(ArchivePath, ArchivePath)>,
    conflicts: Vec<Entry<P>>,
}

impl<P: Send + 'static> MoveEntries<P> {
    /// Creates a command moving the contents of `from_dir` to `to_dir`.
    pub fn new(from_dir: ArchivePath, to_dir: Option<ArchivePath>) -> Self {
        Self {
            from_dir,
            to_dir,
            overwrite: false,
            moves: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    /// Allows moving into an existing folder, replacing colliding files.
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Source folder.
    pub fn from_dir(&self) -> &ArchivePath {
        &self.from_dir
    }

    /// Destination folder, `None` for the archive root.
    pub fn to_dir(&self) -> Option<&ArchivePath> {
        self.to_dir.as_ref()
    }

    /// The `(from, to)` pairs of the last execute, in key order of `from`.
    pub fn moves(&self) -> &[(ArchivePath, ArchivePath)] {
        &self.moves
    }

    fn validate(&self, state: &ArchiveState<P>) -> Result<()> {
        let table = &state.table;
        if !table.contains_directory(&self.from_dir) {
            return Err(Error::not_found(self.from_dir.as_str()));
        }
        let Some(to) = &self.to_dir else {
            return Ok(());
        };
        if to.is_within(&self.from_dir) {
            return Err(Error::SubfolderConflict {
                from: self.from_dir.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        if table.is_hidden(to) {
            return Err(Error::HiddenFolderConflict {
                path: to.as_str().to_string(),
            });
        }
        if let Some(file) = std::iter::once(to.clone())
            .chain(to.ancestors())
            .find(|p| table.contains_file(p))
        {
            return Err(Error::invalid_path(
                to.as_str(),
                format!("'{}' is a file, not a directory", file),
            ));
        }
        if !self.overwrite && to.key() != self.from_dir.key() && table.contains_directory(to) {
            return Err(Error::already_exists(to.as_str()));
        }
        Ok(())
    }

    /// Resolves every source to its target and checks each target against
    /// the table as it will look once the sources are gone.
    fn plan(&self, state: &ArchiveState<P>) -> Result<Vec<(ArchivePath, ArchivePath)>> {
        let table = &state.table;
        let moves: Vec<_> = table
            .paths_under(&self.from_dir)
            .into_iter()
            .filter_map(|source| {
                let target = source.rebase(&self.from_dir, self.to_dir.as_ref())?;
                Some((source, target))
            })
            .collect();
        {
            let vacated: HashSet<&str> = moves.iter().map(|(source, _)| source.key()).collect();
            for (_, target) in &moves {
                table.check_file_slot_ignoring(target, |key| vacated.contains(key))?;
                let occupied = !vacated.contains(target.key()) && table.contains_file(target);
                if occupied && !self.overwrite {
                    return Err(Error::already_exists(target.as_str()));
                }
            }
        }
        Ok(moves)
    }
}

impl<P: Send + 'static> Command<P> for MoveEntries<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        self.validate(state)?;
        let moves = self.plan(state)?;

        let mut moved = Vec::with_capacity(moves.len());
        for (from, to) in &moves {
            if let Some(entry) = state.table.remove(from) {
                moved.push((entry, to));
            }
        }
        self.conflicts.clear();
        for (mut entry, to) in moved {
            entry.path = to.clone();
            if let Some(displaced) = state.table.insert(entry) {
                log::debug!("move '{}' replaced '{}'", self.from_dir, displaced.path);
                self.conflicts.push(displaced);
            }
        }
        self.moves = moves;
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        let mut restored = Vec::with_capacity(self.moves.len());
        for (from, to) in &self.moves {
            if let Some(mut entry) = state.table.remove(to) {
                entry.path = from.clone();
                restored.push(entry);
            }
        }
        for conflict in self.conflicts.drain(..) {
            state.table.insert(conflict);
        }
        for entry in restored {
            state.table.insert(entry);
        }
    }

    fn description(&self) -> String {
        match &self.to_dir {
            Some(to) => format!("Move '{}' to '{}'", self.from_dir, to),
            None => format!("Move '{}' to the root", self.from_dir),
        }
    }

    fn notice(&self) -> Option<EditNotice> {
        let mut paths = Vec::with_capacity(self.moves.len() * 2);
        for (from, to) in &self.moves {
            paths.push(from.clone());
            paths.push(to.clone());
        }
        Some(EditNotice::for_paths(paths))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Moves a folder's files into another folder, replacing colliding files,
/// then drops whatever is left of the source folder.
///
/// Runs as one [`GroupCommand`] of a [`MoveEntries`] and a
/// [`DeleteEntries`]. When the destination contains the source, files moved
/// into the destination may come to rest under the source again, so the
/// delete step is left out.
pub struct MergeFolders<P> {
    from_dir: ArchivePath,
    to_dir: Option<ArchivePath>,
    group: GroupCommand<P>,
}

impl<P: Send + 'static> MergeFolders<P> {
    /// Creates a command merging `from_dir` into `to_dir`
    /// (`None` is the archive root).
    pub fn new(from_dir: ArchivePath, to_dir: Option<ArchivePath>) -> Self {
        let mut group = GroupCommand::new(Timing::Deferred);
        group.push(Box::new(
            MoveEntries::new(from_dir.clone(), to_dir.clone()).overwrite(),
        ));
        let contains_source = to_dir
            .as_ref()
            .is_none_or(|to| from_dir.is_within(to));
        if !contains_source {
            group.push(Box::new(
                DeleteEntries::folders(vec![from_dir.clone()]).missing_ok(),
            ));
        }
        Self {
            from_dir,
            to_dir,
            group,
        }
    }
}

impl<P: Send + 'static> Command<P> for MergeFolders<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        self.group.execute(state)
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        self.group.undo(state)
    }

    fn description(&self) -> String {
        match &self.to_dir {
            Some(to) => format!("Merge '{}' into '{}'", self.from_dir, to),
            None => format!("Merge '{}' into the root", self.from_dir),
        }
    }

    fn notice(&self) -> Option<EditNotice> {
        self.group.notice()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
