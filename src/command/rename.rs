//! Renaming a single file.

use std::any::Any;

use super::Command;
use crate::observer::EditNotice;
use crate::state::ArchiveState;
use crate::{ArchivePath, Entry, Error, Result};

/// Re-keys one file entry.
///
/// By default an occupied destination is refused with
/// [`Error::AlreadyExists`]. With [`overwrite`](Self::overwrite) the occupant
/// is captured instead and restored on undo; folder merges rely on this.
pub struct RenameEntry<P> {
    from: ArchivePath,
    to: ArchivePath,
    overwrite: bool,
    conflict: Option<Entry<P>>,
}

impl<P> RenameEntry<P> {
    /// Creates a command renaming `from` to `to`.
    pub fn new(from: ArchivePath, to: ArchivePath) -> Self {
        Self {
            from,
            to,
            overwrite: false,
            conflict: None,
        }
    }

    /// Allows replacing a file already at the destination.
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Source path.
    pub fn from(&self) -> &ArchivePath {
        &self.from
    }

    /// Destination path.
    pub fn to(&self) -> &ArchivePath {
        &self.to
    }

    /// The entry displaced by the last execute, if any.
    pub fn conflict(&self) -> Option<&Entry<P>> {
        self.conflict.as_ref()
    }

    fn validate(&self, state: &ArchiveState<P>) -> Result<()> {
        let table = &state.table;
        if !table.contains_file(&self.from) {
            return Err(Error::not_found(self.from.as_str()));
        }
        if self.from.key() == self.to.key() {
            return Ok(());
        }
        table.check_file_slot(&self.to)?;
        if table.contains_file(&self.to) && !self.overwrite {
            return Err(Error::already_exists(self.to.as_str()));
        }
        Ok(())
    }
}

impl<P: Send + 'static> Command<P> for RenameEntry<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        self.validate(state)?;
        self.conflict = state.table.rename(&self.from, &self.to)?;
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        if let Err(e) = state.table.rename(&self.to, &self.from) {
            log::error!("undo rename '{}' -> '{}': {}", self.from, self.to, e);
            debug_assert!(false, "rename undo failed: {}", e);
            return;
        }
        if let Some(conflict) = self.conflict.take() {
            state.table.insert(conflict);
        }
    }

    fn description(&self) -> String {
        format!("Rename '{}' to '{}'", self.from, self.to)
    }

    fn notice(&self) -> Option<EditNotice> {
        Some(EditNotice::for_paths(vec![
            self.from.clone(),
            self.to.clone(),
        ]))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::test_util::*;

    #[test]
    fn test_rename_round_trip() {
        let mut state = state(&[("a.txt", "1"), ("b.txt", "2")]);
        let before = snapshot(&state);

        let mut cmd = RenameEntry::new(p("a.txt"), p("dir/c.txt"));
        cmd.execute(&mut state).unwrap();
        assert!(state.table.contains_file(&p("dir/c.txt")));
        assert!(!state.table.contains_file(&p("a.txt")));

        cmd.undo(&mut state);
        assert_identical(&before, &snapshot(&state));
    }

    #[test]
    fn test_rename_onto_file_rejected() {
        let mut state = state(&[("a.txt", "1"), ("b.txt", "2")]);
        let mut cmd = RenameEntry::new(p("a.txt"), p("B.txt"));
        assert!(matches!(
            cmd.execute(&mut state).unwrap_err(),
            Error::AlreadyExists { .. }
        ));
        assert_eq!(state.table.len(), 2);
    }

    #[test]
    fn test_rename_onto_directory_rejected() {
        let mut state = state(&[("a.txt", "1"), ("dir/x", "2")]);
        let mut cmd = RenameEntry::new(p("a.txt"), p("dir"));
        assert!(matches!(
            cmd.execute(&mut state).unwrap_err(),
            Error::InvalidPath { .. }
        ));
    }

    #[test]
    fn test_rename_into_itself_rejected() {
        let mut state = state(&[("a", "1")]);
        let mut cmd = RenameEntry::new(p("a"), p("a/b"));
        assert!(matches!(
            cmd.execute(&mut state).unwrap_err(),
            Error::InvalidPath { .. }
        ));
        assert!(state.table.contains_file(&p("a")));
    }

    #[test]
    fn test_rename_missing() {
        let mut state = state(&[]);
        let mut cmd: RenameEntry<Payload> = RenameEntry::new(p("a"), p("b"));
        assert!(matches!(
            cmd.execute(&mut state).unwrap_err(),
            Error::PathNotFound { .. }
        ));
    }

    #[test]
    fn test_overwrite_captures_conflict() {
        let mut state = state(&[("a.txt", "1"), ("b.txt", "2")]);
        let before = snapshot(&state);

        let mut cmd = RenameEntry::new(p("a.txt"), p("b.txt")).overwrite();
        cmd.execute(&mut state).unwrap();
        assert_eq!(state.table.len(), 1);
        assert_eq!(cmd.conflict().unwrap().payload.as_str(), "2");

        cmd.undo(&mut state);
        assert!(cmd.conflict().is_none());
        assert_identical(&before, &snapshot(&state));

        cmd.execute(&mut state).unwrap();
        assert_eq!(cmd.conflict().unwrap().payload.as_str(), "2");
    }

    #[test]
    fn test_case_only_rename() {
        let mut state = state(&[("readme.txt", "1")]);
        let before = snapshot(&state);

        let mut cmd = RenameEntry::new(p("readme.txt"), p("README.txt"));
        cmd.execute(&mut state).unwrap();
        assert_eq!(state.table.paths()[0].as_str(), "README.txt");
        assert!(cmd.conflict().is_none());

        cmd.undo(&mut state);
        assert_identical(&before, &snapshot(&state));
    }
}
