//! Replacing a file's payload.

use std::any::Any;

use super::Command;
use crate::observer::EditNotice;
use crate::state::ArchiveState;
use crate::{ArchivePath, Error, Result};

/// Swaps the payload of an existing file, keeping its path and flags.
///
/// The command holds whichever payload is not currently in the table: the
/// replacement before execute, the previous payload after it.
pub struct ReplaceEntry<P> {
    path: ArchivePath,
    payload: P,
}

impl<P> ReplaceEntry<P> {
    /// Creates a command replacing the payload at `path`.
    pub fn new(path: ArchivePath, payload: P) -> Self {
        Self { path, payload }
    }

    /// Target path.
    pub fn path(&self) -> &ArchivePath {
        &self.path
    }

    fn swap(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        let entry = state
            .table
            .get_mut(&self.path)
            .ok_or_else(|| Error::not_found(self.path.as_str()))?;
        std::mem::swap(&mut entry.payload, &mut self.payload);
        Ok(())
    }
}

impl<P: Send + 'static> Command<P> for ReplaceEntry<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        self.swap(state)
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        if let Err(e) = self.swap(state) {
            log::error!("undo replace: {}", e);
            debug_assert!(false, "replaced entry vanished: {}", self.path);
        }
    }

    fn description(&self) -> String {
        format!("Replace '{}'", self.path)
    }

    fn notice(&self) -> Option<EditNotice> {
        Some(EditNotice::for_paths(vec![self.path.clone()]))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
