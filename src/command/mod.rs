//! Reversible edits.
//!
//! Every structural change to an archive is a [`Command`]: it validates
//! against the current [`ArchiveState`], applies itself, and remembers
//! exactly what it needs to put the state back. Commands are collected by a
//! [`CommandStack`] which provides linear undo/redo and groups commands into
//! atomic transactions.
//!
//! | Command | Applies | Keeps for undo |
//! |---------|---------|----------------|
//! | [`AddEntries`] | inserts entries | displaced entries |
//! | [`DeleteEntries`] | removes files or whole folders | the removed entries |
//! | [`RenameEntry`] | re-keys one file | displaced entry, if overwriting |
//! | [`MoveEntries`] | re-keys every file under a folder | the moved paths and displaced entries |
//! | [`MergeFolders`] | moves a folder's files into another folder | its child commands |
//! | [`ReplaceEntry`] | swaps one payload | the previous payload |
//! | [`EncryptEntries`] | flips encryption and transforms payloads | previous payloads and flags |
//! | [`ChangeVersion`], [`ChangeHeader`] | header fields | previous values |
//! | [`GroupCommand`] | its children, in order | its children |

use std::any::Any;

use crate::observer::EditNotice;
use crate::state::ArchiveState;
use crate::Result;

mod add;
mod crypt;
mod delete;
mod group;
mod header;
mod moves;
mod observed;
mod rename;
mod replace;
mod stack;

pub use add::AddEntries;
pub use crypt::EncryptEntries;
pub use delete::DeleteEntries;
pub use group::{GroupCommand, Timing};
pub use header::{ChangeHeader, ChangeVersion};
pub use moves::{MergeFolders, MoveEntries};
pub use observed::Observed;
pub use rename::RenameEntry;
pub use replace::ReplaceEntry;
pub use stack::CommandStack;

/// A reversible unit of work on an [`ArchiveState`].
///
/// `execute` must validate everything before touching the state: it either
/// fails leaving the state unchanged, or succeeds completely. `undo` is only
/// ever called on a command whose last `execute` succeeded and restores the
/// state that `execute` saw. After `undo`, `execute` may be called again
/// (redo) and must capture its undo information afresh.
pub trait Command<P>: Send {
    /// Applies the command.
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()>;

    /// Reverts the last successful `execute`.
    fn undo(&mut self, state: &mut ArchiveState<P>);

    /// Human-readable description for undo/redo menus.
    fn description(&self) -> String;

    /// What the command touched, for observers.
    fn notice(&self) -> Option<EditNotice> {
        None
    }

    /// Absorbs `next`, an already executed command that immediately
    /// follows this one in history.
    ///
    /// Returns `true` if `next` was absorbed and should be dropped.
    fn combine(&mut self, next: &dyn Command<P>) -> bool {
        let _ = next;
        false
    }

    /// Returns true if the command has no net effect and can be dropped
    /// from history.
    fn can_delete(&self) -> bool {
        false
    }

    /// Upcast used by [`combine`](Self::combine) to inspect `next`.
    fn as_any(&self) -> &dyn Any;
}

impl<P: 'static> std::fmt::Debug for dyn Command<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("description", &self.description())
            .finish()
    }
}

/// Formats a count of files for descriptions.
pub(crate) fn files_label(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{} files", count)
    }
}
