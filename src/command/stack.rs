//! Linear undo/redo history with transaction grouping.

use super::{Command, GroupCommand, Timing};
use crate::options::DEFAULT_HISTORY_LIMIT;
use crate::state::ArchiveState;
use crate::{Error, Result};

/// History of executed top-level commands.
///
/// The stack is either idle or collecting a transaction. While idle each
/// command is executed and pushed on its own. Between [`begin`](Self::begin)
/// and [`end`](Self::end) commands go into one [`GroupCommand`] which becomes
/// a single history slot when the transaction ends.
///
/// Pushing after an undo discards everything that could have been redone.
pub struct CommandStack<P> {
    history: Vec<Box<dyn Command<P>>>,
    /// Number of history slots currently applied.
    cursor: usize,
    group: Option<GroupCommand<P>>,
    limit: Option<usize>,
    combine: bool,
    /// Cursor position matching the last saved state, if still reachable.
    saved_at: Option<usize>,
}

impl<P: Send + 'static> Default for CommandStack<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Send + 'static> CommandStack<P> {
    /// Creates an empty stack with the default history limit.
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            cursor: 0,
            group: None,
            limit: Some(DEFAULT_HISTORY_LIMIT),
            combine: true,
            saved_at: Some(0),
        }
    }

    /// Sets the maximum number of history slots (`None` is unlimited).
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.map(|l| l.max(1));
        self
    }

    /// Enables or disables merging of combinable commands.
    pub fn with_combining(mut self, enabled: bool) -> Self {
        self.combine = enabled;
        self
    }

    /// Opens a transaction.
    ///
    /// # Errors
    ///
    /// [`Error::NestedTransaction`] if one is already open.
    pub fn begin(&mut self, timing: Timing) -> Result<()> {
        if self.group.is_some() {
            return Err(Error::NestedTransaction);
        }
        log::debug!("begin transaction ({:?})", timing);
        self.group = Some(GroupCommand::new(timing));
        Ok(())
    }

    /// Returns true while a transaction is open.
    pub fn is_grouping(&self) -> bool {
        self.group.is_some()
    }

    /// Timing of the open transaction, if any.
    pub fn timing(&self) -> Option<Timing> {
        self.group.as_ref().map(|g| g.timing())
    }

    /// Runs `command` according to the current mode.
    ///
    /// Idle: executes and pushes it. Deferred transaction: queues it without
    /// executing. Immediate transaction: executes it and adds it to the
    /// group. A command whose execute fails is dropped and leaves no trace.
    pub fn store_and_execute(
        &mut self,
        mut command: Box<dyn Command<P>>,
        state: &mut ArchiveState<P>,
    ) -> Result<()> {
        match &mut self.group {
            None => {
                command.execute(state)?;
                log::debug!("execute: {}", command.description());
                self.push(command);
            }
            Some(group) if group.timing() == Timing::Deferred => {
                log::trace!("queue: {}", command.description());
                group.push(command);
            }
            Some(group) => {
                command.execute(state)?;
                log::debug!("execute in transaction: {}", command.description());
                group.push(command);
            }
        }
        Ok(())
    }

    /// Closes the open transaction.
    ///
    /// A deferred group runs now; if one of its commands fails, the ones
    /// before it are undone and the error is returned. Returns `Ok(false)`
    /// if the transaction was empty and nothing was recorded.
    ///
    /// # Errors
    ///
    /// [`Error::NoTransaction`] if none is open, or the first error raised by
    /// a deferred command.
    pub fn end(&mut self, state: &mut ArchiveState<P>) -> Result<bool> {
        let mut group = self.group.take().ok_or(Error::NoTransaction)?;
        if group.is_empty() {
            log::debug!("end empty transaction");
            return Ok(false);
        }
        group.execute(state)?;
        log::debug!("end transaction: {} commands", group.len());
        self.push(Box::new(group));
        Ok(true)
    }

    /// Abandons the open transaction, undoing whatever it already executed.
    ///
    /// # Errors
    ///
    /// [`Error::NoTransaction`] if none is open.
    pub fn cancel(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        let mut group = self.group.take().ok_or(Error::NoTransaction)?;
        log::warn!("cancelling transaction with {} commands", group.len());
        if group.timing() == Timing::Immediate {
            group.undo(state);
        }
        Ok(())
    }

    /// Undoes the most recent history slot. Returns `Ok(false)` if there is
    /// nothing to undo.
    ///
    /// # Errors
    ///
    /// [`Error::TransactionInProgress`] while a transaction is open.
    pub fn undo(&mut self, state: &mut ArchiveState<P>) -> Result<bool> {
        self.ensure_idle()?;
        if self.cursor == 0 {
            return Ok(false);
        }
        self.cursor -= 1;
        let command = &mut self.history[self.cursor];
        command.undo(state);
        log::debug!("undo: {}", command.description());
        Ok(true)
    }

    /// Re-executes the next history slot. Returns `Ok(false)` if there is
    /// nothing to redo.
    ///
    /// A command that fails to re-execute means the history no longer fits
    /// the state. The failing slot and everything after it are discarded.
    ///
    /// # Errors
    ///
    /// [`Error::TransactionInProgress`] while a transaction is open, or the
    /// error raised by the command.
    pub fn redo(&mut self, state: &mut ArchiveState<P>) -> Result<bool> {
        self.ensure_idle()?;
        let Some(command) = self.history.get_mut(self.cursor) else {
            return Ok(false);
        };
        match command.execute(state) {
            Ok(()) => {
                log::debug!("redo: {}", command.description());
                self.cursor += 1;
                Ok(true)
            }
            Err(e) => {
                log::error!("redo of '{}' failed: {}", command.description(), e);
                self.truncate_redo();
                Err(e)
            }
        }
    }

    /// Drops all history. The current state becomes the clean point.
    ///
    /// # Errors
    ///
    /// [`Error::TransactionInProgress`] while a transaction is open.
    pub fn clear(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.saved_at = Some(0);
        self.history.clear();
        self.cursor = 0;
        Ok(())
    }

    /// Returns true if there is a slot to undo.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there is a slot to redo.
    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// Description of the slot [`undo`](Self::undo) would revert.
    pub fn undo_description(&self) -> Option<String> {
        self.cursor
            .checked_sub(1)
            .map(|i| self.history[i].description())
    }

    /// Description of the slot [`redo`](Self::redo) would apply.
    pub fn redo_description(&self) -> Option<String> {
        self.history.get(self.cursor).map(|c| c.description())
    }

    /// Number of history slots, undone ones included.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if there is no history.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Returns true if the state differs from the last saved one.
    pub fn is_dirty(&self) -> bool {
        let immediate_changes = self
            .group
            .as_ref()
            .is_some_and(|g| g.timing() == Timing::Immediate && !g.is_empty());
        self.saved_at != Some(self.cursor) || immediate_changes
    }

    /// Records the current position as saved.
    pub fn mark_saved(&mut self) {
        self.saved_at = Some(self.cursor);
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.group.is_some() {
            return Err(Error::TransactionInProgress);
        }
        Ok(())
    }

    fn truncate_redo(&mut self) {
        self.history.truncate(self.cursor);
        if self.saved_at.is_some_and(|s| s > self.cursor) {
            self.saved_at = None;
        }
    }

    fn push(&mut self, command: Box<dyn Command<P>>) {
        self.truncate_redo();

        if self.combine && self.saved_at != Some(self.cursor) {
            if let Some(top) = self.history.last_mut() {
                if top.combine(command.as_ref()) {
                    log::trace!("combined into: {}", top.description());
                    if top.can_delete() {
                        self.history.pop();
                        self.cursor -= 1;
                    }
                    return;
                }
            }
        }

        self.history.push(command);
        self.cursor += 1;
        self.trim();
    }

    fn trim(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        if self.history.len() <= limit {
            return;
        }
        let excess = self.history.len() - limit;
        log::debug!("history limit {} reached, dropping {} oldest", limit, excess);
        self.history.drain(..excess);
        self.cursor -= excess;
        self.saved_at = self.saved_at.and_then(|s| s.checked_sub(excess));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::test_util::*;
    use crate::command::{AddEntries, ChangeVersion, DeleteEntries, RenameEntry};
    use crate::header::FormatVersion;

    fn add(path: &str, content: &str) -> Box<dyn Command<Payload>> {
        Box::new(AddEntries::new(vec![entry(path, content)]))
    }

    fn version(major: u16, minor: u16) -> Box<dyn Command<Payload>> {
        Box::new(ChangeVersion::new(FormatVersion::new(major, minor)))
    }

    #[test]
    fn test_undo_redo() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new();

        stack.store_and_execute(add("a", "1"), &mut state).unwrap();
        stack.store_and_execute(add("b", "2"), &mut state).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.undo_description().as_deref(), Some("Add 'b'"));

        assert!(stack.undo(&mut state).unwrap());
        assert_eq!(state.table.paths(), vec![p("a")]);
        assert!(stack.can_redo());

        assert!(stack.redo(&mut state).unwrap());
        assert_eq!(state.table.len(), 2);
        assert!(!stack.redo(&mut state).unwrap());

        assert!(stack.undo(&mut state).unwrap());
        assert!(stack.undo(&mut state).unwrap());
        assert!(!stack.undo(&mut state).unwrap());
        assert!(state.table.is_empty());
    }

    #[test]
    fn test_push_after_undo_truncates_redo() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new();
        stack.store_and_execute(add("a", "1"), &mut state).unwrap();
        stack.store_and_execute(add("b", "2"), &mut state).unwrap();
        stack.undo(&mut state).unwrap();

        stack.store_and_execute(add("c", "3"), &mut state).unwrap();
        assert!(!stack.can_redo());
        assert!(!stack.redo(&mut state).unwrap());
        assert_eq!(state.table.paths(), vec![p("a"), p("c")]);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_failed_command_not_recorded() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new();
        let result = stack.store_and_execute(
            Box::new(DeleteEntries::files(vec![p("missing")])),
            &mut state,
        );
        assert!(result.is_err());
        assert!(stack.is_empty());
        assert!(!stack.is_dirty());
    }

    #[test]
    fn test_deferred_transaction() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new();
        stack.begin(Timing::Deferred).unwrap();
        stack.store_and_execute(add("a", "1"), &mut state).unwrap();
        stack
            .store_and_execute(Box::new(RenameEntry::new(p("a"), p("b"))), &mut state)
            .unwrap();
        assert!(state.table.is_empty());

        assert!(stack.end(&mut state).unwrap());
        assert_eq!(state.table.paths(), vec![p("b")]);
        assert_eq!(stack.len(), 1);

        stack.undo(&mut state).unwrap();
        assert!(state.table.is_empty());
    }

    #[test]
    fn test_deferred_failure_rolls_back() {
        let mut state = state(&[("keep", "0")]);
        let before = snapshot(&state);
        let mut stack = CommandStack::new();
        stack.begin(Timing::Deferred).unwrap();
        stack.store_and_execute(add("a", "1"), &mut state).unwrap();
        stack
            .store_and_execute(Box::new(DeleteEntries::files(vec![p("nope")])), &mut state)
            .unwrap();

        assert!(matches!(
            stack.end(&mut state).unwrap_err(),
            Error::PathNotFound { .. }
        ));
        assert_identical(&before, &snapshot(&state));
        assert!(stack.is_empty());
        assert!(!stack.is_grouping());
    }

    #[test]
    fn test_immediate_transaction_and_cancel() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new();

        stack.begin(Timing::Immediate).unwrap();
        stack.store_and_execute(add("a", "1"), &mut state).unwrap();
        assert_eq!(state.table.len(), 1);
        assert!(stack.is_dirty());
        stack.cancel(&mut state).unwrap();
        assert!(state.table.is_empty());
        assert!(stack.is_empty());

        stack.begin(Timing::Immediate).unwrap();
        stack.store_and_execute(add("a", "1"), &mut state).unwrap();
        stack.store_and_execute(add("b", "2"), &mut state).unwrap();
        assert!(stack.end(&mut state).unwrap());
        assert_eq!(state.table.len(), 2);

        stack.undo(&mut state).unwrap();
        assert!(state.table.is_empty());
        stack.redo(&mut state).unwrap();
        assert_eq!(state.table.len(), 2);
    }

    #[test]
    fn test_transaction_state_errors() {
        let mut state: crate::state::ArchiveState<Payload> = state(&[]);
        let mut stack = CommandStack::new();
        assert!(matches!(stack.end(&mut state), Err(Error::NoTransaction)));
        assert!(matches!(stack.cancel(&mut state), Err(Error::NoTransaction)));

        stack.begin(Timing::Deferred).unwrap();
        assert!(matches!(
            stack.begin(Timing::Immediate),
            Err(Error::NestedTransaction)
        ));
        assert!(matches!(
            stack.undo(&mut state),
            Err(Error::TransactionInProgress)
        ));
        assert!(!stack.end(&mut state).unwrap());
        assert!(stack.is_empty());
    }

    #[test]
    fn test_history_limit() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new().with_limit(Some(2));
        for name in ["a", "b", "c"] {
            stack.store_and_execute(add(name, ""), &mut state).unwrap();
        }
        assert_eq!(stack.len(), 2);
        while stack.undo(&mut state).unwrap() {}
        assert_eq!(state.table.paths(), vec![p("a")]);
    }

    #[test]
    fn test_combining() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new();
        stack.mark_saved();
        stack.store_and_execute(add("x", ""), &mut state).unwrap();
        for minor in 1..=3 {
            stack.store_and_execute(version(1, minor), &mut state).unwrap();
        }
        assert_eq!(stack.len(), 2);
        assert_eq!(state.header.version, FormatVersion::new(1, 3));

        stack
            .store_and_execute(
                Box::new(ChangeVersion::new(FormatVersion::default())),
                &mut state,
            )
            .unwrap();
        assert_eq!(stack.len(), 1);

        let mut plain = CommandStack::new().with_combining(false);
        for minor in 1..=3 {
            plain.store_and_execute(version(1, minor), &mut state).unwrap();
        }
        assert_eq!(plain.len(), 3);
    }

    #[test]
    fn test_no_combining_across_save_point() {
        let mut state = state(&[]);
        let mut stack: CommandStack<Payload> = CommandStack::new();
        stack.store_and_execute(version(1, 1), &mut state).unwrap();
        stack.mark_saved();
        assert!(!stack.is_dirty());

        stack.store_and_execute(version(1, 2), &mut state).unwrap();
        assert_eq!(stack.len(), 2);
        assert!(stack.is_dirty());

        stack.undo(&mut state).unwrap();
        assert!(!stack.is_dirty());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new();
        assert!(!stack.is_dirty());
        stack.store_and_execute(add("a", ""), &mut state).unwrap();
        assert!(stack.is_dirty());
        stack.mark_saved();
        assert!(!stack.is_dirty());
        stack.undo(&mut state).unwrap();
        assert!(stack.is_dirty());
        stack.redo(&mut state).unwrap();
        assert!(!stack.is_dirty());

        stack.clear().unwrap();
        assert!(!stack.is_dirty());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_clear_makes_state_clean() {
        let mut state = state(&[]);
        let mut stack = CommandStack::new();
        stack.store_and_execute(add("a", ""), &mut state).unwrap();
        stack.store_and_execute(add("b", ""), &mut state).unwrap();
        stack.undo(&mut state).unwrap();
        assert!(stack.is_dirty());

        stack.clear().unwrap();
        assert!(!stack.is_dirty());
        assert!(!stack.can_redo());

        stack.store_and_execute(add("c", ""), &mut state).unwrap();
        assert!(stack.is_dirty());
        stack.undo(&mut state).unwrap();
        assert!(!stack.is_dirty());
    }

    #[test]
    fn test_redo_failure_discards_tail() {
        let mut state = state(&[("a", "1")]);
        let mut stack = CommandStack::new();
        stack
            .store_and_execute(Box::new(DeleteEntries::files(vec![p("a")])), &mut state)
            .unwrap();
        stack.undo(&mut state).unwrap();

        // Tamper with the state behind the stack's back.
        state.table.remove(&p("a"));
        assert!(stack.redo(&mut state).is_err());
        assert!(!stack.can_redo());
        assert!(stack.is_empty());
    }
}
