//! Observer notification around a command.

use std::any::Any;

use super::Command;
use crate::observer::{EditNotice, EditObserver};
use crate::state::ArchiveState;
use crate::Result;

/// Wraps a command and reports each execute and undo to an observer.
pub struct Observed<P> {
    inner: Box<dyn Command<P>>,
    observer: Box<dyn EditObserver>,
}

impl<P> Observed<P> {
    /// Wraps `inner`, reporting to `observer`.
    pub fn new(inner: Box<dyn Command<P>>, observer: Box<dyn EditObserver>) -> Self {
        Self { inner, observer }
    }

    fn fire(&mut self, executed: bool) {
        if let Some(notice) = self.inner.notice() {
            self.observer.on_edit(&notice, executed);
        }
    }
}

impl<P: Send + 'static> Command<P> for Observed<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        self.inner.execute(state)?;
        self.fire(true);
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        self.inner.undo(state);
        self.fire(false);
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn notice(&self) -> Option<EditNotice> {
        self.inner.notice()
    }

    fn combine(&mut self, next: &dyn Command<P>) -> bool {
        self.inner.combine(next)
    }

    fn can_delete(&self) -> bool {
        self.inner.can_delete()
    }

    fn as_any(&self) -> &dyn Any {
        self.inner.as_any()
    }
}
