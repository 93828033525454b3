//! Header edits.
//!
//! Both commands are combinable: a run of version (or signature) edits
//! collapses into one history slot that remembers the value before the run
//! and the value after it. A run that ends where it started is dropped.

use std::any::Any;

use super::Command;
use crate::header::{FormatVersion, Magic};
use crate::state::ArchiveState;
use crate::Result;

/// Sets the container format version.
#[derive(Debug, Clone)]
pub struct ChangeVersion {
    from: Option<FormatVersion>,
    to: FormatVersion,
}

impl ChangeVersion {
    /// Creates a command setting the version to `to`.
    pub fn new(to: FormatVersion) -> Self {
        Self { from: None, to }
    }

    /// The version this command sets.
    pub fn target(&self) -> FormatVersion {
        self.to
    }
}

impl<P> Command<P> for ChangeVersion {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        self.from = Some(state.header.version);
        state.header.version = self.to;
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        if let Some(from) = self.from {
            state.header.version = from;
        }
    }

    fn description(&self) -> String {
        format!("Change version to {}", self.to)
    }

    fn combine(&mut self, next: &dyn Command<P>) -> bool {
        match next.as_any().downcast_ref::<Self>() {
            Some(next) => {
                self.to = next.to;
                true
            }
            None => false,
        }
    }

    fn can_delete(&self) -> bool {
        self.from == Some(self.to)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Sets the container signature bytes.
#[derive(Debug, Clone)]
pub struct ChangeHeader {
    from: Option<Magic>,
    to: Magic,
}

impl ChangeHeader {
    /// Creates a command setting the signature to `to`.
    pub fn new(to: impl Into<Magic>) -> Self {
        Self {
            from: None,
            to: to.into(),
        }
    }

    /// The signature this command sets.
    pub fn target(&self) -> Magic {
        self.to
    }
}

impl<P> Command<P> for ChangeHeader {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        self.from = Some(state.header.magic);
        state.header.magic = self.to;
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        if let Some(from) = self.from {
            state.header.magic = from;
        }
    }

    fn description(&self) -> String {
        format!("Change header to '{}'", self.to)
    }

    fn combine(&mut self, next: &dyn Command<P>) -> bool {
        match next.as_any().downcast_ref::<Self>() {
            Some(next) => {
                self.to = next.to;
                true
            }
            None => false,
        }
    }

    fn can_delete(&self) -> bool {
        self.from == Some(self.to)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
