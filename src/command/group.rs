//! Composite commands.

use std::any::Any;

use super::Command;
use crate::observer::EditNotice;
use crate::state::ArchiveState;
use crate::Result;

/// When the children of a [`GroupCommand`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Children are collected and run together when the group executes.
    Deferred,
    /// Children run one by one as they are added; the group's first
    /// execute does nothing and later ones are redos.
    Immediate,
}

/// An ordered sequence of commands executed and undone as one unit.
pub struct GroupCommand<P> {
    children: Vec<Box<dyn Command<P>>>,
    timing: Timing,
    has_run_once: bool,
}

impl<P> GroupCommand<P> {
    /// Creates an empty group.
    pub fn new(timing: Timing) -> Self {
        Self {
            children: Vec::new(),
            timing,
            has_run_once: false,
        }
    }

    /// Appends a child.
    pub fn push(&mut self, command: Box<dyn Command<P>>) {
        self.children.push(command);
    }

    /// The group's timing mode.
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<P: Send + 'static> Command<P> for GroupCommand<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        let first = !self.has_run_once;
        self.has_run_once = true;
        if first && self.timing == Timing::Immediate {
            return Ok(());
        }
        for i in 0..self.children.len() {
            if let Err(e) = self.children[i].execute(state) {
                log::warn!(
                    "group step {} of {} failed ({}), rolling back",
                    i + 1,
                    self.children.len(),
                    e
                );
                for done in self.children[..i].iter_mut().rev() {
                    done.undo(state);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        for child in self.children.iter_mut().rev() {
            child.undo(state);
        }
    }

    fn description(&self) -> String {
        match self.children.as_slice() {
            [] => String::new(),
            [only] => only.description(),
            [first, second] => format!("{}\n{}", first.description(), second.description()),
            [first, second, ..] => format!(
                "{}\n{}\n...",
                first.description(),
                second.description()
            ),
        }
    }

    fn notice(&self) -> Option<EditNotice> {
        let mut merged = EditNotice::default();
        for notice in self.children.iter().filter_map(|c| c.notice()) {
            merged.sources.extend(notice.sources);
            merged.paths.extend(notice.paths);
            merged.new_folders.extend(notice.new_folders);
        }
        (!merged.is_empty()).then_some(merged)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
