//! Edit notifications.
//!
//! Tree views and other consumers keep their own picture of the archive.
//! Rather than rescanning the table after every edit, they receive an
//! [`EditNotice`] describing what the edit touched: once with
//! `executed == true` each time the edit is applied (including redo), and
//! once with `executed == false` each time it is undone.
//!
//! Passing `()` wherever an observer is expected opts out of notifications.
//!
//! # Example
//!
//! ```rust
//! use pakedit::{Container, observer_fn};
//!
//! let container: Container<Vec<u8>> = Container::new();
//! container
//!     .add_file(
//!         "docs/readme.txt",
//!         b"hi".to_vec(),
//!         observer_fn(|notice, executed| {
//!             println!("{} paths, executed = {}", notice.paths.len(), executed);
//!         }),
//!     )
//!     .unwrap();
//! ```

use crate::ArchivePath;

/// What an edit touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditNotice {
    /// Caller-side source identifiers the edit consumed (for adds).
    pub sources: Vec<String>,
    /// Archive paths the edit created, removed, or changed.
    pub paths: Vec<ArchivePath>,
    /// Directories that came into existence because of the edit.
    pub new_folders: Vec<ArchivePath>,
}

impl EditNotice {
    /// Creates a notice listing only affected paths.
    pub fn for_paths(paths: Vec<ArchivePath>) -> Self {
        Self {
            paths,
            ..Default::default()
        }
    }

    /// Returns true if the notice lists nothing.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.paths.is_empty() && self.new_folders.is_empty()
    }
}

/// Receives edit notifications.
pub trait EditObserver: Send {
    /// Called after the edit is applied (`executed == true`) or undone
    /// (`executed == false`).
    fn on_edit(&mut self, notice: &EditNotice, executed: bool);
}

impl EditObserver for () {
    fn on_edit(&mut self, _notice: &EditNotice, _executed: bool) {}
}

impl EditObserver for Box<dyn EditObserver> {
    fn on_edit(&mut self, notice: &EditNotice, executed: bool) {
        (**self).on_edit(notice, executed)
    }
}

/// An observer that calls a closure.
pub struct ClosureObserver<F> {
    callback: F,
}

impl<F> ClosureObserver<F>
where
    F: FnMut(&EditNotice, bool) + Send,
{
    /// Creates an observer from a closure.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EditObserver for ClosureObserver<F>
where
    F: FnMut(&EditNotice, bool) + Send,
{
    fn on_edit(&mut self, notice: &EditNotice, executed: bool) {
        (self.callback)(notice, executed)
    }
}

/// Creates a closure-based observer.
pub fn observer_fn<F>(f: F) -> ClosureObserver<F>
where
    F: FnMut(&EditNotice, bool) + Send,
{
    ClosureObserver::new(f)
}
