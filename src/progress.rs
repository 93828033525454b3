//! Progress reporting and cooperative cancellation for batch edits.
//!
//! Batch operations such as [`Container::add_files`] prepare their inputs
//! one entry at a time and poll [`ProgressReporter::should_cancel`] between
//! entries. A cancelled batch applies nothing, rolls back an open
//! transaction, and fails with [`Error::Cancelled`].
//!
//! # Example
//!
//! ```rust
//! use pakedit::progress::AtomicProgress;
//!
//! let progress = AtomicProgress::shared();
//! let handle = progress.clone();
//!
//! // Another thread (a UI "Cancel" button, say) can request cancellation:
//! handle.cancel();
//! assert!(progress.is_cancelled());
//! ```
//!
//! [`Container::add_files`]: crate::Container::add_files
//! [`Error::Cancelled`]: crate::Error::Cancelled

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::Error;

/// Receives batch progress and decides whether the batch goes on.
///
/// Every method has a no-op default.
pub trait ProgressReporter: Send {
    /// Called once, before the first entry, with the batch size.
    fn on_batch_start(&mut self, total: usize) {
        let _ = total;
    }

    /// Called once per entry after it has been prepared. `index` counts
    /// from zero.
    fn on_entry(&mut self, index: usize, name: &str) {
        let _ = (index, name);
    }

    /// Called when an entry is rejected; the batch then fails with `error`.
    fn on_entry_rejected(&mut self, name: &str, error: &Error) {
        let _ = (name, error);
    }

    /// Polled between entries. Returning true cancels the batch.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// Reporter that ignores everything and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &mut R {
    fn on_batch_start(&mut self, total: usize) {
        (**self).on_batch_start(total);
    }

    fn on_entry(&mut self, index: usize, name: &str) {
        (**self).on_entry(index, name);
    }

    fn on_entry_rejected(&mut self, name: &str, error: &Error) {
        (**self).on_entry_rejected(name, error);
    }

    fn should_cancel(&self) -> bool {
        (**self).should_cancel()
    }
}

/// Reporter that keeps a tally of the batch, for inspection afterwards.
///
/// Pass it by `&mut` to keep ownership:
///
/// ```rust
/// use pakedit::{Container, SourceFile};
/// use pakedit::progress::ProgressTally;
///
/// let container: Container<u8> = Container::new();
/// let mut tally = ProgressTally::new();
/// let files = vec![SourceFile::new("/in/a", "a", 1), SourceFile::new("/in/b", "b", 2)];
/// container.add_files("", files, (), &mut tally).unwrap();
/// assert_eq!(tally.prepared, 2);
/// assert_eq!(tally.last_entry.as_deref(), Some("b"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct ProgressTally {
    /// Batch size announced at start.
    pub total: usize,
    /// Entries prepared so far.
    pub prepared: usize,
    /// Name of the last prepared entry.
    pub last_entry: Option<String>,
    /// Entries rejected, with the reason.
    pub rejected: Vec<(String, String)>,
    /// Set to cancel the batch at the next poll.
    pub cancel_requested: bool,
}

impl ProgressTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of the batch prepared, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        match self.total {
            0 => 0.0,
            total => self.prepared as f64 / total as f64,
        }
    }
}

impl ProgressReporter for ProgressTally {
    fn on_batch_start(&mut self, total: usize) {
        self.total = total;
    }

    fn on_entry(&mut self, _index: usize, name: &str) {
        self.prepared += 1;
        self.last_entry = Some(name.to_string());
    }

    fn on_entry_rejected(&mut self, name: &str, error: &Error) {
        self.rejected.push((name.to_string(), error.to_string()));
    }

    fn should_cancel(&self) -> bool {
        self.cancel_requested
    }
}

/// Thread-safe reporter: counters and a cancel flag other threads can read
/// and set while a batch runs. Used through `Arc<AtomicProgress>`.
#[derive(Debug, Default)]
pub struct AtomicProgress {
    total: AtomicUsize,
    prepared: AtomicUsize,
    cancelled: AtomicBool,
}

impl AtomicProgress {
    /// Creates a reporter with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reporter ready to be shared between threads.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Batch size of the current batch.
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Entries prepared so far.
    pub fn prepared(&self) -> usize {
        self.prepared.load(Ordering::Relaxed)
    }

    /// Requests cancellation. Stays set until [`reset`](Self::reset).
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Clears the counters and the cancel flag for another batch.
    pub fn reset(&self) {
        self.total.store(0, Ordering::Relaxed);
        self.prepared.store(0, Ordering::Relaxed);
        self.cancelled.store(false, Ordering::Release);
    }
}

impl ProgressReporter for Arc<AtomicProgress> {
    fn on_batch_start(&mut self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.prepared.store(0, Ordering::Relaxed);
    }

    fn on_entry(&mut self, _index: usize, _name: &str) {
        self.prepared.fetch_add(1, Ordering::Relaxed);
    }

    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

/// Reporter backed by a closure called after every prepared entry.
///
/// The closure gets `(prepared, total)` and returns false to cancel.
pub struct ClosureProgress<F> {
    callback: F,
    prepared: usize,
    total: usize,
    stop: bool,
}

impl<F> ClosureProgress<F>
where
    F: FnMut(usize, usize) -> bool + Send,
{
    /// Wraps `callback`.
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            prepared: 0,
            total: 0,
            stop: false,
        }
    }
}

impl<F> ProgressReporter for ClosureProgress<F>
where
    F: FnMut(usize, usize) -> bool + Send,
{
    fn on_batch_start(&mut self, total: usize) {
        self.total = total;
    }

    fn on_entry(&mut self, _index: usize, _name: &str) {
        self.prepared += 1;
        self.stop = !(self.callback)(self.prepared, self.total);
    }

    fn should_cancel(&self) -> bool {
        self.stop
    }
}

/// Shorthand for [`ClosureProgress::new`].
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(usize, usize) -> bool + Send,
{
    ClosureProgress::new(f)
}
