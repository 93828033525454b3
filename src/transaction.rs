//! Scoped transactions.
//!
//! A [`Transaction`] keeps a group open for as long as it lives. Ending the
//! group is explicit ([`Transaction::commit`]); any other way out of the
//! scope, including `?` and panics, rolls the group back when the guard is
//! dropped.
//!
//! ```rust
//! use pakedit::{Container, Error};
//!
//! fn reorganize(container: &Container<u8>) -> pakedit::Result<()> {
//!     let tx = container.transaction_immediate()?;
//!     tx.rename("a", "archive/a", ())?;
//!     tx.rename("missing", "archive/missing", ())?; // fails, tx is dropped
//!     tx.commit()?;
//!     Ok(())
//! }
//!
//! let container: Container<u8> = Container::new();
//! container.add_file("a", 1, ()).unwrap();
//!
//! assert!(matches!(reorganize(&container), Err(Error::PathNotFound { .. })));
//! assert!(container.contains_file("a"));
//! assert!(!container.is_grouping());
//! ```

use std::ops::Deref;

use crate::{Container, Result};

/// An open transaction on a [`Container`].
///
/// Dereferences to the container, so edits are made through the guard.
#[must_use = "dropping a transaction rolls it back; call commit() to keep the edits"]
pub struct Transaction<'a, P: Clone + Send + 'static> {
    container: &'a Container<P>,
    finished: bool,
}

impl<'a, P: Clone + Send + 'static> Transaction<'a, P> {
    pub(crate) fn new(container: &'a Container<P>) -> Self {
        Self {
            container,
            finished: false,
        }
    }

    /// Ends the transaction, recording its edits as one undoable step.
    ///
    /// Returns `Ok(false)` if no edits were made. For a deferred transaction
    /// this is where queued edits run; if one fails, the group is rolled
    /// back and its error returned.
    pub fn commit(mut self) -> Result<bool> {
        self.finished = true;
        self.container.end()
    }

    /// Abandons the transaction, undoing whatever it applied.
    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.container.cancel_edit()
    }
}

impl<P: Clone + Send + 'static> Deref for Transaction<'_, P> {
    type Target = Container<P>;

    fn deref(&self) -> &Container<P> {
        self.container
    }
}

impl<P: Clone + Send + 'static> Drop for Transaction<'_, P> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        log::warn!("transaction dropped without commit, rolling back");
        if let Err(e) = self.container.cancel_edit() {
            log::warn!("rollback of dropped transaction failed: {}", e);
        }
    }
}
