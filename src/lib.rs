//! # pakedit
//!
//! Transactional, fully undoable editing of path-keyed archive tables.
//!
//! An archive is modelled as a table of opaque payloads keyed by
//! case-insensitive paths. Directories are never stored; a directory exists
//! exactly while some file lives underneath it. Every structural edit (add,
//! delete, rename, move, merge, replace, encrypt, header changes) is a
//! reversible command recorded in a linear undo/redo history, and commands
//! can be grouped into atomic transactions.
//!
//! Reading and writing actual archive bytes is left to the caller: payloads
//! are whatever type the caller chooses, and [`Container::save`] hands a
//! consistent snapshot to a caller-supplied [`Persister`].
//!
//! ## Quick Start
//!
//! ```rust
//! use pakedit::{Container, Result};
//!
//! fn main() -> Result<()> {
//!     let container: Container<Vec<u8>> = Container::new();
//!
//!     container.add_file("data/a.txt", b"first".to_vec(), ())?;
//!     container.add_file("data/a.txt", b"second".to_vec(), ())?;
//!     container.rename("data", "docs", ())?;
//!
//!     // Undo the rename and the overwrite.
//!     container.undo()?;
//!     container.undo()?;
//!     let payload = container.entry("data/a.txt").map(|e| e.payload);
//!     assert_eq!(payload.as_deref(), Some(&b"first"[..]));
//!
//!     container.redo()?;
//!     assert_eq!(container.redo_description().as_deref(), Some("Move 'data' to 'docs'"));
//!     Ok(())
//! }
//! ```
//!
//! ### Transactions
//!
//! ```rust
//! use pakedit::{Container, Result};
//!
//! fn main() -> Result<()> {
//!     let container: Container<u32> = Container::new();
//!     container.add_file("in/a", 1, ())?;
//!     container.add_file("in/b", 2, ())?;
//!
//!     let tx = container.transaction()?;
//!     tx.move_path("in/a", "out", ())?;
//!     tx.remove_file("in/b", ())?;
//!     tx.commit()?;
//!
//!     assert_eq!(container.paths().len(), 1);
//!     container.undo()?; // one step undoes the whole group
//!     assert!(container.contains_file("in/a") && container.contains_file("in/b"));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `regex` | No | Regex-based entry selection |
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: `debug`
//! for executed, undone, and redone edits, `trace` for individual table
//! mutations, `warn` for rollbacks and cancellations. No logger is installed.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod archive_path;
pub mod cipher;
pub mod command;
pub mod container;
pub mod encoding;
pub mod entry;
pub mod error;
pub mod header;
pub mod observer;
pub mod options;
pub mod progress;
pub mod select;
pub mod state;
pub mod table;
pub mod transaction;

pub use archive_path::ArchivePath;
pub use cipher::{EntryCipher, FlagOnly};
pub use container::{Container, PersistError, Persister, SourceFile};
pub use entry::{Entry, EntryFlags};
pub use error::{Error, Result};
pub use header::{FormatVersion, HeaderMetadata, Magic};
pub use observer::{ClosureObserver, EditNotice, EditObserver, observer_fn};
pub use options::ContainerOptions;
pub use progress::{
    AtomicProgress, ClosureProgress, NoProgress, ProgressReporter, ProgressTally, progress_fn,
};
pub use state::ArchiveState;
pub use table::EntryTable;
pub use transaction::Transaction;
