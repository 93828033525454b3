//! The editing facade.
//!
//! A [`Container`] owns one archive's entry table, header metadata, and
//! command history. Every mutating call validates its arguments, builds the
//! matching [`Command`], and hands it to the history, so every successful
//! edit can be undone and redone. Saving is delegated to a [`Persister`]
//! supplied by the caller.
//!
//! # Example
//!
//! ```rust
//! use pakedit::Container;
//!
//! let container: Container<Vec<u8>> = Container::new();
//! container.add_file("data/old/x.txt", b"x".to_vec(), ()).unwrap();
//!
//! container.merge_folders("data/old", "data", ()).unwrap();
//! assert!(container.contains_file("data/x.txt"));
//! assert!(!container.contains_directory("data/old"));
//!
//! container.undo().unwrap();
//! assert!(container.contains_file("data/old/x.txt"));
//! ```
//!
//! # Concurrency
//!
//! All methods take `&self`. A mutex serializes callers, so a container can
//! be shared between threads behind an `Arc`. While [`Container::save`] is
//! running the persister, edits fail with
//! [`Error::ConcurrentSaveInProgress`]; reads keep working.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::archive_path::canonicalize;
use crate::cipher::{EntryCipher, FlagOnly};
use crate::command::{
    AddEntries, ChangeHeader, ChangeVersion, Command, CommandStack, DeleteEntries,
    EncryptEntries, MergeFolders, MoveEntries, Observed, RenameEntry, ReplaceEntry, Timing,
};
use crate::header::{FormatVersion, HeaderMetadata, Magic};
use crate::observer::EditObserver;
use crate::options::ContainerOptions;
use crate::progress::ProgressReporter;
use crate::select::{EntrySelector, SelectByWildcard};
use crate::state::ArchiveState;
use crate::transaction::Transaction;
use crate::{ArchivePath, Entry, Error, Result};

/// Error type returned by a [`Persister`].
pub type PersistError = Box<dyn std::error::Error + Send + Sync>;

/// Writes an archive state somewhere.
///
/// The container calls this from [`Container::save`] with a consistent
/// snapshot, outside its lock.
pub trait Persister<P> {
    /// Persists `state`.
    fn persist(&mut self, state: &ArchiveState<P>) -> std::result::Result<(), PersistError>;
}

impl<P, F> Persister<P> for F
where
    F: FnMut(&ArchiveState<P>) -> std::result::Result<(), PersistError>,
{
    fn persist(&mut self, state: &ArchiveState<P>) -> std::result::Result<(), PersistError> {
        self(state)
    }
}

/// One file for [`Container::add_files`].
#[derive(Debug, Clone)]
pub struct SourceFile<P> {
    /// Caller-side identifier reported back to observers (e.g. a disk path).
    pub source: String,
    /// Destination path relative to the target directory.
    pub relative: String,
    /// The payload to store.
    pub payload: P,
}

impl<P> SourceFile<P> {
    /// Creates a source file.
    pub fn new(source: impl Into<String>, relative: impl Into<String>, payload: P) -> Self {
        Self {
            source: source.into(),
            relative: relative.into(),
            payload,
        }
    }
}

struct Inner<P> {
    state: ArchiveState<P>,
    stack: CommandStack<P>,
}

/// Recovers the guard from a poisoned mutex.
///
/// Commands restore the table before any panic can escape them, so the
/// state behind a poisoned lock is still consistent.
fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("container mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Clears the saving flag when a save ends, however it ends.
struct SaveGuard<'a>(&'a AtomicBool);

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An editable archive.
///
/// `P` is the caller's entry payload type. The container never looks inside
/// payloads; `Clone` is needed only for [`snapshot`](Self::snapshot) and
/// [`entry`](Self::entry).
pub struct Container<P> {
    inner: Mutex<Inner<P>>,
    saving: AtomicBool,
    options: ContainerOptions,
    cipher: Arc<dyn EntryCipher<P>>,
}

impl<P: Clone + Send + 'static> Default for Container<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone + Send + 'static> std::fmt::Debug for Container<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("entries", &self.len())
            .field("saving", &self.is_saving())
            .field("options", &self.options)
            .finish()
    }
}

impl<P: Clone + Send + 'static> Container<P> {
    /// Creates an empty container with default options.
    pub fn new() -> Self {
        Self::with_options(ContainerOptions::default())
    }

    /// Creates an empty container.
    pub fn with_options(options: ContainerOptions) -> Self {
        Self::from_state(ArchiveState::new(options.header), options)
    }

    /// Creates a container holding `entries`, as read from an existing
    /// archive. Loading is not an edit and leaves the history empty.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyExists`] if two entries share a path
    /// - [`Error::InvalidPath`] if an entry's path is rejected by the
    ///   configured encoding or collides with another entry's directory
    pub fn load(
        entries: impl IntoIterator<Item = Entry<P>>,
        options: ContainerOptions,
    ) -> Result<Self> {
        let mut state = ArchiveState::new(options.header);
        for entry in entries {
            if !options.encoding.is_valid(entry.path.as_str()) {
                return Err(Error::invalid_path(
                    entry.path.as_str(),
                    format!("not representable in {}", options.encoding.name()),
                ));
            }
            if state.table.contains_file(&entry.path) {
                return Err(Error::already_exists(entry.path.as_str()));
            }
            state.table.check_file_slot(&entry.path)?;
            state.table.insert(entry);
        }
        state.refresh_encrypted();
        log::debug!("loaded {} entries", state.table.len());
        Ok(Self::from_state(state, options))
    }

    fn from_state(state: ArchiveState<P>, options: ContainerOptions) -> Self {
        let stack = CommandStack::new()
            .with_limit(options.history_limit)
            .with_combining(options.combine_commands);
        Self {
            inner: Mutex::new(Inner { state, stack }),
            saving: AtomicBool::new(false),
            options,
            cipher: Arc::new(FlagOnly),
        }
    }

    /// Sets the payload transform used by
    /// [`encrypt_files`](Self::encrypt_files) and
    /// [`decrypt_files`](Self::decrypt_files).
    pub fn with_cipher(mut self, cipher: impl EntryCipher<P> + 'static) -> Self {
        self.cipher = Arc::new(cipher);
        self
    }

    /// Returns the container's options.
    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    // ---- internals ----

    fn lock(&self) -> MutexGuard<'_, Inner<P>> {
        lock_or_recover(&self.inner)
    }

    fn lock_for_edit(&self) -> Result<MutexGuard<'_, Inner<P>>> {
        let inner = self.lock();
        if self.saving.load(Ordering::Acquire) {
            return Err(Error::ConcurrentSaveInProgress);
        }
        Ok(inner)
    }

    fn path(&self, s: &str) -> Result<ArchivePath> {
        ArchivePath::with_encoding(s, self.options.encoding.as_ref())
    }

    /// Parses a directory argument; an empty string is the archive root.
    fn dir(&self, s: &str) -> Result<Option<ArchivePath>> {
        if canonicalize(s).is_empty() {
            Ok(None)
        } else {
            self.path(s).map(Some)
        }
    }

    fn parse_paths<I>(&self, paths: I) -> Result<Vec<ArchivePath>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        paths.into_iter().map(|p| self.path(p.as_ref())).collect()
    }

    fn apply(&self, inner: &mut Inner<P>, command: Box<dyn Command<P>>) -> Result<()> {
        let Inner { state, stack } = inner;
        stack.store_and_execute(command, state)
    }

    fn submit(
        &self,
        command: Box<dyn Command<P>>,
        observer: impl EditObserver + 'static,
    ) -> Result<()> {
        let mut inner = self.lock_for_edit()?;
        let observed = Observed::new(command, Box::new(observer));
        self.apply(&mut inner, Box::new(observed))
    }

    // ---- adding ----

    /// Adds one file, replacing any file already at `dest`.
    ///
    /// Undo restores the replaced file exactly.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPath`] if `dest` is malformed, names a directory, or
    /// lies underneath a file.
    pub fn add_file(
        &self,
        dest: &str,
        payload: P,
        observer: impl EditObserver + 'static,
    ) -> Result<()> {
        let path = self.path(dest)?;
        log::debug!("add_file {}", path);
        let command = AddEntries::new(vec![Entry::new(path, payload)]);
        self.submit(Box::new(command), observer)
    }

    /// Adds a batch of files underneath `dest_dir` (an empty string is the
    /// archive root) as one undoable step.
    ///
    /// `progress` is polled between files. If it asks to cancel, nothing is
    /// added, the open transaction (if any) is rolled back, and
    /// [`Error::Cancelled`] is returned. An empty batch does nothing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pakedit::{Container, SourceFile};
    /// use pakedit::progress::NoProgress;
    ///
    /// let container: Container<Vec<u8>> = Container::new();
    /// let files = vec![
    ///     SourceFile::new("/home/me/a.txt", "a.txt", b"a".to_vec()),
    ///     SourceFile::new("/home/me/sub/b.txt", "sub/b.txt", b"b".to_vec()),
    /// ];
    /// container.add_files("import", files, (), NoProgress).unwrap();
    /// assert!(container.contains_file("import/sub/b.txt"));
    /// assert_eq!(container.history_len(), 1);
    /// ```
    pub fn add_files(
        &self,
        dest_dir: &str,
        files: Vec<SourceFile<P>>,
        observer: impl EditObserver + 'static,
        mut progress: impl ProgressReporter,
    ) -> Result<()> {
        let dir = self.dir(dest_dir)?;
        if files.is_empty() {
            return Ok(());
        }
        progress.on_batch_start(files.len());

        let mut entries = Vec::with_capacity(files.len());
        let mut sources = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            if progress.should_cancel() {
                return self.cancel_batch(entries.len());
            }
            let path = match ArchivePath::join_under(dir.as_ref(), &file.relative)
                .and_then(|p| self.path(p.as_str()))
            {
                Ok(path) => path,
                Err(e) => {
                    progress.on_entry_rejected(&file.relative, &e);
                    return Err(e);
                }
            };
            progress.on_entry(index, path.as_str());
            entries.push(Entry::new(path, file.payload));
            sources.push(file.source);
        }
        if progress.should_cancel() {
            return self.cancel_batch(entries.len());
        }

        log::debug!("add_files: {} files", entries.len());
        let command = AddEntries::new(entries).with_sources(sources);
        self.submit(Box::new(command), observer)
    }

    fn cancel_batch(&self, prepared: usize) -> Result<()> {
        log::warn!("batch cancelled after {} files", prepared);
        let mut inner = self.lock();
        if inner.stack.is_grouping() {
            let Inner { state, stack } = &mut *inner;
            stack.cancel(state)?;
        }
        Err(Error::Cancelled)
    }

    /// Replaces the payload of an existing file, keeping its flags.
    ///
    /// # Errors
    ///
    /// [`Error::PathNotFound`] if no file exists at `path`.
    pub fn replace_file(
        &self,
        path: &str,
        payload: P,
        observer: impl EditObserver + 'static,
    ) -> Result<()> {
        let path = self.path(path)?;
        self.submit(Box::new(ReplaceEntry::new(path, payload)), observer)
    }

    // ---- removing ----

    /// Removes one file.
    ///
    /// # Errors
    ///
    /// [`Error::PathNotFound`] if no file exists at `path`.
    pub fn remove_file(&self, path: &str, observer: impl EditObserver + 'static) -> Result<()> {
        self.remove_files([path], observer)
    }

    /// Removes several files as one step. Nothing is removed if any of them
    /// is missing. An empty list does nothing.
    pub fn remove_files<I>(&self, paths: I, observer: impl EditObserver + 'static) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let paths = self.parse_paths(paths)?;
        if paths.is_empty() {
            return Ok(());
        }
        self.submit(Box::new(DeleteEntries::files(paths)), observer)
    }

    /// Removes every file selected by `selector`, returning how many were
    /// selected. Selecting nothing does nothing.
    pub fn remove_matching(
        &self,
        selector: &dyn EntrySelector,
        observer: impl EditObserver + 'static,
    ) -> Result<usize> {
        let mut inner = self.lock_for_edit()?;
        let selected: Vec<ArchivePath> = inner
            .state
            .table
            .iter()
            .filter(|e| selector.select(&e.path))
            .map(|e| e.path.clone())
            .collect();
        let count = selected.len();
        if count == 0 {
            return Ok(0);
        }
        let command = Observed::new(
            Box::new(DeleteEntries::files(selected)),
            Box::new(observer),
        );
        self.apply(&mut inner, Box::new(command))?;
        Ok(count)
    }

    /// Removes every file matching a wildcard pattern.
    ///
    /// See [`SelectByWildcard`] for the pattern rules.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pakedit::Container;
    ///
    /// let container: Container<u8> = Container::new();
    /// for name in ["a.tmp", "cache/b.TMP", "keep.txt"] {
    ///     container.add_file(name, 0, ()).unwrap();
    /// }
    /// assert_eq!(container.remove_files_matching("*.tmp", ()).unwrap(), 2);
    /// assert_eq!(container.len(), 1);
    /// ```
    pub fn remove_files_matching(
        &self,
        pattern: &str,
        observer: impl EditObserver + 'static,
    ) -> Result<usize> {
        let selector = SelectByWildcard::new(pattern)?;
        self.remove_matching(&selector, observer)
    }

    /// Removes every file whose path matches a regular expression.
    #[cfg(feature = "regex")]
    #[cfg_attr(docsrs, doc(cfg(feature = "regex")))]
    pub fn remove_files_regex(
        &self,
        pattern: &str,
        observer: impl EditObserver + 'static,
    ) -> Result<usize> {
        let selector = crate::select::SelectByRegex::new(pattern)?;
        self.remove_matching(&selector, observer)
    }

    /// Removes a folder and everything underneath it.
    ///
    /// # Errors
    ///
    /// [`Error::PathNotFound`] if no directory exists at `path`.
    pub fn remove_folder(&self, path: &str, observer: impl EditObserver + 'static) -> Result<()> {
        self.remove_folders([path], observer)
    }

    /// Removes several folders as one step. An empty list does nothing.
    pub fn remove_folders<I>(&self, paths: I, observer: impl EditObserver + 'static) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let dirs = self.parse_paths(paths)?;
        if dirs.is_empty() {
            return Ok(());
        }
        self.submit(Box::new(DeleteEntries::folders(dirs)), observer)
    }

    // ---- renaming and moving ----

    /// Renames a file or a folder.
    ///
    /// Renaming a path to exactly itself does nothing and records nothing.
    /// A rename that changes only letter case is a real rename.
    ///
    /// # Errors
    ///
    /// - [`Error::PathNotFound`] if `old` does not exist
    /// - [`Error::AlreadyExists`] if `new` is taken (folders are never
    ///   combined; see [`merge_folders`](Self::merge_folders))
    /// - [`Error::InvalidPath`] if `new` clashes with a file/directory of the
    ///   other kind
    /// - [`Error::SubfolderConflict`] if a folder would move inside itself
    /// - [`Error::HiddenFolderConflict`] if `new` is a hidden folder name
    pub fn rename(
        &self,
        old: &str,
        new: &str,
        observer: impl EditObserver + 'static,
    ) -> Result<()> {
        let old = self.path(old)?;
        let new = self.path(new)?;
        if old.as_str() == new.as_str() {
            log::debug!("rename {} onto itself ignored", old);
            return Ok(());
        }
        self.relocate(old, new, observer)
    }

    /// Moves a file or folder into `dest_dir` (an empty string is the archive
    /// root), keeping its name.
    pub fn move_path(
        &self,
        path: &str,
        dest_dir: &str,
        observer: impl EditObserver + 'static,
    ) -> Result<()> {
        let old = self.path(path)?;
        let dest = self.dir(dest_dir)?;
        let new = ArchivePath::join_under(dest.as_ref(), old.file_name())?;
        if old.as_str() == new.as_str() {
            return Ok(());
        }
        self.relocate(old, new, observer)
    }

    fn relocate(
        &self,
        old: ArchivePath,
        new: ArchivePath,
        observer: impl EditObserver + 'static,
    ) -> Result<()> {
        let mut inner = self.lock_for_edit()?;
        log::debug!("relocate {} -> {}", old, new);
        let command: Box<dyn Command<P>> =
            if inner.state.table.contains_directory(&old) {
                Box::new(MoveEntries::new(old, Some(new)))
            } else {
                Box::new(RenameEntry::new(old, new))
            };
        let observed = Observed::new(command, Box::new(observer));
        self.apply(&mut inner, Box::new(observed))
    }

    /// Moves every file of `old_dir` into `new_dir` (an empty string is the
    /// archive root), replacing colliding files, as one step.
    ///
    /// Merging a folder into itself does nothing.
    pub fn merge_folders(
        &self,
        old_dir: &str,
        new_dir: &str,
        observer: impl EditObserver + 'static,
    ) -> Result<()> {
        let old = self.path(old_dir)?;
        let new = self.dir(new_dir)?;
        if new.as_ref().is_some_and(|n| n.key() == old.key()) {
            return Ok(());
        }
        self.submit(Box::new(MergeFolders::new(old, new)), observer)
    }

    // ---- encryption and header ----

    /// Marks files encrypted, transforming payloads through the configured
    /// cipher. Files already encrypted are left alone.
    pub fn encrypt_files<I>(&self, paths: I, observer: impl EditObserver + 'static) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let paths = self.parse_paths(paths)?;
        if paths.is_empty() {
            return Ok(());
        }
        let command = EncryptEntries::encrypt(paths, Arc::clone(&self.cipher));
        self.submit(Box::new(command), observer)
    }

    /// Marks files decrypted, transforming payloads through the configured
    /// cipher. Files already plain are left alone.
    pub fn decrypt_files<I>(&self, paths: I, observer: impl EditObserver + 'static) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let paths = self.parse_paths(paths)?;
        if paths.is_empty() {
            return Ok(());
        }
        let command = EncryptEntries::decrypt(paths, Arc::clone(&self.cipher));
        self.submit(Box::new(command), observer)
    }

    /// Sets the format version. Consecutive version changes share one
    /// history slot.
    pub fn change_version(&self, major: u16, minor: u16) -> Result<()> {
        let mut inner = self.lock_for_edit()?;
        let command = ChangeVersion::new(FormatVersion::new(major, minor));
        self.apply(&mut inner, Box::new(command))
    }

    /// Sets the signature bytes. Consecutive signature changes share one
    /// history slot.
    pub fn change_header(&self, magic: impl Into<Magic>) -> Result<()> {
        let mut inner = self.lock_for_edit()?;
        self.apply(&mut inner, Box::new(ChangeHeader::new(magic)))
    }

    // ---- transactions ----

    /// Opens a deferred transaction: edits are queued and run together by
    /// [`end`](Self::end).
    ///
    /// Because queued edits run later, their validation errors surface from
    /// `end`, which rolls back the whole group.
    ///
    /// # Errors
    ///
    /// [`Error::NestedTransaction`] if a transaction is already open.
    pub fn begin(&self) -> Result<()> {
        self.lock_for_edit()?.stack.begin(Timing::Deferred)
    }

    /// Opens an immediate transaction: edits run as they are made and
    /// [`end`](Self::end) records them as one step.
    ///
    /// # Errors
    ///
    /// [`Error::NestedTransaction`] if a transaction is already open.
    pub fn begin_no_delay(&self) -> Result<()> {
        self.lock_for_edit()?.stack.begin(Timing::Immediate)
    }

    /// Closes the open transaction. Returns `Ok(false)` if it held no edits.
    ///
    /// # Errors
    ///
    /// [`Error::NoTransaction`] if none is open, or the error of the first
    /// queued edit that failed (after rolling back the group).
    pub fn end(&self) -> Result<bool> {
        let mut inner = self.lock();
        let Inner { state, stack } = &mut *inner;
        stack.end(state)
    }

    /// Abandons the open transaction, undoing any edit it already applied.
    ///
    /// # Errors
    ///
    /// [`Error::NoTransaction`] if none is open.
    pub fn cancel_edit(&self) -> Result<()> {
        let mut inner = self.lock();
        let Inner { state, stack } = &mut *inner;
        stack.cancel(state)
    }

    /// Opens a deferred transaction that rolls back unless committed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pakedit::Container;
    ///
    /// let container: Container<u8> = Container::new();
    /// container.add_file("a", 1, ()).unwrap();
    ///
    /// let tx = container.transaction().unwrap();
    /// tx.rename("a", "b", ()).unwrap();
    /// tx.add_file("c", 3, ()).unwrap();
    /// tx.commit().unwrap();
    ///
    /// assert!(container.contains_file("b"));
    /// container.undo().unwrap();
    /// assert_eq!(container.paths().len(), 1);
    /// assert!(container.contains_file("a"));
    /// ```
    pub fn transaction(&self) -> Result<Transaction<'_, P>> {
        self.begin()?;
        Ok(Transaction::new(self))
    }

    /// Opens an immediate transaction that rolls back unless committed.
    pub fn transaction_immediate(&self) -> Result<Transaction<'_, P>> {
        self.begin_no_delay()?;
        Ok(Transaction::new(self))
    }

    /// Returns true while a transaction is open.
    pub fn is_grouping(&self) -> bool {
        self.lock().stack.is_grouping()
    }

    // ---- history ----

    /// Undoes the most recent step. Returns `Ok(false)` if there was none.
    ///
    /// # Errors
    ///
    /// [`Error::TransactionInProgress`] while a transaction is open.
    pub fn undo(&self) -> Result<bool> {
        let mut inner = self.lock_for_edit()?;
        let Inner { state, stack } = &mut *inner;
        stack.undo(state)
    }

    /// Redoes the most recently undone step. Returns `Ok(false)` if there
    /// was none.
    ///
    /// # Errors
    ///
    /// [`Error::TransactionInProgress`] while a transaction is open.
    pub fn redo(&self) -> Result<bool> {
        let mut inner = self.lock_for_edit()?;
        let Inner { state, stack } = &mut *inner;
        stack.redo(state)
    }

    /// Discards the undo history. The current state is kept and becomes the
    /// clean point for [`is_dirty`](Self::is_dirty).
    pub fn clear_history(&self) -> Result<()> {
        self.lock_for_edit()?.stack.clear()
    }

    /// Returns true if there is a step to undo.
    pub fn can_undo(&self) -> bool {
        self.lock().stack.can_undo()
    }

    /// Returns true if there is a step to redo.
    pub fn can_redo(&self) -> bool {
        self.lock().stack.can_redo()
    }

    /// Description of the step [`undo`](Self::undo) would revert.
    pub fn undo_description(&self) -> Option<String> {
        self.lock().stack.undo_description()
    }

    /// Description of the step [`redo`](Self::redo) would apply.
    pub fn redo_description(&self) -> Option<String> {
        self.lock().stack.redo_description()
    }

    /// Number of recorded steps, undone ones included.
    pub fn history_len(&self) -> usize {
        self.lock().stack.len()
    }

    /// Returns true if the state differs from the last save.
    pub fn is_dirty(&self) -> bool {
        self.lock().stack.is_dirty()
    }

    // ---- hidden folders ----

    /// Reserves a folder name so nothing can be moved or renamed onto it.
    /// Returns false if it was already reserved. Not an undoable edit.
    pub fn hide_folder(&self, path: &str) -> Result<bool> {
        let path = self.path(path)?;
        Ok(self.lock_for_edit()?.state.table.hide(&path))
    }

    /// Releases a hidden folder reservation.
    pub fn unhide_folder(&self, path: &str) -> Result<bool> {
        let path = self.path(path)?;
        Ok(self.lock_for_edit()?.state.table.unhide(&path))
    }

    /// Returns true if `path` is reserved as hidden.
    pub fn is_hidden(&self, path: &str) -> bool {
        self.path(path)
            .is_ok_and(|p| self.lock().state.table.is_hidden(&p))
    }

    // ---- reading ----

    /// Returns true if a file exists at `path`.
    pub fn contains_file(&self, path: &str) -> bool {
        ArchivePath::new(path).is_ok_and(|p| self.lock().state.table.contains_file(&p))
    }

    /// Returns true if a directory exists at `path`.
    pub fn contains_directory(&self, path: &str) -> bool {
        ArchivePath::new(path).is_ok_and(|p| self.lock().state.table.contains_directory(&p))
    }

    /// Calls `f` with the entry at `path`, if there is one.
    pub fn with_entry<R>(&self, path: &str, f: impl FnOnce(&Entry<P>) -> R) -> Option<R> {
        let path = ArchivePath::new(path).ok()?;
        let inner = self.lock();
        inner.state.table.get(&path).map(f)
    }

    /// Returns a copy of the entry at `path`.
    pub fn entry(&self, path: &str) -> Option<Entry<P>> {
        self.with_entry(path, Entry::clone)
    }

    /// Returns the paths of files underneath `dir` (an empty string is the
    /// archive root).
    pub fn files_under(&self, dir: &str, recursive: bool) -> Result<Vec<ArchivePath>> {
        let dir = self.dir(dir)?;
        let inner = self.lock();
        Ok(inner
            .state
            .table
            .files_under(dir.as_ref(), recursive)
            .into_iter()
            .map(|e| e.path.clone())
            .collect())
    }

    /// Returns every file path in key order.
    pub fn paths(&self) -> Vec<ArchivePath> {
        self.lock().state.table.paths()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.lock().state.table.len()
    }

    /// Returns true if the container holds no files.
    pub fn is_empty(&self) -> bool {
        self.lock().state.table.is_empty()
    }

    /// Returns the header metadata.
    pub fn header(&self) -> HeaderMetadata {
        self.lock().state.header
    }

    /// Returns a copy of the whole state.
    pub fn snapshot(&self) -> ArchiveState<P> {
        self.lock().state.clone()
    }

    // ---- saving ----

    /// Returns true while [`save`](Self::save) is running.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Hands a snapshot of the state to `persister`.
    ///
    /// The persister runs without holding the container lock; reads proceed
    /// meanwhile and edits fail with [`Error::ConcurrentSaveInProgress`]. On
    /// success the state is marked clean and, unless disabled in the
    /// options, the undo history is discarded.
    ///
    /// # Errors
    ///
    /// - [`Error::ConcurrentSaveInProgress`] if another save is running
    /// - [`Error::TransactionInProgress`] if a transaction is open
    /// - [`Error::Persist`] if the persister fails
    pub fn save(&self, mut persister: impl Persister<P>) -> Result<()> {
        if self
            .saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::ConcurrentSaveInProgress);
        }
        let _guard = SaveGuard(&self.saving);

        let snapshot = {
            let inner = self.lock();
            if inner.stack.is_grouping() {
                return Err(Error::TransactionInProgress);
            }
            inner.state.clone()
        };

        log::debug!("saving {} entries", snapshot.table.len());
        persister.persist(&snapshot).map_err(Error::Persist)?;

        let mut inner = self.lock();
        inner.stack.mark_saved();
        if self.options.clear_history_on_save {
            inner.stack.clear()?;
        }
        log::debug!("save complete");
        Ok(())
    }
}
