//! Encrypting and decrypting entries.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{Command, files_label};
use crate::cipher::EntryCipher;
use crate::observer::EditNotice;
use crate::state::ArchiveState;
use crate::{ArchivePath, EntryFlags, Error, Result};

/// Flips the `encrypted` flag on a set of files and transforms their
/// payloads through an [`EntryCipher`].
///
/// Files already in the requested state are left alone. Every transform is
/// computed before the first entry changes, so a cipher failure leaves the
/// table untouched. The container-level encryption flag is recomputed
/// afterwards and restored on undo.
pub struct EncryptEntries<P> {
    paths: Vec<ArchivePath>,
    encrypt: bool,
    cipher: Arc<dyn EntryCipher<P>>,
    saved: Vec<(ArchivePath, P, EntryFlags)>,
    header_flag: bool,
}

impl<P> EncryptEntries<P> {
    /// Creates a command encrypting `paths`.
    pub fn encrypt(paths: Vec<ArchivePath>, cipher: Arc<dyn EntryCipher<P>>) -> Self {
        Self::with_direction(paths, true, cipher)
    }

    /// Creates a command decrypting `paths`.
    pub fn decrypt(paths: Vec<ArchivePath>, cipher: Arc<dyn EntryCipher<P>>) -> Self {
        Self::with_direction(paths, false, cipher)
    }

    fn with_direction(
        paths: Vec<ArchivePath>,
        encrypt: bool,
        cipher: Arc<dyn EntryCipher<P>>,
    ) -> Self {
        Self {
            paths,
            encrypt,
            cipher,
            saved: Vec::new(),
            header_flag: false,
        }
    }

    /// Number of files the last execute changed.
    pub fn changed(&self) -> usize {
        self.saved.len()
    }

    fn transforms(&self, state: &ArchiveState<P>) -> Result<Vec<(ArchivePath, P)>> {
        let targets: BTreeSet<&ArchivePath> = self.paths.iter().collect();
        let mut out = Vec::with_capacity(targets.len());
        for path in targets {
            let entry = state
                .table
                .get(path)
                .ok_or_else(|| Error::not_found(path.as_str()))?;
            if entry.flags.encrypted == self.encrypt {
                continue;
            }
            let payload = if self.encrypt {
                self.cipher.encrypt(&entry.path, &entry.payload)?
            } else {
                self.cipher.decrypt(&entry.path, &entry.payload)?
            };
            out.push((entry.path.clone(), payload));
        }
        Ok(out)
    }
}

impl<P: Send + 'static> Command<P> for EncryptEntries<P> {
    fn execute(&mut self, state: &mut ArchiveState<P>) -> Result<()> {
        let transforms = self.transforms(state)?;
        self.saved.clear();
        self.header_flag = state.header.encrypted;
        for (path, payload) in transforms {
            if let Some(entry) = state.table.get_mut(&path) {
                let previous = std::mem::replace(&mut entry.payload, payload);
                self.saved.push((path, previous, entry.flags));
                entry.flags.encrypted = self.encrypt;
            }
        }
        state.refresh_encrypted();
        Ok(())
    }

    fn undo(&mut self, state: &mut ArchiveState<P>) {
        for (path, payload, flags) in self.saved.drain(..).rev() {
            match state.table.get_mut(&path) {
                Some(entry) => {
                    entry.payload = payload;
                    entry.flags = flags;
                }
                None => {
                    log::error!("undo encrypt: '{}' is missing from the table", path);
                    debug_assert!(false, "encrypted entry vanished: {}", path);
                }
            }
        }
        state.header.encrypted = self.header_flag;
    }

    fn description(&self) -> String {
        let verb = if self.encrypt { "Encrypt" } else { "Decrypt" };
        match self.paths.as_slice() {
            [path] => format!("{} '{}'", verb, path),
            paths => format!("{} {}", verb, files_label(paths.len())),
        }
    }

    fn notice(&self) -> Option<EditNotice> {
        Some(EditNotice::for_paths(self.paths.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
