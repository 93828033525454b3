//! Payload encryption seam.
//!
//! Encrypting or decrypting an entry is two things: flipping its `encrypted`
//! flag and transforming its payload. The flag belongs to the editing core;
//! the transform belongs to whoever knows the container's crypto scheme and
//! is supplied through [`EntryCipher`].

use crate::{ArchivePath, Result};

/// Transforms entry payloads between plain and encrypted form.
pub trait EntryCipher<P>: Send + Sync {
    /// Returns the encrypted form of `payload`.
    fn encrypt(&self, path: &ArchivePath, payload: &P) -> Result<P>;

    /// Returns the plain form of `payload`.
    fn decrypt(&self, path: &ArchivePath, payload: &P) -> Result<P>;
}

/// Leaves payloads untouched and only flips the flag.
///
/// Suitable when encryption is applied lazily by the persistence layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagOnly;

impl<P: Clone> EntryCipher<P> for FlagOnly {
    fn encrypt(&self, _path: &ArchivePath, payload: &P) -> Result<P> {
        Ok(payload.clone())
    }

    fn decrypt(&self, _path: &ArchivePath, payload: &P) -> Result<P> {
        Ok(payload.clone())
    }
}
