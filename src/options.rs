//! Container configuration.

use std::sync::Arc;

use crate::encoding::{PathEncoding, Utf8Encoding};
use crate::header::HeaderMetadata;

/// Default number of top-level history slots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Options for creating a [`Container`](crate::Container).
///
/// # Example
///
/// ```rust
/// use pakedit::{ContainerOptions, encoding::AsciiEncoding};
///
/// let options = ContainerOptions::new()
///     .history_limit(Some(500))
///     .combine_commands(false)
///     .path_encoding(AsciiEncoding);
/// assert_eq!(options.history_limit_value(), Some(500));
/// ```
#[derive(Clone)]
pub struct ContainerOptions {
    pub(crate) history_limit: Option<usize>,
    pub(crate) combine_commands: bool,
    pub(crate) clear_history_on_save: bool,
    pub(crate) encoding: Arc<dyn PathEncoding>,
    pub(crate) header: HeaderMetadata,
}

impl std::fmt::Debug for ContainerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("history_limit", &self.history_limit)
            .field("combine_commands", &self.combine_commands)
            .field("clear_history_on_save", &self.clear_history_on_save)
            .field("encoding", &self.encoding.name())
            .field("header", &self.header)
            .finish()
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            combine_commands: true,
            clear_history_on_save: true,
            encoding: Arc::new(Utf8Encoding),
            header: HeaderMetadata::default(),
        }
    }
}

impl ContainerOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of undoable steps (`None` for unlimited).
    ///
    /// A limit of zero is treated as one.
    pub fn history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit.map(|n| n.max(1));
        self
    }

    /// Enables or disables merging of consecutive combinable commands.
    pub fn combine_commands(mut self, enabled: bool) -> Self {
        self.combine_commands = enabled;
        self
    }

    /// Sets whether a successful save discards the undo history.
    pub fn clear_history_on_save(mut self, enabled: bool) -> Self {
        self.clear_history_on_save = enabled;
        self
    }

    /// Sets the predicate that decides which paths the target encoding can
    /// store.
    pub fn path_encoding(mut self, encoding: impl PathEncoding + 'static) -> Self {
        self.encoding = Arc::new(encoding);
        self
    }

    /// Sets the initial header metadata.
    pub fn header(mut self, header: HeaderMetadata) -> Self {
        self.header = header;
        self
    }

    /// Returns the configured history limit.
    pub fn history_limit_value(&self) -> Option<usize> {
        self.history_limit
    }
}
