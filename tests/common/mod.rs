//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use pakedit::{ArchivePath, Container, ContainerOptions, EditNotice, EditObserver, EntryFlags};

/// Payload type used throughout the tests. `Arc` lets tests check that undo
/// restores the very same allocation, not just an equal value.
pub type Payload = Arc<String>;

/// Row of a flattened table: (display path, payload, flags).
pub type Row = (String, Payload, EntryFlags);

pub fn payload(content: &str) -> Payload {
    Arc::new(content.to_string())
}

pub fn path(s: &str) -> ArchivePath {
    ArchivePath::new(s).unwrap()
}

/// Creates a container holding `files` with an empty, clean history.
pub fn container_with(files: &[(&str, &str)]) -> Container<Payload> {
    container_with_options(files, ContainerOptions::default())
}

pub fn container_with_options(
    files: &[(&str, &str)],
    options: ContainerOptions,
) -> Container<Payload> {
    let container = Container::with_options(options);
    for (name, content) in files {
        container.add_file(name, payload(content), ()).unwrap();
    }
    container.clear_history().unwrap();
    container
}

/// Flattens the container's table into comparable rows.
pub fn rows(container: &Container<Payload>) -> Vec<Row> {
    container
        .snapshot()
        .table
        .iter()
        .map(|e| (e.path.as_str().to_string(), e.payload.clone(), e.flags))
        .collect()
}

/// Asserts both tables hold the same rows and the same payload allocations.
pub fn assert_identical(before: &[Row], after: &[Row]) {
    assert_eq!(before, after);
    for (a, b) in before.iter().zip(after) {
        assert!(Arc::ptr_eq(&a.1, &b.1), "payload of {} was replaced", a.0);
    }
}

/// Records every notification it receives.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<(EditNotice, bool)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(EditNotice, bool)> {
        self.calls.lock().unwrap().clone()
    }

    /// The `executed` flag of each call, in order.
    pub fn flags(&self) -> Vec<bool> {
        self.calls().into_iter().map(|(_, executed)| executed).collect()
    }
}

impl EditObserver for Recorder {
    fn on_edit(&mut self, notice: &EditNotice, executed: bool) {
        self.calls.lock().unwrap().push((notice.clone(), executed));
    }
}
