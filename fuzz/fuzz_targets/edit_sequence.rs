//! Fuzz target driving a container with an arbitrary sequence of edits.
//!
//! Run with: cargo +nightly fuzz run edit_sequence
//!
//! Each input byte pair selects an edit and its arguments. Edits may fail;
//! whatever happens, undoing everything must restore the starting table and
//! redoing everything must reproduce the final one.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pakedit::{Container, ContainerOptions};

const NAMES: &[&str] = &["a", "B", "d/a", "D/e/b", "f/a", "g/b", "h/A"];
const DIRS: &[&str] = &["d", "d/e", "f", "G", "h", ""];

fn rows(c: &Container<u16>) -> Vec<(String, u16, bool)> {
    c.snapshot()
        .table
        .iter()
        .map(|e| (e.path.as_str().to_string(), e.payload, e.flags.encrypted))
        .collect()
}

fuzz_target!(|data: &[u8]| {
    let c: Container<u16> = Container::with_options(ContainerOptions::new().history_limit(None));
    for (i, name) in NAMES.iter().enumerate().step_by(2) {
        let _ = c.add_file(name, i as u16, ());
    }
    let _ = c.clear_history();
    let before = rows(&c);

    for (step, pair) in data.chunks(2).enumerate() {
        let op = pair[0];
        let arg = pair.get(1).copied().unwrap_or(0) as usize;
        let name = NAMES[arg % NAMES.len()];
        let dir = DIRS[arg % DIRS.len()];
        let other = DIRS[(arg / DIRS.len()) % DIRS.len()];
        let _ = match op % 9 {
            0 => c.add_file(name, step as u16, ()),
            1 => c.remove_file(name, ()),
            2 => c.remove_folder(dir, ()),
            3 => c.rename(dir, other, ()),
            4 => c.move_path(name, other, ()),
            5 => c.merge_folders(dir, other, ()),
            6 => c.encrypt_files([name], ()),
            7 => c.decrypt_files([name], ()),
            _ => c.remove_files_matching("*a", ()).map(|_| ()),
        };
    }
    let after = rows(&c);

    while c.undo().unwrap_or(false) {}
    assert_eq!(before, rows(&c));
    while c.redo().unwrap_or(false) {}
    assert_eq!(after, rows(&c));
});
