//! Fuzz target for ArchivePath::new with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run archive_path
//!
//! Properties checked on every accepted path:
//! - no `.` or `..` segment survives
//! - no leading, trailing, or doubled separator
//! - parsing the canonical form again yields the same spelling and key

#![no_main]

use libfuzzer_sys::fuzz_target;
use pakedit::ArchivePath;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(path) = ArchivePath::new(input) else {
        return;
    };
    let canonical = path.as_str();

    assert!(!canonical.is_empty());
    assert!(!canonical.starts_with('/') && !canonical.ends_with('/'));
    assert!(!canonical.contains("//") && !canonical.contains('\\'));
    assert!(
        canonical.split('/').all(|s| s != "." && s != ".."),
        "traversal segment accepted: {:?}",
        canonical
    );
    assert!(!canonical.contains('\0'));

    let reparsed = ArchivePath::new(canonical).expect("canonical path must parse");
    assert_eq!(reparsed.as_str(), canonical);
    assert_eq!(reparsed.key(), path.key());

    if let Some(parent) = path.parent() {
        assert!(path.is_within(&parent));
        assert_eq!(path.rebase(&parent, None).as_ref().map(|p| p.as_str()), Some(path.file_name()));
    }
});
