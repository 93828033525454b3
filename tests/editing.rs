//! Integration tests for single edits and their undo/redo behavior.

mod common;

use common::*;
use pakedit::{Container, ContainerOptions, Error, SourceFile, progress::NoProgress};

#[test]
fn test_overwrite_undo_restores_original() {
    let container = container_with(&[("data/a.txt", "E1")]);
    let before = rows(&container);

    container.add_file("data/a.txt", payload("E2"), ()).unwrap();
    assert_eq!(
        container.entry("data/a.txt").unwrap().payload.as_str(),
        "E2"
    );

    assert!(container.undo().unwrap());
    assert_identical(&before, &rows(&container));
}

#[test]
fn test_independent_add_leaves_other_entries() {
    let container = container_with(&[("data/a.txt", "E1")]);
    let before = rows(&container);

    container.add_file("data/b.txt", payload("E2"), ()).unwrap();
    assert_eq!(container.len(), 2);

    container.undo().unwrap();
    assert!(!container.contains_file("data/b.txt"));
    assert_identical(&before, &rows(&container));
}

#[test]
fn test_merge_scenario() {
    let container = container_with(&[("data/old/x.txt", "Ex")]);
    let before = rows(&container);

    container.merge_folders("data/old", "data", ()).unwrap();
    assert_eq!(container.paths(), vec![path("data/x.txt")]);
    assert!(!container.contains_directory("data/old"));

    container.undo().unwrap();
    assert_identical(&before, &rows(&container));
    assert!(container.contains_directory("data/old"));
    assert!(!container.contains_file("data/x.txt"));
}

#[test]
fn test_merge_with_collisions() {
    let container = container_with(&[
        ("src/a", "new-a"),
        ("src/sub/b", "new-b"),
        ("dst/a", "old-a"),
        ("dst/c", "old-c"),
    ]);
    let before = rows(&container);

    container.merge_folders("src", "dst", ()).unwrap();
    assert_eq!(
        container.paths(),
        vec![path("dst/a"), path("dst/c"), path("dst/sub/b")]
    );
    assert_eq!(container.entry("dst/a").unwrap().payload.as_str(), "new-a");
    assert!(!container.contains_directory("src"));
    assert_eq!(container.history_len(), 1);

    container.undo().unwrap();
    assert_identical(&before, &rows(&container));

    container.redo().unwrap();
    assert_eq!(container.entry("dst/a").unwrap().payload.as_str(), "new-a");
}

#[test]
fn test_merge_onto_vacated_folder() {
    let container = container_with(&[("d/o/x/z", "1"), ("d/o/o/x", "2")]);
    let before = rows(&container);

    container.merge_folders("d/o", "d", ()).unwrap();
    assert_eq!(container.paths(), vec![path("d/o/x"), path("d/x/z")]);
    assert_eq!(container.entry("d/o/x").unwrap().payload.as_str(), "2");

    container.undo().unwrap();
    assert_identical(&before, &rows(&container));
    container.redo().unwrap();
    assert_eq!(container.entry("d/x/z").unwrap().payload.as_str(), "1");
}

#[test]
fn test_merge_into_root_keeps_folder_of_same_name() {
    let container = container_with(&[("d/x/a", "1"), ("d/d/x", "2")]);
    let before = rows(&container);

    container.merge_folders("d", "", ()).unwrap();
    assert_eq!(container.paths(), vec![path("d/x"), path("x/a")]);
    assert_eq!(container.history_len(), 1);

    container.undo().unwrap();
    assert_identical(&before, &rows(&container));
}

#[test]
fn test_interleaved_moves_and_merges() {
    let container = container_with(&[("a/x/y", "1"), ("a/a/x", "2"), ("b/q", "3")]);
    let before = rows(&container);

    container.merge_folders("a", "", ()).unwrap();
    assert_eq!(container.paths(), vec![path("a/x"), path("b/q"), path("x/y")]);
    container.rename("x", "b/x", ()).unwrap();
    container.move_path("a", "b", ()).unwrap();
    assert_eq!(
        container.paths(),
        vec![path("b/a/x"), path("b/q"), path("b/x/y")]
    );
    container.merge_folders("b", "", ()).unwrap();
    assert_eq!(container.paths(), vec![path("a/x"), path("q"), path("x/y")]);

    while container.undo().unwrap() {}
    assert_identical(&before, &rows(&container));
    while container.redo().unwrap() {}
    assert_eq!(container.paths(), vec![path("a/x"), path("q"), path("x/y")]);
}

#[test]
fn test_self_rename_is_noop() {
    let container = container_with(&[("dir/file.txt", "x")]);
    let before = rows(&container);
    let recorder = Recorder::new();

    container
        .rename("dir/file.txt", "dir/file.txt", recorder.clone())
        .unwrap();
    container.rename("dir", "dir", ()).unwrap();

    assert_identical(&before, &rows(&container));
    assert_eq!(container.history_len(), 0);
    assert!(recorder.calls().is_empty());
}

#[test]
fn test_move_into_own_subfolder_rejected() {
    let container = container_with(&[("data/a", "1"), ("data/sub/b", "2")]);
    let before = rows(&container);

    let err = container.rename("data", "data/sub", ()).unwrap_err();
    assert!(matches!(err, Error::SubfolderConflict { .. }));
    assert!(err.is_conflict());

    let err = container.rename("data", "data/new/deeper", ()).unwrap_err();
    assert!(matches!(err, Error::SubfolderConflict { .. }));

    assert_identical(&before, &rows(&container));
    assert_eq!(container.history_len(), 0);
}

#[test]
fn test_prefix_is_not_containment() {
    let container = container_with(&[("data/a", "1"), ("data2/b", "2")]);
    container.rename("data2", "data/data2", ()).unwrap();
    assert!(container.contains_file("data/data2/b"));
}

#[test]
fn test_rename_collisions() {
    let container = container_with(&[("a.txt", "1"), ("b.txt", "2"), ("dir/x", "3")]);

    assert!(matches!(
        container.rename("a.txt", "B.TXT", ()).unwrap_err(),
        Error::AlreadyExists { .. }
    ));
    assert!(matches!(
        container.rename("a.txt", "dir", ()).unwrap_err(),
        Error::InvalidPath { .. }
    ));
    assert!(matches!(
        container.rename("missing", "other", ()).unwrap_err(),
        Error::PathNotFound { .. }
    ));
    assert_eq!(container.history_len(), 0);
}

#[test]
fn test_history_truncation() {
    let container = container_with(&[]);
    container.add_file("a", payload("1"), ()).unwrap();
    container.add_file("b", payload("2"), ()).unwrap();
    container.undo().unwrap();
    assert!(container.can_redo());

    container.add_file("c", payload("3"), ()).unwrap();
    assert!(!container.can_redo());
    assert!(!container.redo().unwrap());
    assert_eq!(container.paths(), vec![path("a"), path("c")]);
}

#[test]
fn test_observer_fires_on_execute_and_undo() {
    let container = container_with(&[]);
    let recorder = Recorder::new();

    container
        .add_file("docs/new/readme.txt", payload("hi"), recorder.clone())
        .unwrap();
    container.undo().unwrap();
    container.redo().unwrap();

    assert_eq!(recorder.flags(), vec![true, false, true]);
    let (notice, _) = &recorder.calls()[0];
    assert_eq!(notice.paths, vec![path("docs/new/readme.txt")]);
    assert_eq!(notice.new_folders, vec![path("docs"), path("docs/new")]);
}

#[test]
fn test_observer_hears_same_paths_on_undo() {
    let container = container_with(&[("d/a", "1"), ("d/e/b", "2"), ("keep", "3")]);
    let recorder = Recorder::new();

    container.remove_folder("d", recorder.clone()).unwrap();
    container.undo().unwrap();

    let calls = recorder.calls();
    assert_eq!(calls[0].0.paths, vec![path("d/a"), path("d/e/b")]);
    assert_eq!(calls[0].0, calls[1].0);
    assert_eq!(recorder.flags(), vec![true, false]);
}

#[test]
fn test_observer_not_called_on_failure() {
    let container = container_with(&[]);
    let recorder = Recorder::new();
    assert!(container.remove_file("missing", recorder.clone()).is_err());
    assert!(recorder.calls().is_empty());
}

#[test]
fn test_add_files_batch() {
    let container = container_with(&[("import/a.txt", "old")]);
    let before = rows(&container);
    let recorder = Recorder::new();

    let files = vec![
        SourceFile::new("/src/a.txt", "a.txt", payload("new")),
        SourceFile::new("/src/x/y.txt", "x\\y.txt", payload("y")),
    ];
    container
        .add_files("import", files, recorder.clone(), NoProgress)
        .unwrap();

    assert_eq!(container.len(), 2);
    assert!(container.contains_file("import/x/y.txt"));
    assert!(container.entry("import/a.txt").unwrap().flags.conflict_origin);
    let (notice, _) = &recorder.calls()[0];
    assert_eq!(notice.sources, vec!["/src/a.txt", "/src/x/y.txt"]);

    container.undo().unwrap();
    assert_identical(&before, &rows(&container));
}

#[test]
fn test_empty_batches_are_noops() {
    let container = container_with(&[("a", "1")]);
    container.add_files("", Vec::new(), (), NoProgress).unwrap();
    container.remove_files(Vec::<&str>::new(), ()).unwrap();
    assert_eq!(container.remove_files_matching("*.none", ()).unwrap(), 0);
    assert_eq!(container.history_len(), 0);
}

#[test]
fn test_remove_folder_and_undo() {
    let container = container_with(&[("d/a", "1"), ("d/e/b", "2"), ("keep", "3")]);
    let before = rows(&container);

    container.remove_folder("D", ()).unwrap();
    assert_eq!(container.paths(), vec![path("keep")]);
    assert!(matches!(
        container.remove_folder("d", ()).unwrap_err(),
        Error::PathNotFound { .. }
    ));

    container.undo().unwrap();
    assert_identical(&before, &rows(&container));
}

#[test]
fn test_remove_files_matching() {
    let container = container_with(&[
        ("a.tmp", "1"),
        ("cache/b.TMP", "2"),
        ("cache/c.txt", "3"),
        ("d.txt", "4"),
    ]);
    assert_eq!(container.remove_files_matching("*.tmp", ()).unwrap(), 2);
    assert_eq!(container.len(), 2);
    assert_eq!(container.remove_files_matching("cache/*", ()).unwrap(), 1);
    assert_eq!(container.paths(), vec![path("d.txt")]);

    assert!(matches!(
        container.remove_files_matching("[", ()).unwrap_err(),
        Error::InvalidPattern { .. }
    ));

    container.undo().unwrap();
    container.undo().unwrap();
    assert_eq!(container.len(), 4);
}

#[cfg(feature = "regex")]
#[test]
fn test_remove_files_regex() {
    let container = container_with(&[("log/1.log", "1"), ("log/2.LOG", "2"), ("keep.txt", "3")]);
    assert_eq!(container.remove_files_regex(r"\.log$", ()).unwrap(), 2);
    assert_eq!(container.paths(), vec![path("keep.txt")]);
}

#[test]
fn test_replace_file() {
    let container = container_with(&[("a", "old")]);
    let before = rows(&container);
    container.replace_file("A", payload("new"), ()).unwrap();
    assert_eq!(container.entry("a").unwrap().payload.as_str(), "new");
    container.undo().unwrap();
    assert_identical(&before, &rows(&container));

    assert!(matches!(
        container.replace_file("missing", payload(""), ()).unwrap_err(),
        Error::PathNotFound { .. }
    ));
}

#[test]
fn test_descriptions() {
    let container = container_with(&[("a", "1"), ("dir/b", "2")]);
    container.rename("a", "c", ()).unwrap();
    assert_eq!(
        container.undo_description().as_deref(),
        Some("Rename 'a' to 'c'")
    );
    container.remove_folder("dir", ()).unwrap();
    assert_eq!(
        container.undo_description().as_deref(),
        Some("Delete folder 'dir'")
    );
    container.undo().unwrap();
    assert_eq!(
        container.redo_description().as_deref(),
        Some("Delete folder 'dir'")
    );
}

#[test]
fn test_history_limit_option() {
    let container = container_with_options(&[], ContainerOptions::new().history_limit(Some(3)));
    for name in ["a", "b", "c", "d", "e"] {
        container.add_file(name, payload(name), ()).unwrap();
    }
    assert_eq!(container.history_len(), 3);
    while container.undo().unwrap() {}
    assert_eq!(container.paths(), vec![path("a"), path("b")]);
    assert!(container.is_dirty());
}

#[test]
fn test_unlimited_history_keeps_everything() {
    let container: Container<u32> =
        Container::with_options(ContainerOptions::new().history_limit(None));
    for i in 0..250 {
        container.add_file(&format!("f{}", i), i, ()).unwrap();
    }
    assert_eq!(container.history_len(), 250);
}

#[test]
fn test_encrypt_and_undo() {
    let container = container_with(&[("a", "1"), ("b", "2")]);
    let before = rows(&container);

    container.encrypt_files(["a", "B"], ()).unwrap();
    assert!(container.entry("a").unwrap().is_encrypted());
    assert!(container.header().encrypted);

    container.decrypt_files(["a"], ()).unwrap();
    assert!(!container.entry("a").unwrap().is_encrypted());
    assert!(container.entry("b").unwrap().is_encrypted());

    container.undo().unwrap();
    container.undo().unwrap();
    assert_identical(&before, &rows(&container));
    assert!(!container.header().encrypted);
}

#[test]
fn test_header_changes_share_one_step() {
    let container = container_with(&[]);
    let original = container.header().version;

    container.change_version(2, 0).unwrap();
    container.change_version(3, 1).unwrap();
    assert_eq!(container.history_len(), 1);

    container.undo().unwrap();
    assert_eq!(container.header().version, original);
}
