//! Integration tests for workspace operations against a memory store.
//!
//! Covers the externally observable contract: upload bootstrap, listing,
//! reads that fail loudly, the single-entry mutations, batch edits, and
//! atomicity (a failed batch leaves the stored object untouched).

mod common;

use std::io::Cursor;
use std::sync::Arc;

use zipfs::{EditInstruction, Error, MemoryGateway, ObjectGateway, ObjectKey, Workspace};

use common::{create_archive, seeded_workspace};

// ============================================================================
// Upload bootstrap
// ============================================================================

#[test]
fn test_upload_assigns_fresh_unique_keys() {
    let gateway = Arc::new(MemoryGateway::new());
    let workspace = Workspace::new(gateway.clone());
    let bytes = create_archive(&[("a.txt", b"alpha" as &[u8])]).unwrap();

    let key1 = workspace
        .upload_archive("one.zip", &mut Cursor::new(bytes.clone()))
        .unwrap();
    let key2 = workspace
        .upload_archive("one.zip", &mut Cursor::new(bytes))
        .unwrap();

    assert_ne!(key1, key2);
    assert_eq!(gateway.len(), 2);
    assert!(key1.as_str().ends_with(".zip"));
}

#[test]
fn test_upload_accepts_uppercase_extension() {
    let workspace = Workspace::new(Arc::new(MemoryGateway::new()));
    let bytes = create_archive(&[("a.txt", b"x" as &[u8])]).unwrap();
    workspace
        .upload_archive("PROJECT.ZIP", &mut Cursor::new(bytes))
        .unwrap();
}

#[test]
fn test_upload_rejects_other_extensions() {
    let workspace = Workspace::new(Arc::new(MemoryGateway::new()));
    for filename in ["data.tar", "data.7z", "zipfile", "data.zip.bak"] {
        let err = workspace
            .upload_archive(filename, &mut Cursor::new(Vec::new()))
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidInput { .. }),
            "'{}' must be rejected",
            filename
        );
    }
}

// ============================================================================
// Read path
// ============================================================================

#[test]
fn test_list_entries_prefix_filter() {
    let (workspace, _, key) = seeded_workspace(&[
        ("docs/a.txt", b"a" as &[u8]),
        ("docs/b.txt", b"b"),
        ("src/m.go", b"package m"),
    ]);

    assert_eq!(
        workspace.list_entries(&key, "docs/").unwrap(),
        vec!["docs/a.txt".to_string(), "docs/b.txt".to_string()],
    );
    assert_eq!(workspace.list_entries(&key, "").unwrap().len(), 3);
    assert!(workspace.list_entries(&key, "missing/").unwrap().is_empty());
}

#[test]
fn test_list_preserves_archive_order() {
    let (workspace, _, key) = seeded_workspace(&[
        ("z.txt", b"z" as &[u8]),
        ("a.txt", b"a"),
        ("m.txt", b"m"),
    ]);
    assert_eq!(
        workspace.list_entries(&key, "").unwrap(),
        vec!["z.txt".to_string(), "a.txt".to_string(), "m.txt".to_string()],
    );
}

#[test]
fn test_read_missing_entry_is_not_found() {
    let (workspace, _, key) = seeded_workspace(&[("a.txt", b"alpha" as &[u8])]);
    let err = workspace.read_entry(&key, "absent.txt").unwrap_err();
    match err {
        Error::EntryNotFound { path } => assert_eq!(path, "absent.txt"),
        other => panic!("expected EntryNotFound, got: {:?}", other),
    }
}

#[test]
fn test_read_missing_key_is_object_not_found() {
    let workspace = Workspace::new(Arc::new(MemoryGateway::new()));
    let key = ObjectKey::new("never-uploaded.zip").unwrap();
    let err = workspace.read_entry(&key, "a.txt").unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound { .. }));
}

// ============================================================================
// Single-entry mutations
// ============================================================================

#[test]
fn test_write_entry_overwrites_and_creates() {
    let (workspace, _, key) = seeded_workspace(&[("a.txt", b"old" as &[u8])]);

    workspace.write_entry(&key, "a.txt", "new").unwrap();
    workspace.write_entry(&key, "b/c.txt", "nested").unwrap();

    assert_eq!(workspace.read_entry(&key, "a.txt").unwrap(), "new");
    assert_eq!(workspace.read_entry(&key, "b/c.txt").unwrap(), "nested");
}

#[test]
fn test_append_accumulates_across_calls() {
    let (workspace, _, key) = seeded_workspace(&[("log.txt", b"x" as &[u8])]);
    workspace.append_entry(&key, "log.txt", "b").unwrap();
    workspace.append_entry(&key, "log.txt", "a").unwrap();
    assert_eq!(workspace.read_entry(&key, "log.txt").unwrap(), "xba");
}

#[test]
fn test_delete_entry_removes_it() {
    let (workspace, _, key) = seeded_workspace(&[
        ("a.txt", b"a" as &[u8]),
        ("b.txt", b"b"),
    ]);
    workspace.delete_entry(&key, "a.txt").unwrap();

    assert_eq!(
        workspace.list_entries(&key, "").unwrap(),
        vec!["b.txt".to_string()],
    );
    assert!(matches!(
        workspace.read_entry(&key, "a.txt").unwrap_err(),
        Error::EntryNotFound { .. }
    ));
}

#[test]
fn test_create_entry_is_noop_on_existing_path() {
    let (workspace, _, key) = seeded_workspace(&[("a.txt", b"orig" as &[u8])]);
    workspace.create_entry(&key, "a.txt", "new").unwrap();
    assert_eq!(workspace.read_entry(&key, "a.txt").unwrap(), "orig");
}

#[test]
fn test_create_entry_creates_absent_path() {
    let (workspace, _, key) = seeded_workspace(&[("a.txt", b"a" as &[u8])]);
    workspace.create_entry(&key, "fresh.txt", "content").unwrap();
    assert_eq!(workspace.read_entry(&key, "fresh.txt").unwrap(), "content");
}

// ============================================================================
// Batch edits and atomicity
// ============================================================================

#[test]
fn test_apply_edits_batch() {
    let (workspace, _, key) = seeded_workspace(&[
        ("keep.txt", b"kept" as &[u8]),
        ("old.txt", b"old"),
    ]);

    let batch = EditInstruction::parse_batch(
        r#"[
            {"file": "old.txt", "action": "delete"},
            {"file": "new.txt", "action": "replace", "content": "brand new"},
            {"file": "keep.txt", "action": "append", "content": "+tail"}
        ]"#,
    )
    .unwrap();
    let result = workspace.apply_edits(&key, &batch).unwrap();
    assert_eq!(result.entries_deleted, 1);
    assert_eq!(result.entries_added, 1);
    assert_eq!(result.entries_appended, 1);

    assert_eq!(workspace.read_entry(&key, "keep.txt").unwrap(), "kept+tail");
    assert_eq!(workspace.read_entry(&key, "new.txt").unwrap(), "brand new");
}

#[test]
fn test_unknown_action_leaves_object_unchanged() {
    let (workspace, gateway, key) = seeded_workspace(&[("a.txt", b"alpha" as &[u8])]);
    let before = gateway.object(&key).unwrap();

    // The unknown action fails the batch at parse time, before any fetch.
    let err = EditInstruction::parse_batch(
        r#"[{"file": "a.txt", "action": "rename", "content": "x"}]"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidInstruction { .. }));

    assert_eq!(gateway.object(&key).unwrap(), before);
    assert_eq!(workspace.read_entry(&key, "a.txt").unwrap(), "alpha");
}

#[test]
fn test_conflicting_batch_leaves_object_unchanged() {
    let (workspace, gateway, key) = seeded_workspace(&[("a.txt", b"alpha" as &[u8])]);
    let before = gateway.object(&key).unwrap();

    let batch = vec![
        EditInstruction::delete("a.txt").unwrap(),
        EditInstruction::append("a.txt", "tail").unwrap(),
    ];
    let err = workspace.apply_edits(&key, &batch).unwrap_err();
    assert!(matches!(err, Error::InvalidInstruction { .. }));

    assert_eq!(gateway.object(&key).unwrap(), before);
}

#[test]
fn test_mutation_of_corrupt_object_never_publishes() {
    let gateway = Arc::new(MemoryGateway::new());
    let workspace = Workspace::new(gateway.clone());
    let key = ObjectKey::new("corrupt.zip").unwrap();
    gateway
        .publish(&key, &mut Cursor::new(b"these are not zip bytes".to_vec()))
        .unwrap();
    let before = gateway.object(&key).unwrap();

    let err = workspace.write_entry(&key, "a.txt", "x").unwrap_err();
    assert!(matches!(err, Error::CorruptArchive { .. }));
    assert_eq!(gateway.object(&key).unwrap(), before);
}

// ============================================================================
// Local-file insert and extraction
// ============================================================================

#[test]
fn test_upload_entry_from_path_into_existing_archive() {
    let (workspace, _, key) = seeded_workspace(&[("a.txt", b"a" as &[u8])]);

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("asset.bin");
    std::fs::write(&local, [0u8, 159, 146, 150]).unwrap();

    workspace
        .upload_entry_from_path(&key, "assets/asset.bin", &local)
        .unwrap();

    assert_eq!(
        workspace.list_entries(&key, "assets/").unwrap(),
        vec!["assets/asset.bin".to_string()],
    );
}

#[test]
fn test_upload_entry_from_path_creates_missing_archive() {
    let gateway = Arc::new(MemoryGateway::new());
    let workspace = Workspace::new(gateway.clone());
    let key = ObjectKey::new("fresh.zip").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("first.txt");
    std::fs::write(&local, b"first entry").unwrap();

    workspace
        .upload_entry_from_path(&key, "first.txt", &local)
        .unwrap();

    assert!(gateway.contains(&key));
    assert_eq!(workspace.read_entry(&key, "first.txt").unwrap(), "first entry");
}

#[test]
fn test_extract_to_dir() {
    let (workspace, _, key) = seeded_workspace(&[
        ("readme.txt", b"top" as &[u8]),
        ("src/lib.rs", b"pub fn f() {}"),
    ]);

    let dir = tempfile::tempdir().unwrap();
    let extracted = workspace.extract_to_dir(&key, dir.path()).unwrap();
    assert_eq!(extracted, 2);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("readme.txt")).unwrap(),
        "top"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("src/lib.rs")).unwrap(),
        "pub fn f() {}"
    );
}
