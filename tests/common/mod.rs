//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use zipfs::{Archive, MemoryGateway, ObjectKey, Workspace, Writer};

/// Creates an in-memory archive from (path, data) tuples.
pub fn create_archive(entries: &[(&str, &[u8])]) -> zipfs::Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = Writer::new(&mut cursor);
    for (path, data) in entries {
        writer.add_entry(path, data)?;
    }
    let _ = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Reads an archive and returns (path, content) pairs for file entries,
/// in archive order.
pub fn archive_contents(bytes: &[u8]) -> zipfs::Result<Vec<(String, Vec<u8>)>> {
    let mut archive = Archive::open(Cursor::new(bytes.to_vec()))?;
    let mut contents = Vec::new();
    for index in 0..archive.len() {
        let path = archive.entries()[index].path.clone();
        if archive.entries()[index].is_directory {
            continue;
        }
        let data = archive.read_to_vec_by_index(index)?;
        contents.push((path, data));
    }
    Ok(contents)
}

/// Returns entry paths in archive order.
pub fn archive_paths(bytes: &[u8]) -> Vec<String> {
    let archive = Archive::open(Cursor::new(bytes.to_vec())).unwrap();
    archive.entries().iter().map(|e| e.path.clone()).collect()
}

/// Builds a memory-backed workspace seeded with one archive object.
///
/// Returns the workspace, the gateway (for asserting on stored bytes) and
/// the fresh key of the seeded archive.
pub fn seeded_workspace(
    entries: &[(&str, &[u8])],
) -> (Workspace, Arc<MemoryGateway>, ObjectKey) {
    let gateway = Arc::new(MemoryGateway::new());
    let workspace = Workspace::new(gateway.clone());

    let bytes = create_archive(entries).unwrap();
    let mut upload = Cursor::new(bytes);
    let key = workspace.upload_archive("seed.zip", &mut upload).unwrap();
    (workspace, gateway, key)
}
