//! Workspace operations over archive objects.

use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use crate::edit::{EditAction, EditInstruction, RebuildResult, Rebuilder};
use crate::key::ARCHIVE_EXTENSION;
use crate::read::Archive;
use crate::store::ObjectGateway;
use crate::write::Writer;
use crate::{EntryPath, Error, ObjectKey, Result};

use super::ScratchCopy;

/// Entry-level operations over archive objects in a store.
///
/// A `Workspace` holds an explicitly constructed gateway handle and is the
/// single place where fetch, rebuild and publish are sequenced. Read
/// operations never touch the rebuilder; every mutating operation is one
/// rebuild of the whole archive, published only after the rebuild
/// succeeds.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use std::sync::Arc;
/// use zipfs::{MemoryGateway, Workspace, Writer};
///
/// # fn main() -> zipfs::Result<()> {
/// let workspace = Workspace::new(Arc::new(MemoryGateway::new()));
///
/// // Bootstrap a new archive object from uploaded bytes.
/// let mut upload = Cursor::new(Vec::new());
/// let mut writer = Writer::new(&mut upload);
/// writer.add_entry("readme.txt", b"hello")?;
/// let _ = writer.finish()?;
/// upload.set_position(0);
/// let key = workspace.upload_archive("project.zip", &mut upload)?;
///
/// workspace.write_entry(&key, "src/main.go", "package main\n")?;
/// assert_eq!(workspace.read_entry(&key, "readme.txt")?, "hello");
/// assert_eq!(
///     workspace.list_entries(&key, "src/")?,
///     vec!["src/main.go".to_string()],
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Workspace {
    gateway: Arc<dyn ObjectGateway>,
}

impl Workspace {
    /// Creates a workspace over the given gateway handle.
    pub fn new(gateway: Arc<dyn ObjectGateway>) -> Self {
        Self { gateway }
    }

    /// Stores an uploaded archive under a fresh, globally-unique key.
    ///
    /// The filename must carry the `.zip` extension and the bytes must
    /// parse as a valid container; both are checked before anything is
    /// published. The fresh key guarantees no merge with any pre-existing
    /// object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a wrong extension and
    /// [`Error::CorruptArchive`] if the upload is not a ZIP container.
    pub fn upload_archive(&self, filename: &str, source: &mut dyn Read) -> Result<ObjectKey> {
        let wanted = format!(".{}", ARCHIVE_EXTENSION);
        if !filename.to_ascii_lowercase().ends_with(&wanted) {
            return Err(Error::InvalidInput {
                reason: format!("'{}': only {} uploads are supported", filename, wanted),
            });
        }

        let mut scratch = ScratchCopy::new()?;
        io::copy(source, scratch.file_mut())?;
        Archive::open(scratch.file_mut())?;

        let key = ObjectKey::generate();
        let bytes = scratch.publish(&*self.gateway, &key)?;
        log::debug!("bootstrapped archive '{}' ({} bytes)", key, bytes);
        Ok(key)
    }

    /// Lists entry paths, optionally filtered by a plain string prefix.
    ///
    /// Order matches the archive's internal entry order; an empty prefix
    /// returns every entry.
    pub fn list_entries(&self, key: &ObjectKey, prefix: &str) -> Result<Vec<String>> {
        let mut scratch = ScratchCopy::fetch(&*self.gateway, key)?;
        let archive = Archive::open(scratch.file_mut())?;
        Ok(archive
            .entries()
            .iter()
            .filter(|e| e.path.starts_with(prefix))
            .map(|e| e.path.clone())
            .collect())
    }

    /// Reads one entry's content as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if the path is absent - a real,
    /// matchable error, never a placeholder string.
    pub fn read_entry(&self, key: &ObjectKey, path: &str) -> Result<String> {
        let mut scratch = ScratchCopy::fetch(&*self.gateway, key)?;
        let mut archive = Archive::open(scratch.file_mut())?;
        archive.read_to_string(path)
    }

    /// Overwrites the entry at `path` with `content`, creating it if
    /// absent.
    pub fn write_entry(&self, key: &ObjectKey, path: &str, content: &str) -> Result<()> {
        self.apply_one(key, EditInstruction::replace(path, content)?)
    }

    /// Appends `content` to the entry at `path` (creating it if absent).
    pub fn append_entry(&self, key: &ObjectKey, path: &str, content: &str) -> Result<()> {
        self.apply_one(key, EditInstruction::append(path, content)?)
    }

    /// Removes the entry at `path`.
    ///
    /// Deleting an absent path is not an error: the rebuilt archive simply
    /// carries every other entry, matching the batch delete semantics.
    pub fn delete_entry(&self, key: &ObjectKey, path: &str) -> Result<()> {
        self.apply_one(key, EditInstruction::delete(path)?)
    }

    /// Creates the entry at `path` only if it does not already exist.
    ///
    /// If the path is present the operation is a content no-op: the
    /// archive is rewritten at the framing level but the entry keeps its
    /// original content untouched.
    pub fn create_entry(&self, key: &ObjectKey, path: &str, content: &str) -> Result<()> {
        let instruction = EditInstruction::replace(path, content)?;

        let mut src = ScratchCopy::fetch(&*self.gateway, key)?;
        let archive = Archive::open(src.file_mut())?;
        let batch = if archive.contains(path) {
            Vec::new()
        } else {
            vec![instruction]
        };

        let mut out = ScratchCopy::new()?;
        let _ = Rebuilder::new(archive).apply(&batch, out.file_mut())?;
        out.publish(&*self.gateway, key)?;
        Ok(())
    }

    /// Applies a batch of edit instructions in one rebuild.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstruction`] for an empty batch or a batch
    /// that targets one path with both delete and replace/append; the
    /// whole batch fails before any publish, leaving the remote object
    /// unchanged.
    pub fn apply_edits(&self, key: &ObjectKey, batch: &[EditInstruction]) -> Result<RebuildResult> {
        if batch.is_empty() {
            return Err(Error::InvalidInstruction {
                reason: "empty instruction batch".into(),
            });
        }
        self.rebuild_and_publish(key, batch)
    }

    /// Inserts a local file as an entry, creating the archive object if
    /// the key does not exist yet.
    ///
    /// Content is taken as raw bytes - no UTF-8 requirement - so binary
    /// assets round-trip intact.
    pub fn upload_entry_from_path(
        &self,
        key: &ObjectKey,
        path: &str,
        local: &Path,
    ) -> Result<()> {
        let entry_path = EntryPath::new(path)?;
        let data = std::fs::read(local)?;

        match ScratchCopy::fetch(&*self.gateway, key) {
            Ok(mut src) => {
                let archive = Archive::open(src.file_mut())?;
                let batch = [EditInstruction {
                    path: entry_path,
                    action: EditAction::Replace(data),
                }];
                let mut out = ScratchCopy::new()?;
                let _ = Rebuilder::new(archive).apply(&batch, out.file_mut())?;
                out.publish(&*self.gateway, key)?;
            }
            Err(Error::ObjectNotFound { .. }) => {
                // First entry of a brand-new archive object under this key.
                let mut out = ScratchCopy::new()?;
                let mut writer = Writer::new(out.file_mut());
                writer.add_entry(entry_path.as_str(), &data)?;
                let _ = writer.finish()?;
                out.publish(&*self.gateway, key)?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Materializes every entry under a local directory.
    ///
    /// Stored paths are validated before anything touches the filesystem,
    /// so a hostile container cannot write outside `dest`. Returns the
    /// number of file entries written.
    pub fn extract_to_dir(&self, key: &ObjectKey, dest: &Path) -> Result<usize> {
        let mut scratch = ScratchCopy::fetch(&*self.gateway, key)?;
        let mut archive = Archive::open(scratch.file_mut())?;
        std::fs::create_dir_all(dest)?;

        let mut extracted = 0;
        for index in 0..archive.len() {
            let entry = archive.entries()[index].clone();
            let stored = entry.path.trim_end_matches('/');
            if stored.is_empty() {
                continue;
            }
            let safe = EntryPath::new(stored).map_err(|_| {
                Error::InvalidEntryPath(format!("unsafe stored path '{}'", entry.path))
            })?;

            let target = dest.join(safe.as_str());
            if entry.is_directory {
                std::fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let data = archive.read_to_vec_by_index(index)?;
            std::fs::write(&target, data)?;
            extracted += 1;
        }
        Ok(extracted)
    }

    fn apply_one(&self, key: &ObjectKey, instruction: EditInstruction) -> Result<()> {
        self.rebuild_and_publish(key, std::slice::from_ref(&instruction))?;
        Ok(())
    }

    /// Fetch, rebuild, publish - publish strictly last.
    fn rebuild_and_publish(
        &self,
        key: &ObjectKey,
        batch: &[EditInstruction],
    ) -> Result<RebuildResult> {
        let mut src = ScratchCopy::fetch(&*self.gateway, key)?;
        let archive = Archive::open(src.file_mut())?;

        let mut out = ScratchCopy::new()?;
        let result = Rebuilder::new(archive).apply(batch, out.file_mut())?;
        out.publish(&*self.gateway, key)?;
        log::debug!(
            "rebuilt '{}': {} entries ({} kept, {} deleted)",
            key,
            result.total_entries(),
            result.entries_kept,
            result.entries_deleted,
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGateway;
    use std::io::Cursor;

    fn seeded() -> (Workspace, Arc<MemoryGateway>, ObjectKey) {
        let gateway = Arc::new(MemoryGateway::new());
        let workspace = Workspace::new(gateway.clone());

        let mut upload = Cursor::new(Vec::new());
        let mut writer = Writer::new(&mut upload);
        writer.add_entry("a.txt", b"alpha").unwrap();
        writer.add_entry("docs/b.txt", b"beta").unwrap();
        let _ = writer.finish().unwrap();
        upload.set_position(0);
        let key = workspace.upload_archive("seed.zip", &mut upload).unwrap();
        (workspace, gateway, key)
    }

    #[test]
    fn test_upload_rejects_wrong_extension() {
        let workspace = Workspace::new(Arc::new(MemoryGateway::new()));
        let err = workspace
            .upload_archive("archive.tar.gz", &mut Cursor::new(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn test_upload_rejects_corrupt_container() {
        let gateway = Arc::new(MemoryGateway::new());
        let workspace = Workspace::new(gateway.clone());
        let err = workspace
            .upload_archive("x.zip", &mut Cursor::new(b"not a zip".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::CorruptArchive { .. }));
        assert!(gateway.is_empty(), "nothing may be published for a bad upload");
    }

    #[test]
    fn test_write_then_read() {
        let (workspace, _, key) = seeded();
        workspace.write_entry(&key, "new.txt", "fresh").unwrap();
        assert_eq!(workspace.read_entry(&key, "new.txt").unwrap(), "fresh");
        assert_eq!(workspace.read_entry(&key, "a.txt").unwrap(), "alpha");
    }

    #[test]
    fn test_read_missing_is_error() {
        let (workspace, _, key) = seeded();
        let err = workspace.read_entry(&key, "nope.txt").unwrap_err();
        assert!(matches!(err, Error::EntryNotFound { .. }));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let (workspace, gateway, key) = seeded();
        let before = gateway.object(&key).unwrap();
        let err = workspace.apply_edits(&key, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction { .. }));
        assert_eq!(gateway.object(&key).unwrap(), before);
    }
}
