//! Filesystem-backed object gateway.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use crate::{Error, ObjectKey, Result};

use super::ObjectGateway;

/// An object gateway backed by a local directory.
///
/// Each object lives as one file named by its key directly under the
/// bucket root (keys cannot contain path separators, so an object can
/// never land outside the bucket). Publishes write a temporary sibling
/// and rename it over the target, so a concurrent fetch sees either the
/// old object or the new one, never a half-written file.
pub struct FsGateway {
    root: PathBuf,
}

impl FsGateway {
    /// Opens a bucket directory, creating it if missing.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn object_path(&self, key: &ObjectKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

impl ObjectGateway for FsGateway {
    fn fetch(&self, key: &ObjectKey, dest: &mut dyn Write) -> Result<u64> {
        let mut file = File::open(self.object_path(key)).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::ObjectNotFound {
                    key: key.to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let bytes = io::copy(&mut file, dest)?;
        log::debug!("fetched object '{}' ({} bytes)", key, bytes);
        Ok(bytes)
    }

    fn publish(&self, key: &ObjectKey, src: &mut dyn Read) -> Result<u64> {
        let mut staged = tempfile::NamedTempFile::new_in(&self.root)?;
        let bytes = io::copy(src, &mut staged)?;
        staged
            .persist(self.object_path(key))
            .map_err(|e| Error::Io(e.error))?;
        log::debug!("published object '{}' ({} bytes)", key, bytes);
        Ok(bytes)
    }
}
