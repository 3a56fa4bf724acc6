//! Transient local materialization of an archive object.

use std::fs::File;
use std::io::Seek;

use crate::store::ObjectGateway;
use crate::{ObjectKey, Result};

/// A scratch copy of one archive object on local working storage.
///
/// Backed by an unnamed temporary file: the file is unlinked at creation,
/// so the bytes are reclaimed when the value drops, on success and error
/// paths alike. A scratch copy is exclusively owned by the operation that
/// created it and never outlives it.
pub struct ScratchCopy {
    file: File,
}

impl ScratchCopy {
    /// Creates an empty scratch copy.
    pub fn new() -> Result<Self> {
        Ok(Self {
            file: tempfile::tempfile()?,
        })
    }

    /// Fetches the object at `key` into a fresh scratch copy.
    ///
    /// The copy is rewound and ready to read.
    pub fn fetch(gateway: &dyn ObjectGateway, key: &ObjectKey) -> Result<Self> {
        let mut scratch = Self::new()?;
        gateway.fetch(key, &mut scratch.file)?;
        scratch.file.rewind()?;
        Ok(scratch)
    }

    /// Publishes this scratch copy as the object at `key`, consuming it.
    pub fn publish(mut self, gateway: &dyn ObjectGateway, key: &ObjectKey) -> Result<u64> {
        self.file.rewind()?;
        gateway.publish(key, &mut self.file)
    }

    /// Returns the underlying file for reading or writing.
    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}
