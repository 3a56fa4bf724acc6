//! Archive opening and entry data access.

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};

use flate2::read::DeflateDecoder;

use crate::format::{
    self, CentralRecord, EndOfCentralDirectory, FLAG_ENCRYPTED, METHOD_DEFLATED, METHOD_STORED,
};
use crate::{Error, Result};

/// A readable archive object, parsed from its central directory.
///
/// Entries are kept in central-directory order, which defines the order of
/// the listing operation. Entry paths are unique: a container holding two
/// entries with the same path violates the data model and is rejected at
/// open time as corrupt.
#[derive(Debug)]
pub struct Archive<R: Read + Seek> {
    reader: R,
    entries: Vec<super::Entry>,
}

impl<R: Read + Seek> Archive<R> {
    /// Opens an archive, parsing and validating its central directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptArchive`] if the bytes are not a valid
    /// container (missing or truncated framing, duplicate entry paths) and
    /// [`Error::Unsupported`] for zip64 or multi-volume containers.
    pub fn open(mut reader: R) -> Result<Self> {
        let eocd = EndOfCentralDirectory::locate(&mut reader)?;
        reader.seek(SeekFrom::Start(u64::from(eocd.cd_offset)))?;

        let mut entries = Vec::with_capacity(eocd.entry_count as usize);
        let mut seen: HashSet<String> = HashSet::with_capacity(eocd.entry_count as usize);
        for _ in 0..eocd.entry_count {
            let record = CentralRecord::parse(&mut reader)?;
            if !seen.insert(record.name.clone()) {
                return Err(Error::CorruptArchive {
                    reason: format!("duplicate entry path '{}'", record.name),
                });
            }
            entries.push(super::Entry::from_record(record));
        }

        Ok(Self { reader, entries })
    }

    /// Returns all entries in central-directory order.
    pub fn entries(&self) -> &[super::Entry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by exact path.
    pub fn entry(&self, path: &str) -> Option<&super::Entry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Returns true if an entry with the given path exists.
    pub fn contains(&self, path: &str) -> bool {
        self.entry(path).is_some()
    }

    /// Reads and decodes an entry's data, verifying its CRC.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if the path is absent,
    /// [`Error::UnsupportedMethod`] for compression methods other than
    /// stored/deflate, [`Error::Unsupported`] for encrypted entries, and
    /// [`Error::CrcMismatch`] if the decoded bytes fail verification.
    pub fn read_to_vec(&mut self, path: &str) -> Result<Vec<u8>> {
        let index = self
            .entries
            .iter()
            .position(|e| e.path == path)
            .ok_or_else(|| Error::EntryNotFound {
                path: path.to_string(),
            })?;
        self.read_to_vec_by_index(index)
    }

    /// Reads and decodes an entry's data as UTF-8 text.
    ///
    /// # Errors
    ///
    /// As [`read_to_vec`](Self::read_to_vec), plus [`Error::NonUtf8Entry`]
    /// if the content is not valid UTF-8.
    pub fn read_to_string(&mut self, path: &str) -> Result<String> {
        let data = self.read_to_vec(path)?;
        String::from_utf8(data).map_err(|_| Error::NonUtf8Entry {
            path: path.to_string(),
        })
    }

    /// Reads and decodes the entry at `index`, verifying its CRC.
    pub fn read_to_vec_by_index(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = self.entries[index].clone();
        if entry.record.flags & FLAG_ENCRYPTED != 0 {
            return Err(Error::Unsupported {
                feature: "encrypted entry",
            });
        }

        let raw = self.read_raw_by_index(index)?;
        let data = match entry.method {
            METHOD_STORED => raw,
            METHOD_DEFLATED => inflate(&raw, entry.size, &entry.path)?,
            method => return Err(Error::UnsupportedMethod { method }),
        };

        if data.len() as u64 != entry.size {
            return Err(Error::CorruptArchive {
                reason: format!(
                    "entry '{}' decoded to {} bytes, expected {}",
                    entry.path,
                    data.len(),
                    entry.size
                ),
            });
        }
        let actual = crc32fast::hash(&data);
        if actual != entry.crc32 {
            return Err(Error::CrcMismatch {
                path: entry.path,
                expected: entry.crc32,
                actual,
            });
        }
        Ok(data)
    }

    /// Reads the entry's compressed data exactly as stored.
    ///
    /// This is the copy path for unmodified entries: the returned bytes,
    /// together with the entry's central record, reproduce the entry
    /// byte-for-byte in a rebuilt container without recompression. Works
    /// for any compression method, including ones this crate cannot decode.
    pub fn read_raw_by_index(&mut self, index: usize) -> Result<Vec<u8>> {
        let record = &self.entries[index].record;
        let csize = u64::from(record.compressed_size);
        let offset =
            format::local_data_offset(&mut self.reader, u64::from(record.local_header_offset))?;

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut raw = vec![0u8; csize as usize];
        self.reader.read_exact(&mut raw).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::CorruptArchive {
                    reason: format!("truncated data for entry '{}'", self.entries[index].path),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Ok(raw)
    }

    /// Consumes the archive, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Inflates raw-deflate data with a hard output bound.
///
/// The bound guards against containers whose declared uncompressed size
/// disagrees with the stream (the declared size plus one spare byte lets
/// the length check upstream report the mismatch).
fn inflate(raw: &[u8], expected_size: u64, path: &str) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(raw).take(expected_size + 1);
    let mut data = Vec::with_capacity(expected_size as usize);
    decoder.read_to_end(&mut data).map_err(|e| Error::CorruptArchive {
        reason: format!("entry '{}' failed to inflate: {}", path, e),
    })?;
    Ok(data)
}
