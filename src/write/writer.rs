//! Container writer.

use std::collections::HashSet;
use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

use crate::format::{
    CentralRecord, DEFAULT_DOS_DATE, DEFAULT_DOS_TIME, EXTERNAL_ATTRS_FILE, EndOfCentralDirectory,
    FLAG_DATA_DESCRIPTOR, FLAG_UTF8, METHOD_DEFLATED, METHOD_STORED, VERSION_DEFLATED,
    VERSION_MADE_BY, VERSION_STORED,
};
use crate::read::Entry;
use crate::{Error, Result};

/// Fixed size of a local file header (without variable fields).
const LOCAL_HEADER_SIZE: u64 = 30;

/// Result of writing an archive.
#[must_use = "write result should be checked to verify the archive was written as expected"]
#[derive(Debug, Clone, Default)]
pub struct WriteResult {
    /// Number of entries written.
    pub entries_written: usize,
    /// Total uncompressed bytes across all entries.
    pub total_size: u64,
    /// Total compressed bytes across all entries.
    pub compressed_size: u64,
}

impl WriteResult {
    /// Returns the compression ratio (compressed / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.total_size as f64
        }
    }
}

/// A writer producing one archive object.
///
/// The output stream is assumed to begin at the container's first byte;
/// the writer tracks offsets itself and never seeks, so any `Write` sink
/// works. Entry paths must be unique; a duplicate add is rejected rather
/// than silently producing an ambiguous container.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use zipfs::Writer;
///
/// # fn main() -> zipfs::Result<()> {
/// let mut out = Cursor::new(Vec::new());
/// let mut writer = Writer::new(&mut out);
/// writer.add_entry("hello.txt", b"Hello, World!")?;
/// let result = writer.finish()?;
/// assert_eq!(result.entries_written, 1);
/// # Ok(())
/// # }
/// ```
pub struct Writer<W: Write> {
    out: W,
    central: Vec<CentralRecord>,
    paths: HashSet<String>,
    offset: u64,
    result: WriteResult,
}

impl<W: Write> Writer<W> {
    /// Creates a writer over an output stream positioned at the start of
    /// the container.
    pub fn new(out: W) -> Self {
        Self {
            out,
            central: Vec::new(),
            paths: HashSet::new(),
            offset: 0,
            result: WriteResult::default(),
        }
    }

    /// Returns the number of entries written so far.
    pub fn len(&self) -> usize {
        self.central.len()
    }

    /// Returns true if no entries have been written yet.
    pub fn is_empty(&self) -> bool {
        self.central.is_empty()
    }

    /// Adds a new entry with the given data.
    ///
    /// The data is deflate-compressed unless compression would grow it, in
    /// which case it is stored. The caller is responsible for path
    /// validation; the writer only enforces uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEntry`] if the path was already written
    /// and [`Error::Unsupported`] if the entry or container would need
    /// zip64 framing.
    pub fn add_entry(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.check_capacity(path)?;

        let crc32 = crc32fast::hash(data);
        let compressed = deflate(data)?;
        let (method, payload) = if compressed.len() < data.len() {
            (METHOD_DEFLATED, compressed.as_slice())
        } else {
            (METHOD_STORED, data)
        };
        if data.len() as u64 > u64::from(u32::MAX) - 1 {
            return Err(Error::Unsupported { feature: "zip64" });
        }

        let record = CentralRecord {
            name: path.to_string(),
            version_made_by: VERSION_MADE_BY,
            version_needed: if method == METHOD_STORED {
                VERSION_STORED
            } else {
                VERSION_DEFLATED
            },
            flags: FLAG_UTF8,
            method,
            dos_time: DEFAULT_DOS_TIME,
            dos_date: DEFAULT_DOS_DATE,
            crc32,
            compressed_size: payload.len() as u32,
            uncompressed_size: data.len() as u32,
            internal_attrs: 0,
            external_attrs: EXTERNAL_ATTRS_FILE,
            local_header_offset: self.offset as u32,
        };

        self.emit(record, payload)
    }

    /// Copies an existing entry byte-for-byte.
    ///
    /// `raw` must be the entry's compressed data exactly as read by
    /// [`Archive::read_raw_by_index`](crate::Archive::read_raw_by_index);
    /// the entry's captured central record travels with it, so method, CRC,
    /// sizes, timestamps and attributes are preserved. Works for entries in
    /// compression formats this crate cannot decode.
    pub fn copy_raw(&mut self, entry: &Entry, raw: &[u8]) -> Result<()> {
        self.check_capacity(&entry.path)?;
        if raw.len() as u64 != entry.compressed_size {
            return Err(Error::CorruptArchive {
                reason: format!(
                    "raw data for entry '{}' is {} bytes, expected {}",
                    entry.path,
                    raw.len(),
                    entry.compressed_size
                ),
            });
        }

        let mut record = entry.record.clone();
        // Sizes and CRC are written inline; a trailing descriptor would be
        // stale framing.
        record.flags &= !FLAG_DATA_DESCRIPTOR;
        record.local_header_offset = self.offset as u32;
        self.emit(record, raw)
    }

    /// Finishes the archive: writes the central directory and the
    /// end-of-central-directory record, then flushes the output.
    pub fn finish(mut self) -> Result<WriteResult> {
        if self.offset > u64::from(u32::MAX) - 1 {
            return Err(Error::Unsupported { feature: "zip64" });
        }
        let cd_offset = self.offset as u32;

        let mut cd_size: u64 = 0;
        for record in &self.central {
            cd_size += record.write_central(&mut self.out)?;
        }
        if cd_size > u64::from(u32::MAX) - 1 {
            return Err(Error::Unsupported { feature: "zip64" });
        }

        EndOfCentralDirectory {
            entry_count: self.central.len() as u16,
            cd_size: cd_size as u32,
            cd_offset,
        }
        .write_to(&mut self.out)?;
        self.out.flush()?;

        self.result.entries_written = self.central.len();
        Ok(self.result)
    }

    /// Writes a local header plus payload and records the central entry.
    fn emit(&mut self, record: CentralRecord, payload: &[u8]) -> Result<()> {
        record.write_local(&mut self.out)?;
        self.out.write_all(payload)?;

        self.offset += LOCAL_HEADER_SIZE + record.name.len() as u64 + payload.len() as u64;
        self.result.total_size += u64::from(record.uncompressed_size);
        self.result.compressed_size += payload.len() as u64;
        self.paths.insert(record.name.clone());
        self.central.push(record);
        Ok(())
    }

    /// Rejects duplicate paths and containers that would need zip64 framing.
    fn check_capacity(&self, path: &str) -> Result<()> {
        if self.paths.contains(path) {
            return Err(Error::DuplicateEntry {
                path: path.to_string(),
            });
        }
        if self.central.len() >= usize::from(u16::MAX) - 1 {
            return Err(Error::Unsupported { feature: "zip64" });
        }
        if self.offset > u64::from(u32::MAX) / 2 {
            return Err(Error::Unsupported { feature: "zip64" });
        }
        Ok(())
    }
}

/// Deflate-compresses a buffer at the default level.
fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
