//! Central directory and end-of-central-directory records.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::{Error, Result};

use super::{
    CENTRAL_DIR_SIG, EOCD_SIG, FLAG_DATA_DESCRIPTOR, LOCAL_FILE_SIG, put_u16, put_u32, u16_at,
    u32_at,
};

/// Fixed size of the end-of-central-directory record (without comment).
const EOCD_SIZE: u64 = 22;

/// Fixed size of a central directory file header (without variable fields).
const CENTRAL_HEADER_SIZE: usize = 46;

/// Fixed size of a local file header (without variable fields).
const LOCAL_HEADER_SIZE: usize = 30;

/// The end-of-central-directory record of a ZIP container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EndOfCentralDirectory {
    /// Number of entries in the central directory.
    pub entry_count: u16,
    /// Size of the central directory in bytes.
    pub cd_size: u32,
    /// Offset of the central directory from the start of the container.
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    /// Locates and parses the EOCD record by scanning backward from the end.
    ///
    /// The record may be followed by a comment of up to 65535 bytes, so the
    /// scan covers the final `22 + 65535` bytes. A signature match is only
    /// accepted when its comment length runs exactly to end-of-file, which
    /// disambiguates signature bytes that happen to appear inside a comment.
    pub fn locate<R: Read + Seek>(r: &mut R) -> Result<Self> {
        let len = r.seek(SeekFrom::End(0))?;
        if len < EOCD_SIZE {
            return Err(Error::CorruptArchive {
                reason: format!("container too small ({} bytes)", len),
            });
        }

        let tail_len = len.min(EOCD_SIZE + u64::from(u16::MAX));
        r.seek(SeekFrom::Start(len - tail_len))?;
        let mut tail = vec![0u8; tail_len as usize];
        r.read_exact(&mut tail)?;

        let mut pos = tail.len() - EOCD_SIZE as usize;
        loop {
            if tail[pos..pos + 4] == EOCD_SIG {
                let comment_len = u16_at(&tail, pos + 20) as usize;
                if pos + EOCD_SIZE as usize + comment_len == tail.len() {
                    return Self::parse(&tail[pos..], len);
                }
            }
            if pos == 0 {
                break;
            }
            pos -= 1;
        }

        Err(Error::CorruptArchive {
            reason: "end of central directory record not found".into(),
        })
    }

    /// Parses an EOCD record from a buffer starting at its signature.
    fn parse(buf: &[u8], container_len: u64) -> Result<Self> {
        let disk_number = u16_at(buf, 4);
        let cd_start_disk = u16_at(buf, 6);
        let disk_entries = u16_at(buf, 8);
        let entry_count = u16_at(buf, 10);
        let cd_size = u32_at(buf, 12);
        let cd_offset = u32_at(buf, 16);

        if disk_number != 0 || cd_start_disk != 0 {
            return Err(Error::Unsupported {
                feature: "multi-volume archive",
            });
        }
        if entry_count == u16::MAX || cd_size == u32::MAX || cd_offset == u32::MAX {
            return Err(Error::Unsupported { feature: "zip64" });
        }
        if disk_entries != entry_count {
            return Err(Error::CorruptArchive {
                reason: "entry counts disagree in end of central directory".into(),
            });
        }
        if u64::from(cd_offset) + u64::from(cd_size) > container_len {
            return Err(Error::CorruptArchive {
                reason: "central directory extends past end of container".into(),
            });
        }

        Ok(Self {
            entry_count,
            cd_size,
            cd_offset,
        })
    }

    /// Writes the EOCD record (with an empty comment).
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        let mut buf = Vec::with_capacity(EOCD_SIZE as usize);
        buf.extend_from_slice(&EOCD_SIG);
        put_u16(&mut buf, 0); // this disk
        put_u16(&mut buf, 0); // central directory start disk
        put_u16(&mut buf, self.entry_count);
        put_u16(&mut buf, self.entry_count);
        put_u32(&mut buf, self.cd_size);
        put_u32(&mut buf, self.cd_offset);
        put_u16(&mut buf, 0); // comment length
        w.write_all(&buf)?;
        Ok(())
    }
}

/// One file header from the central directory.
///
/// This is the authoritative per-entry metadata: when an entry carries a
/// data descriptor its local header holds zeros, but the central record
/// always has the real CRC and sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CentralRecord {
    /// Stored entry name, decoded as UTF-8.
    pub name: String,
    /// "Version made by" field, preserved across raw copies.
    pub version_made_by: u16,
    /// Minimum version needed to extract.
    pub version_needed: u16,
    /// General purpose bit flags.
    pub flags: u16,
    /// Compression method identifier.
    pub method: u16,
    /// Modification time in DOS format.
    pub dos_time: u16,
    /// Modification date in DOS format.
    pub dos_date: u16,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Size of the compressed data in bytes.
    pub compressed_size: u32,
    /// Size of the uncompressed data in bytes.
    pub uncompressed_size: u32,
    /// Internal file attributes.
    pub internal_attrs: u16,
    /// External file attributes (host-dependent; Unix mode in the high bits).
    pub external_attrs: u32,
    /// Offset of the entry's local header from the start of the container.
    pub local_header_offset: u32,
}

impl CentralRecord {
    /// Parses one central directory record from the reader.
    ///
    /// The reader must be positioned at the record's signature; on success
    /// it is left positioned at the next record.
    pub fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let mut buf = [0u8; CENTRAL_HEADER_SIZE];
        r.read_exact(&mut buf).map_err(|e| truncated(e, "central directory"))?;
        if buf[0..4] != CENTRAL_DIR_SIG {
            return Err(Error::CorruptArchive {
                reason: "bad central directory signature".into(),
            });
        }

        let name_len = u16_at(&buf, 28) as usize;
        let extra_len = u16_at(&buf, 30) as usize;
        let comment_len = u16_at(&buf, 32) as usize;
        let disk_start = u16_at(&buf, 34);

        if disk_start != 0 {
            return Err(Error::Unsupported {
                feature: "multi-volume archive",
            });
        }

        let compressed_size = u32_at(&buf, 20);
        let uncompressed_size = u32_at(&buf, 24);
        let local_header_offset = u32_at(&buf, 42);
        if compressed_size == u32::MAX
            || uncompressed_size == u32::MAX
            || local_header_offset == u32::MAX
        {
            return Err(Error::Unsupported { feature: "zip64" });
        }

        let mut name_bytes = vec![0u8; name_len];
        r.read_exact(&mut name_bytes).map_err(|e| truncated(e, "entry name"))?;
        let name = String::from_utf8(name_bytes).map_err(|_| Error::CorruptArchive {
            reason: "entry name is not valid UTF-8".into(),
        })?;

        // Extra fields and comments are not interpreted; skip past them.
        let mut skip = vec![0u8; extra_len + comment_len];
        r.read_exact(&mut skip).map_err(|e| truncated(e, "central directory"))?;

        Ok(Self {
            name,
            version_made_by: u16_at(&buf, 4),
            version_needed: u16_at(&buf, 6),
            flags: u16_at(&buf, 8),
            method: u16_at(&buf, 10),
            dos_time: u16_at(&buf, 12),
            dos_date: u16_at(&buf, 14),
            crc32: u32_at(&buf, 16),
            compressed_size,
            uncompressed_size,
            internal_attrs: u16_at(&buf, 36),
            external_attrs: u32_at(&buf, 38),
            local_header_offset,
        })
    }

    /// Writes this record as a central directory file header.
    pub fn write_central<W: Write>(&self, w: &mut W) -> Result<u64> {
        let name = self.name.as_bytes();
        let mut buf = Vec::with_capacity(CENTRAL_HEADER_SIZE + name.len());
        buf.extend_from_slice(&CENTRAL_DIR_SIG);
        put_u16(&mut buf, self.version_made_by);
        put_u16(&mut buf, self.version_needed);
        put_u16(&mut buf, self.flags);
        put_u16(&mut buf, self.method);
        put_u16(&mut buf, self.dos_time);
        put_u16(&mut buf, self.dos_date);
        put_u32(&mut buf, self.crc32);
        put_u32(&mut buf, self.compressed_size);
        put_u32(&mut buf, self.uncompressed_size);
        put_u16(&mut buf, name.len() as u16);
        put_u16(&mut buf, 0); // extra field length
        put_u16(&mut buf, 0); // comment length
        put_u16(&mut buf, 0); // disk number start
        put_u16(&mut buf, self.internal_attrs);
        put_u32(&mut buf, self.external_attrs);
        put_u32(&mut buf, self.local_header_offset);
        buf.extend_from_slice(name);
        w.write_all(&buf)?;
        Ok(buf.len() as u64)
    }

    /// Writes this record as a local file header.
    ///
    /// The data-descriptor flag is cleared: the header written here always
    /// carries the real CRC and sizes.
    pub fn write_local<W: Write>(&self, w: &mut W) -> Result<()> {
        let name = self.name.as_bytes();
        let mut buf = Vec::with_capacity(LOCAL_HEADER_SIZE + name.len());
        buf.extend_from_slice(&LOCAL_FILE_SIG);
        put_u16(&mut buf, self.version_needed);
        put_u16(&mut buf, self.flags & !FLAG_DATA_DESCRIPTOR);
        put_u16(&mut buf, self.method);
        put_u16(&mut buf, self.dos_time);
        put_u16(&mut buf, self.dos_date);
        put_u32(&mut buf, self.crc32);
        put_u32(&mut buf, self.compressed_size);
        put_u32(&mut buf, self.uncompressed_size);
        put_u16(&mut buf, name.len() as u16);
        put_u16(&mut buf, 0); // extra field length
        buf.extend_from_slice(name);
        w.write_all(&buf)?;
        Ok(())
    }
}

/// Resolves the absolute offset of an entry's compressed data.
///
/// Local headers may carry different name/extra lengths than the central
/// record (some writers pad the local extra field), so the local header is
/// parsed for the variable lengths rather than trusting the central copy.
pub(crate) fn local_data_offset<R: Read + Seek>(r: &mut R, header_offset: u64) -> Result<u64> {
    r.seek(SeekFrom::Start(header_offset))?;
    let mut buf = [0u8; LOCAL_HEADER_SIZE];
    r.read_exact(&mut buf).map_err(|e| truncated(e, "local header"))?;
    if buf[0..4] != LOCAL_FILE_SIG {
        return Err(Error::CorruptArchive {
            reason: format!("bad local header signature at offset {:#x}", header_offset),
        });
    }
    let name_len = u16_at(&buf, 26) as u64;
    let extra_len = u16_at(&buf, 28) as u64;
    Ok(header_offset + LOCAL_HEADER_SIZE as u64 + name_len + extra_len)
}

/// Maps an unexpected-EOF read into a corruption error with context.
fn truncated(e: std::io::Error, what: &str) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::CorruptArchive {
            reason: format!("truncated {}", what),
        }
    } else {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn minimal_eocd(entry_count: u16, cd_size: u32, cd_offset: u32, comment: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&EOCD_SIG);
        put_u16(&mut buf, 0);
        put_u16(&mut buf, 0);
        put_u16(&mut buf, entry_count);
        put_u16(&mut buf, entry_count);
        put_u32(&mut buf, cd_size);
        put_u32(&mut buf, cd_offset);
        put_u16(&mut buf, comment.len() as u16);
        buf.extend_from_slice(comment);
        buf
    }

    #[test]
    fn test_locate_empty_container() {
        let bytes = minimal_eocd(0, 0, 0, b"");
        let eocd = EndOfCentralDirectory::locate(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(eocd.entry_count, 0);
        assert_eq!(eocd.cd_size, 0);
        assert_eq!(eocd.cd_offset, 0);
    }

    #[test]
    fn test_locate_with_comment() {
        let bytes = minimal_eocd(0, 0, 0, b"trailing archive comment");
        let eocd = EndOfCentralDirectory::locate(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(eocd.entry_count, 0);
    }

    #[test]
    fn test_locate_sig_inside_comment() {
        // A comment containing the EOCD signature must not shadow the real
        // record: the impostor's comment-length field does not run to EOF.
        let mut comment = Vec::new();
        comment.extend_from_slice(&EOCD_SIG);
        comment.extend_from_slice(&[0u8; 16]);
        comment.extend_from_slice(&[0xFF, 0x00]);
        let bytes = minimal_eocd(2, 0, 0, &comment);
        let eocd = EndOfCentralDirectory::locate(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(eocd.entry_count, 2);
    }

    #[test]
    fn test_locate_garbage() {
        let err = EndOfCentralDirectory::locate(&mut Cursor::new(vec![0u8; 64])).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive { .. }));
    }

    #[test]
    fn test_locate_too_small() {
        let err = EndOfCentralDirectory::locate(&mut Cursor::new(b"PK".to_vec())).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive { .. }));
    }

    #[test]
    fn test_zip64_markers_rejected() {
        let bytes = minimal_eocd(u16::MAX, 0, 0, b"");
        let err = EndOfCentralDirectory::locate(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::Unsupported { feature: "zip64" }));
    }

    #[test]
    fn test_eocd_roundtrip() {
        let eocd = EndOfCentralDirectory {
            entry_count: 3,
            cd_size: 150,
            cd_offset: 1024,
        };
        let mut buf = Vec::new();
        eocd.write_to(&mut buf).unwrap();
        // Make the offsets plausible for the consistency check.
        let mut container = vec![0u8; 1174];
        container.extend_from_slice(&buf);
        let parsed = EndOfCentralDirectory::locate(&mut Cursor::new(container)).unwrap();
        assert_eq!(parsed, eocd);
    }

    #[test]
    fn test_central_record_roundtrip() {
        let record = CentralRecord {
            name: "dir/file.txt".into(),
            version_made_by: 0x0314,
            version_needed: 20,
            flags: 0x0800,
            method: 8,
            dos_time: 0x6000,
            dos_date: 0x5761,
            crc32: 0xCAFEBABE,
            compressed_size: 42,
            uncompressed_size: 99,
            internal_attrs: 0,
            external_attrs: 0o100644 << 16,
            local_header_offset: 7,
        };
        let mut buf = Vec::new();
        record.write_central(&mut buf).unwrap();
        let parsed = CentralRecord::parse(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_local_header_clears_descriptor_flag() {
        let record = CentralRecord {
            name: "f".into(),
            version_made_by: 0x0314,
            version_needed: 20,
            flags: FLAG_DATA_DESCRIPTOR | 0x0800,
            method: 8,
            dos_time: 0,
            dos_date: 0x0021,
            crc32: 1,
            compressed_size: 2,
            uncompressed_size: 3,
            internal_attrs: 0,
            external_attrs: 0,
            local_header_offset: 0,
        };
        let mut buf = Vec::new();
        record.write_local(&mut buf).unwrap();
        let flags = u16_at(&buf, 6);
        assert_eq!(flags & FLAG_DATA_DESCRIPTOR, 0);
        assert_eq!(flags & 0x0800, 0x0800);
    }

    #[test]
    fn test_local_data_offset() {
        let record = CentralRecord {
            name: "abc.txt".into(),
            version_made_by: 0x0314,
            version_needed: 10,
            flags: 0,
            method: 0,
            dos_time: 0,
            dos_date: 0x0021,
            crc32: 0,
            compressed_size: 5,
            uncompressed_size: 5,
            internal_attrs: 0,
            external_attrs: 0,
            local_header_offset: 0,
        };
        let mut buf = Vec::new();
        record.write_local(&mut buf).unwrap();
        buf.extend_from_slice(b"hello");
        let offset = local_data_offset(&mut Cursor::new(&buf), 0).unwrap();
        assert_eq!(offset, 30 + 7);
        assert_eq!(&buf[offset as usize..], b"hello");
    }

    #[test]
    fn test_central_parse_truncated() {
        let err = CentralRecord::parse(&mut Cursor::new(vec![0x50, 0x4b])).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive { .. }));
    }
}
