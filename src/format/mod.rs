//! ZIP container framing: signatures, record layouts and parsing.
//!
//! This module knows the on-disk shape of a ZIP container - local file
//! headers, the central directory and the end-of-central-directory record -
//! and nothing about store keys or edit semantics. The reading and writing
//! pipelines sit on top of it.
//!
//! Scope matches the data model: single-volume, non-zip64 containers.
//! Archives using zip64 framing or split volumes are rejected with
//! [`Error::Unsupported`](crate::Error::Unsupported) rather than misread.

mod header;

pub(crate) use header::{CentralRecord, EndOfCentralDirectory, local_data_offset};

/// Local file header signature ("PK\x03\x04").
pub(crate) const LOCAL_FILE_SIG: [u8; 4] = *b"PK\x03\x04";

/// Central directory file header signature ("PK\x01\x02").
pub(crate) const CENTRAL_DIR_SIG: [u8; 4] = *b"PK\x01\x02";

/// End of central directory signature ("PK\x05\x06").
pub(crate) const EOCD_SIG: [u8; 4] = *b"PK\x05\x06";

/// Entry data is stored without compression.
pub(crate) const METHOD_STORED: u16 = 0;

/// Entry data is raw-deflate compressed.
pub(crate) const METHOD_DEFLATED: u16 = 8;

/// General purpose flag: entry data is encrypted.
pub(crate) const FLAG_ENCRYPTED: u16 = 0x0001;

/// General purpose flag: sizes and CRC live in a trailing data descriptor.
///
/// The central directory always carries the real values, so this flag is
/// honored on read and cleared whenever an entry is rewritten.
pub(crate) const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// General purpose flag: the entry name is UTF-8.
pub(crate) const FLAG_UTF8: u16 = 0x0800;

/// "Version made by" for entries this crate writes: Unix, spec 2.0.
pub(crate) const VERSION_MADE_BY: u16 = (3 << 8) | 20;

/// Minimum "version needed" for stored entries.
pub(crate) const VERSION_STORED: u16 = 10;

/// Minimum "version needed" for deflated entries.
pub(crate) const VERSION_DEFLATED: u16 = 20;

/// DOS date for entries this crate writes: 1980-01-01.
///
/// Entry timestamps are not part of the round-trip contract for modified
/// entries; a fixed epoch keeps rebuilds deterministic.
pub(crate) const DEFAULT_DOS_DATE: u16 = 0x0021;

/// DOS time for entries this crate writes: 00:00:00.
pub(crate) const DEFAULT_DOS_TIME: u16 = 0;

/// External attributes for entries this crate writes: regular file, 0644.
pub(crate) const EXTERNAL_ATTRS_FILE: u32 = 0o100644 << 16;

/// Reads a little-endian u16 at `at` from a fixed buffer.
#[inline]
pub(crate) fn u16_at(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

/// Reads a little-endian u32 at `at` from a fixed buffer.
#[inline]
pub(crate) fn u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Appends a little-endian u16 to an output buffer.
#[inline]
pub(crate) fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Appends a little-endian u32 to an output buffer.
#[inline]
pub(crate) fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}
