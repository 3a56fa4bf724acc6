//! Error types for remote ZIP filesystem operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when working with archive objects and their entries, along
//! with a convenient [`Result<T>`] type alias.
//!
//! All fallible operations in this crate return `Result<T, Error>`. Errors
//! are distinguishable by variant so that a transport layer can translate
//! them into caller-appropriate responses:
//!
//! ```rust
//! use zipfs::Error;
//!
//! fn status_for(error: &Error) -> u16 {
//!     match error {
//!         Error::ObjectNotFound { .. } | Error::EntryNotFound { .. } => 404,
//!         Error::InvalidInput { .. }
//!         | Error::InvalidInstruction { .. }
//!         | Error::InvalidEntryPath(_)
//!         | Error::InvalidObjectKey(_) => 400,
//!         _ => 500,
//!     }
//! }
//!
//! let missing = Error::EntryNotFound { path: "docs/a.txt".into() };
//! assert_eq!(status_for(&missing), 404);
//! ```

use std::io;

/// The main error type for archive store operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system and transport operations |
/// | Store | [`ObjectNotFound`][Self::ObjectNotFound] | Key absent in the object store |
/// | Container | [`CorruptArchive`][Self::CorruptArchive], [`CrcMismatch`][Self::CrcMismatch] | Invalid or damaged archive bytes |
/// | Lookup | [`EntryNotFound`][Self::EntryNotFound] | Requested path absent |
/// | Validation | [`InvalidInstruction`][Self::InvalidInstruction], [`InvalidInput`][Self::InvalidInput], [`InvalidEntryPath`][Self::InvalidEntryPath], [`InvalidObjectKey`][Self::InvalidObjectKey] | Malformed caller input |
/// | Compatibility | [`UnsupportedMethod`][Self::UnsupportedMethod], [`Unsupported`][Self::Unsupported] | Container features outside scope |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file or transport operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested key does not exist in the object store.
    #[error("object '{key}' not found in store")]
    ObjectNotFound {
        /// The key that was requested.
        key: String,
    },

    /// The fetched bytes are not a valid ZIP container.
    ///
    /// This covers missing or malformed framing (no end-of-central-directory
    /// record, bad signatures, truncated records) as well as containers that
    /// violate the entry-uniqueness invariant. A failed parse never results
    /// in a publish: the prior remote object is left untouched.
    #[error("corrupt archive: {reason}")]
    CorruptArchive {
        /// Description of what was expected vs. found.
        reason: String,
    },

    /// An entry's decompressed data did not match its stored CRC-32.
    #[error("CRC mismatch for entry '{path}': expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        /// The entry whose data failed verification.
        path: String,
        /// CRC-32 recorded in the central directory.
        expected: u32,
        /// CRC-32 computed over the decompressed data.
        actual: u32,
    },

    /// The requested entry path is absent from the archive.
    ///
    /// This is a real error, never a sentinel value: a read of a missing
    /// path must be distinguishable from a read of an entry whose content
    /// happens to look like a placeholder.
    #[error("entry '{path}' not found in archive")]
    EntryNotFound {
        /// The path that was requested.
        path: String,
    },

    /// The entry exists but its content is not valid UTF-8 text.
    #[error("entry '{path}' is not valid UTF-8 text")]
    NonUtf8Entry {
        /// The entry whose content failed decoding.
        path: String,
    },

    /// An edit instruction (or an instruction batch) is malformed.
    ///
    /// Raised for unknown actions, missing `content` on replace/append,
    /// empty batches submitted to the batch operation, unparseable wire
    /// payloads, and batches that target one path with both a delete and a
    /// replace/append. The whole batch fails before any publish.
    #[error("invalid edit instruction: {reason}")]
    InvalidInstruction {
        /// Description of the offending instruction.
        reason: String,
    },

    /// Caller input failed validation (e.g. wrong upload extension).
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of the rejected input.
        reason: String,
    },

    /// An entry path failed validation.
    #[error("invalid entry path: {0}")]
    InvalidEntryPath(String),

    /// An object key failed validation.
    #[error("invalid object key: {0}")]
    InvalidObjectKey(String),

    /// Writing would emit two entries with the same path.
    ///
    /// Entry paths are unique within one archive object; the rebuilder
    /// resolves batches so this cannot be reached through the public
    /// operations.
    #[error("duplicate entry path '{path}' in output archive")]
    DuplicateEntry {
        /// The path that was written twice.
        path: String,
    },

    /// The entry uses a compression method this crate cannot decode.
    ///
    /// Unmodified entries with unknown methods are still copied raw during
    /// a rebuild; only reading or appending to them requires decoding.
    #[error("unsupported compression method {method}")]
    UnsupportedMethod {
        /// The numeric ZIP compression method identifier.
        method: u16,
    },

    /// The container uses a feature outside the scope of this crate.
    #[error("unsupported archive feature: {feature}")]
    Unsupported {
        /// Short name of the feature (e.g. "zip64", "encrypted entry").
        feature: &'static str,
    },
}

/// A specialized `Result` type for archive store operations.
pub type Result<T> = std::result::Result<T, Error>;
