//! Archive reading: entry table, per-entry decompression, raw access.
//!
//! [`Archive`] parses a container's central directory into an ordered entry
//! table and serves three kinds of access:
//!
//! - decoded entry data ([`Archive::read_to_vec`], [`Archive::read_to_string`]),
//!   CRC-verified;
//! - raw, still-compressed entry data ([`Archive::read_raw_by_index`]) for
//!   byte-exact copies into a rebuilt container;
//! - the entry table itself ([`Archive::entries`]), in central-directory
//!   order, which is the order the listing operation exposes.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use zipfs::Archive;
//!
//! # fn main() -> zipfs::Result<()> {
//! let file = File::open("workspace.zip")?;
//! let mut archive = Archive::open(file)?;
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.path, entry.size);
//! }
//! let text = archive.read_to_string("docs/readme.txt")?;
//! # Ok(())
//! # }
//! ```

mod archive;
mod entry;

pub use archive::Archive;
pub use entry::Entry;
