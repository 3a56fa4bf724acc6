//! Archive writing: new entries and byte-exact copies.
//!
//! [`Writer`] builds a container front-to-back: local headers and entry
//! data as entries are added, then the central directory and the
//! end-of-central-directory record on [`finish`](Writer::finish). New
//! entries are deflate-compressed (or stored when deflate would grow
//! them); existing entries are copied raw, preserving their compressed
//! bytes and captured metadata exactly.

mod writer;

pub use writer::{WriteResult, Writer};
