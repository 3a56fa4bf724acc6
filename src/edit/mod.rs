//! Archive mutation: edit instructions and the rebuilder.
//!
//! Mutations are expressed as batches of [`EditInstruction`] records and
//! applied by the [`Rebuilder`], which reads an existing container and
//! writes a new one reflecting the batch:
//!
//! - untouched entries are copied raw, byte-for-byte;
//! - `replace` is create-or-overwrite;
//! - `append` concatenates onto existing content (or creates the entry);
//! - `delete` omits the entry.
//!
//! A whole-archive rewrite per mutation is deliberate: the rebuilt
//! container is complete before anything is published, which is what gives
//! the no-partial-write guarantee. Batch resolution semantics (last
//! instruction wins per path, delete conflicts rejected) are documented on
//! [`Rebuilder`].

mod instruction;
mod rebuilder;

pub use instruction::{EditAction, EditInstruction};
pub use rebuilder::{RebuildResult, Rebuilder};
