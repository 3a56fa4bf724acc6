//! # zipfs
//!
//! A ZIP archive, persisted as a single object in a remote store, exposed
//! as a mutable virtual filesystem: list, read, create, overwrite, append
//! to and delete individual entries without ever handling the archive as
//! a monolithic blob.
//!
//! The heart of the crate is the archive-mutation engine: the
//! [`Rebuilder`] takes an existing archive plus a batch of entry-level
//! [`EditInstruction`]s and produces a new, correctly-reassembled
//! container. Untouched entries are copied byte-for-byte (compressed data
//! and metadata preserved, no recompression); the rebuilt archive is only
//! published once the whole rebuild has succeeded, so callers observe
//! mutations atomically.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use zipfs::{EditInstruction, MemoryGateway, Workspace, Writer};
//!
//! fn main() -> zipfs::Result<()> {
//!     let workspace = Workspace::new(Arc::new(MemoryGateway::new()));
//!
//!     // Bootstrap an archive object from uploaded bytes.
//!     let mut upload = Cursor::new(Vec::new());
//!     let mut writer = Writer::new(&mut upload);
//!     writer.add_entry("notes.txt", b"first line\n")?;
//!     let _ = writer.finish()?;
//!     upload.set_position(0);
//!     let key = workspace.upload_archive("project.zip", &mut upload)?;
//!
//!     // Entry-level mutations, each a full rebuild-and-publish.
//!     workspace.append_entry(&key, "notes.txt", "second line\n")?;
//!     workspace.write_entry(&key, "src/main.go", "package main\n")?;
//!
//!     // Batch edits go through the same engine.
//!     let edited = workspace.apply_edits(
//!         &key,
//!         &[
//!             EditInstruction::replace("notes.txt", "rewritten\n")?,
//!             EditInstruction::delete("src/main.go")?,
//!         ],
//!     )?;
//!     assert_eq!(edited.entries_deleted, 1);
//!
//!     assert_eq!(workspace.read_entry(&key, "notes.txt")?, "rewritten\n");
//!     Ok(())
//! }
//! ```
//!
//! ## Storage
//!
//! The core is parameterized only by the [`ObjectGateway`] trait - whole
//! object fetch and publish by key. [`FsGateway`] backs a bucket with a
//! local directory; [`MemoryGateway`] serves tests and examples; remote
//! stores implement the trait in their own crates. The gateway handle is
//! constructed explicitly at startup and passed in.
//!
//! ## Concurrency
//!
//! This is a single-writer design per key: concurrent mutations to the
//! same key race and the last publish wins. See the [`vfs`] module docs.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | No | `zipfs` command-line tool over a directory bucket |

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod edit;
pub mod entry_path;
pub mod error;
mod format;
pub mod key;
pub mod read;
pub mod store;
pub mod tools;
pub mod vfs;
pub mod write;

pub use entry_path::EntryPath;
pub use error::{Error, Result};
pub use key::{ARCHIVE_EXTENSION, ObjectKey};

// Re-export the reading and writing API at the crate root.
pub use read::{Archive, Entry};
pub use write::{WriteResult, Writer};

// Re-export the mutation engine.
pub use edit::{EditAction, EditInstruction, RebuildResult, Rebuilder};

// Re-export the storage and operation layers.
pub use store::{FsGateway, MemoryGateway, ObjectGateway};
pub use tools::{STATUS_OK, ToolSurface};
pub use vfs::{ScratchCopy, Workspace};
