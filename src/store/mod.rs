//! Object store gateway: fetch and publish archive objects by key.
//!
//! The core is parameterized only by the [`ObjectGateway`] trait - an
//! explicitly constructed handle passed in at startup, never a lazily
//! initialized process-wide singleton. Implementations move whole objects:
//! no byte-range reads, no partial writes.
//!
//! Two implementations ship with the crate: [`FsGateway`] backs a bucket
//! with a local directory (and gives the CLI its storage), and
//! [`MemoryGateway`] holds objects in a map for tests and examples.
//! Remote stores (S3-compatible, GCS, ...) implement the same trait in
//! their own crates.

mod fs;
mod memory;

pub use fs::FsGateway;
pub use memory::MemoryGateway;

use std::io::{Read, Write};

use crate::{ObjectKey, Result};

/// Whole-object access to the archive store.
///
/// `fetch` streams the object at `key` into `dest`;
/// `publish` streams `src` into the object at `key`, overwriting whatever
/// was previously stored there (and creating the key if absent). Both
/// return the number of bytes moved.
///
/// Publishing is the last step of every mutation: a failed rebuild never
/// reaches `publish`, so the prior object survives any earlier error.
/// No ordering is provided across concurrent publishes to the same key -
/// the last one wins (see the crate-level concurrency notes).
pub trait ObjectGateway: Send + Sync {
    /// Fetches the object at `key` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectNotFound`](crate::Error::ObjectNotFound) if
    /// the key is absent.
    fn fetch(&self, key: &ObjectKey, dest: &mut dyn Write) -> Result<u64>;

    /// Publishes `src` as the object at `key`, replacing any prior object.
    fn publish(&self, key: &ObjectKey, src: &mut dyn Read) -> Result<u64>;
}
