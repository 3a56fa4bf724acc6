//! In-memory object gateway.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Mutex;

use crate::{Error, ObjectKey, Result};

use super::ObjectGateway;

/// An object gateway holding objects in memory.
///
/// Intended for tests and examples: the map lives behind a mutex, so a
/// shared gateway behaves like the real thing across threads, and tests
/// can snapshot object bytes directly to assert that a failed operation
/// left the stored archive untouched.
#[derive(Default)]
pub struct MemoryGateway {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the object bytes at `key`, if present.
    pub fn object(&self, key: &ObjectKey) -> Option<Vec<u8>> {
        self.lock().get(key.as_str()).cloned()
    }

    /// Returns true if an object exists at `key`.
    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.lock().contains_key(key.as_str())
    }

    /// Returns the number of stored objects.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still structurally sound; recover rather than
        // cascade the panic into unrelated tests.
        self.objects.lock().unwrap_or_else(|poisoned| {
            log::warn!("MemoryGateway mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl ObjectGateway for MemoryGateway {
    fn fetch(&self, key: &ObjectKey, dest: &mut dyn Write) -> Result<u64> {
        let objects = self.lock();
        let bytes = objects
            .get(key.as_str())
            .ok_or_else(|| Error::ObjectNotFound {
                key: key.to_string(),
            })?;
        dest.write_all(bytes)?;
        Ok(bytes.len() as u64)
    }

    fn publish(&self, key: &ObjectKey, src: &mut dyn Read) -> Result<u64> {
        let mut bytes = Vec::new();
        src.read_to_end(&mut bytes)?;
        let len = bytes.len() as u64;
        self.lock().insert(key.to_string(), bytes);
        Ok(len)
    }
}
