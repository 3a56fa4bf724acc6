//! Object key type and fresh-key generation.

use crate::{Error, Result};
use std::fmt;
use uuid::Uuid;

/// Maximum length for object keys (in bytes).
const MAX_KEY_LENGTH: usize = 512;

/// The file extension carried by archive object keys.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// An opaque key identifying one archive object in the object store.
///
/// Keys are flat tokens, never paths: a key cannot contain `/`, `\` or NUL
/// bytes, so a hostile key can never address outside the store's namespace.
/// Fresh keys are generated as `<uuid4>.zip` by [`ObjectKey::generate`] and
/// are globally unique, so a newly uploaded archive can never merge with a
/// pre-existing object.
///
/// # Examples
///
/// ```
/// use zipfs::ObjectKey;
///
/// let key = ObjectKey::generate();
/// assert!(key.as_str().ends_with(".zip"));
///
/// assert!(ObjectKey::new("workspace-1.zip").is_ok());
/// assert!(ObjectKey::new("../escape.zip").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Creates an `ObjectKey` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidObjectKey`] if the key is empty, oversized,
    /// or contains path separators or NUL bytes.
    pub fn new(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidObjectKey("empty key".into()));
        }
        if s.len() > MAX_KEY_LENGTH {
            return Err(Error::InvalidObjectKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if s.contains('\0') {
            return Err(Error::InvalidObjectKey("contains NUL byte".into()));
        }
        if s.contains('/') || s.contains('\\') {
            return Err(Error::InvalidObjectKey(
                "path separators not allowed".into(),
            ));
        }
        if s == "." || s == ".." {
            return Err(Error::InvalidObjectKey("'.' and '..' not allowed".into()));
        }
        Ok(Self(s.to_string()))
    }

    /// Generates a fresh, globally-unique key with the archive extension.
    pub fn generate() -> Self {
        Self(format!("{}.{}", Uuid::new_v4(), ARCHIVE_EXTENSION))
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ObjectKey {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_unique_and_extension() {
        let keys: HashSet<_> = (0..64).map(|_| ObjectKey::generate()).collect();
        assert_eq!(keys.len(), 64);
        for key in &keys {
            assert!(key.as_str().ends_with(".zip"));
        }
    }

    #[test]
    fn test_valid_key() {
        let key = ObjectKey::new("workspace-1.zip").unwrap();
        assert_eq!(key.as_str(), "workspace-1.zip");
    }

    #[test]
    fn test_invalid_empty() {
        assert!(ObjectKey::new("").is_err());
    }

    #[test]
    fn test_invalid_separators() {
        assert!(ObjectKey::new("a/b.zip").is_err());
        assert!(ObjectKey::new("a\\b.zip").is_err());
    }

    #[test]
    fn test_invalid_dots() {
        assert!(ObjectKey::new(".").is_err());
        assert!(ObjectKey::new("..").is_err());
    }

    #[test]
    fn test_invalid_nul() {
        assert!(ObjectKey::new("a\0b").is_err());
    }

    #[test]
    fn test_invalid_too_long() {
        assert!(ObjectKey::new(&"k".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }
}
