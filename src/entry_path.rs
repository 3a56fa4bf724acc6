//! Validated entry path type.

use crate::{Error, Result};
use std::fmt;

/// Maximum length for entry paths (in bytes).
///
/// Keeps a hostile caller from forcing oversized central directory records.
/// 4KB matches the most generous real filesystem path limit.
const MAX_PATH_LENGTH: usize = 4096;

/// A validated path for an entry inside an archive object.
///
/// `EntryPath` is the form in which callers address entries. Segments are
/// `/`-separated (denoting virtual directories) and validated so that a
/// path can never escape the archive namespace when entries are later
/// materialized on a real filesystem:
///
/// - no NUL bytes
/// - not empty, not absolute (no leading `/`)
/// - no empty segments (`a//b`), no trailing slash
/// - no `.` or `..` segments
///
/// Paths read out of an existing container are surfaced as stored; this
/// type constrains what callers may create or target.
///
/// # Examples
///
/// ```
/// use zipfs::EntryPath;
///
/// let path = EntryPath::new("docs/readme.txt").unwrap();
/// assert_eq!(path.as_str(), "docs/readme.txt");
///
/// assert!(EntryPath::new("../escape").is_err());
/// assert!(EntryPath::new("/absolute").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryPath(String);

impl EntryPath {
    /// Creates a new `EntryPath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryPath`] if the path is empty, absolute,
    /// oversized, contains NUL bytes, empty segments, or `.`/`..` segments.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(Error::InvalidEntryPath("empty path".into()));
        }
        if s.contains('\0') {
            return Err(Error::InvalidEntryPath("contains NUL byte".into()));
        }
        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidEntryPath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }
        if s.starts_with('/') {
            return Err(Error::InvalidEntryPath("absolute path not allowed".into()));
        }
        if s.ends_with('/') {
            return Err(Error::InvalidEntryPath("trailing slash not allowed".into()));
        }
        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidEntryPath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." || segment == ".." {
                return Err(Error::InvalidEntryPath(format!(
                    "'{}' segment not allowed (path traversal)",
                    segment
                )));
            }
        }
        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }
}

impl AsRef<str> for EntryPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for EntryPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntryPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}
