//! Named tool operations for automated callers.
//!
//! A thin capability wrapper over [`Workspace`] exposing the four named
//! mutations - `edit`, `create`, `delete`, `append` - each taking
//! `(key, path, content?)` as plain strings and returning the status
//! token [`STATUS_OK`]. It carries no logic of its own: keys are
//! validated, failures are logged and propagated unchanged.

use crate::{ObjectKey, Result, Workspace};

/// Status token returned by every successful tool operation.
pub const STATUS_OK: &str = "OK";

/// The tool-invocation surface over a workspace.
pub struct ToolSurface {
    workspace: Workspace,
}

impl ToolSurface {
    /// Wraps a workspace.
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    /// Overwrites the entry at `path` with `content`.
    pub fn edit(&self, key: &str, path: &str, content: &str) -> Result<&'static str> {
        let key = ObjectKey::new(key)?;
        self.run("edit", path, || {
            self.workspace.write_entry(&key, path, content)
        })
    }

    /// Creates the entry at `path` if it does not already exist.
    pub fn create(&self, key: &str, path: &str, content: &str) -> Result<&'static str> {
        let key = ObjectKey::new(key)?;
        self.run("create", path, || {
            self.workspace.create_entry(&key, path, content)
        })
    }

    /// Deletes the entry at `path`.
    pub fn delete(&self, key: &str, path: &str) -> Result<&'static str> {
        let key = ObjectKey::new(key)?;
        self.run("delete", path, || self.workspace.delete_entry(&key, path))
    }

    /// Appends `content` to the entry at `path`.
    pub fn append(&self, key: &str, path: &str, content: &str) -> Result<&'static str> {
        let key = ObjectKey::new(key)?;
        self.run("append", path, || {
            self.workspace.append_entry(&key, path, content)
        })
    }

    fn run(
        &self,
        operation: &str,
        path: &str,
        f: impl FnOnce() -> Result<()>,
    ) -> Result<&'static str> {
        match f() {
            Ok(()) => Ok(STATUS_OK),
            Err(e) => {
                log::error!("{} of '{}' failed: {}", operation, path, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryGateway;
    use crate::write::Writer;
    use std::io::Cursor;
    use std::sync::Arc;

    fn surface() -> (ToolSurface, String) {
        let workspace = Workspace::new(Arc::new(MemoryGateway::new()));

        let mut upload = Cursor::new(Vec::new());
        let mut writer = Writer::new(&mut upload);
        writer.add_entry("a.txt", b"alpha").unwrap();
        let _ = writer.finish().unwrap();
        upload.set_position(0);
        let key = workspace.upload_archive("seed.zip", &mut upload).unwrap();
        (ToolSurface::new(workspace.clone()), key.to_string())
    }

    #[test]
    fn test_edit_returns_ok() {
        let (tools, key) = surface();
        assert_eq!(tools.edit(&key, "a.txt", "changed").unwrap(), STATUS_OK);
    }

    #[test]
    fn test_create_append_delete() {
        let (tools, key) = surface();
        assert_eq!(tools.create(&key, "b.txt", "base").unwrap(), STATUS_OK);
        assert_eq!(tools.append(&key, "b.txt", "+more").unwrap(), STATUS_OK);
        assert_eq!(tools.delete(&key, "a.txt").unwrap(), STATUS_OK);
    }

    #[test]
    fn test_invalid_key_rejected() {
        let (tools, _) = surface();
        assert!(tools.edit("bad/key.zip", "a.txt", "x").is_err());
    }
}
