//! Edit instruction model and wire parsing.

use serde::Deserialize;

use crate::{EntryPath, Error, Result};

/// The mutation requested for one entry path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Create the entry or overwrite whatever exists at the path.
    Replace(Vec<u8>),
    /// Concatenate onto the entry's current content (empty if absent).
    Append(Vec<u8>),
    /// Omit the entry from the rebuilt archive.
    Delete,
}

impl EditAction {
    /// Returns the action name as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            EditAction::Replace(_) => "replace",
            EditAction::Append(_) => "append",
            EditAction::Delete => "delete",
        }
    }
}

/// One requested mutation targeting one entry path.
///
/// Batches of instructions are the sole input of the rebuilder: every
/// mutating operation, single-entry or bulk, is expressed as a batch.
///
/// # Wire format
///
/// Batches arrive as a JSON array of records:
///
/// ```json
/// [
///   {"file": "src/main.go", "action": "replace", "content": "package main\n"},
///   {"file": "notes.txt", "action": "append", "content": "more\n"},
///   {"file": "old.txt", "action": "delete"}
/// ]
/// ```
///
/// `content` is required for `replace` and `append` and ignored for
/// `delete`; unknown actions are rejected. See
/// [`parse_batch`](EditInstruction::parse_batch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditInstruction {
    /// The entry path this instruction targets.
    pub path: EntryPath,
    /// The requested mutation.
    pub action: EditAction,
}

impl EditInstruction {
    /// Creates a replace instruction (create-or-overwrite).
    pub fn replace(path: &str, content: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self {
            path: EntryPath::new(path)?,
            action: EditAction::Replace(content.into()),
        })
    }

    /// Creates an append instruction.
    pub fn append(path: &str, content: impl Into<Vec<u8>>) -> Result<Self> {
        Ok(Self {
            path: EntryPath::new(path)?,
            action: EditAction::Append(content.into()),
        })
    }

    /// Creates a delete instruction.
    pub fn delete(path: &str) -> Result<Self> {
        Ok(Self {
            path: EntryPath::new(path)?,
            action: EditAction::Delete,
        })
    }

    /// Parses a serialized instruction batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstruction`] if the payload is not a JSON
    /// array of instruction records, an action is unknown, or `content` is
    /// missing for a replace/append; [`Error::InvalidEntryPath`] if a
    /// `file` value fails path validation. Batch-level validation (empty
    /// batches, delete conflicts) happens downstream so that directly
    /// constructed batches get the same checks.
    pub fn parse_batch(payload: &str) -> Result<Vec<Self>> {
        let raw: Vec<RawInstruction> =
            serde_json::from_str(payload).map_err(|e| Error::InvalidInstruction {
                reason: format!("malformed instruction list: {}", e),
            })?;
        raw.into_iter().map(Self::try_from).collect()
    }
}

/// Wire shape of one instruction record.
#[derive(Debug, Deserialize)]
struct RawInstruction {
    file: String,
    action: String,
    #[serde(default)]
    content: Option<String>,
}

impl TryFrom<RawInstruction> for EditInstruction {
    type Error = Error;

    fn try_from(raw: RawInstruction) -> Result<Self> {
        let path = EntryPath::new(&raw.file)?;
        let action = match raw.action.as_str() {
            "replace" => EditAction::Replace(require_content(&raw, "replace")?.into_bytes()),
            "append" => EditAction::Append(require_content(&raw, "append")?.into_bytes()),
            "delete" => EditAction::Delete,
            other => {
                return Err(Error::InvalidInstruction {
                    reason: format!("unknown action '{}' for '{}'", other, raw.file),
                });
            }
        };
        Ok(Self { path, action })
    }
}

fn require_content(raw: &RawInstruction, action: &str) -> Result<String> {
    raw.content.clone().ok_or_else(|| Error::InvalidInstruction {
        reason: format!("missing content for {} of '{}'", action, raw.file),
    })
}
