//! The archive rebuilder.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek, Write};

use crate::read::Archive;
use crate::write::Writer;
use crate::{Error, Result};

use super::{EditAction, EditInstruction};

/// Result of a rebuild.
#[must_use = "rebuild result should be checked to verify the batch applied as expected"]
#[derive(Debug, Clone, Default)]
pub struct RebuildResult {
    /// Entries copied unchanged (raw, byte-for-byte).
    pub entries_kept: usize,
    /// Existing entries overwritten by a replace.
    pub entries_replaced: usize,
    /// Existing entries extended by an append.
    pub entries_appended: usize,
    /// Entries omitted by a delete.
    pub entries_deleted: usize,
    /// Entries newly created by a replace/append of an absent path.
    pub entries_added: usize,
    /// Total uncompressed bytes in the rebuilt archive.
    pub total_bytes: u64,
}

impl RebuildResult {
    /// Returns the total number of entries in the rebuilt archive.
    pub fn total_entries(&self) -> usize {
        self.entries_kept + self.entries_replaced + self.entries_appended + self.entries_added
    }
}

/// Applies a batch of edit instructions to an existing archive, producing
/// a new one.
///
/// This is the sole writer of archive objects: every mutating operation,
/// single-entry or bulk, funnels through one `apply` call. The rebuild
/// guarantees:
///
/// - every source entry not targeted by a replace or delete is copied to
///   the output unchanged (compressed bytes and captured metadata exactly);
/// - a `replace` writes the instruction's content at the path, creating it
///   if absent (create-or-overwrite);
/// - a `delete` omits the path from the output entirely;
/// - an `append` writes the source content (empty if the path was absent)
///   concatenated with the instruction's content;
/// - output paths are unique; survivors keep source order, then paths the
///   batch introduces follow in batch order.
///
/// # Batch resolution
///
/// Within one batch, the last replace/append targeting a path wins and is
/// applied once against the pre-batch content. A path targeted by both a
/// delete and a replace/append has no coherent precedence and the whole
/// batch is rejected with
/// [`Error::InvalidInstruction`] before anything is written.
///
/// An empty batch is a valid identity rebuild here (same paths, same
/// content per path; framing bytes may differ). Rejecting empty batches
/// from callers is the operation layer's concern.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use zipfs::{Archive, EditInstruction, Rebuilder, Writer};
///
/// # fn main() -> zipfs::Result<()> {
/// # let mut bytes = Cursor::new(Vec::new());
/// # let mut w = Writer::new(&mut bytes);
/// # w.add_entry("keep.txt", b"kept")?;
/// # w.add_entry("old.txt", b"old")?;
/// # let _ = w.finish()?;
/// # bytes.set_position(0);
/// let archive = Archive::open(bytes)?;
/// let batch = vec![
///     EditInstruction::replace("new.txt", "fresh")?,
///     EditInstruction::delete("old.txt")?,
/// ];
///
/// let mut out = Cursor::new(Vec::new());
/// let result = Rebuilder::new(archive).apply(&batch, &mut out)?;
/// assert_eq!(result.entries_kept, 1);
/// assert_eq!(result.entries_deleted, 1);
/// assert_eq!(result.entries_added, 1);
/// # Ok(())
/// # }
/// ```
pub struct Rebuilder<R: Read + Seek> {
    archive: Archive<R>,
}

impl<R: Read + Seek> Rebuilder<R> {
    /// Creates a rebuilder over the source archive.
    pub fn new(archive: Archive<R>) -> Self {
        Self { archive }
    }

    /// Returns the source archive.
    pub fn archive(&self) -> &Archive<R> {
        &self.archive
    }

    /// Applies the batch, writing the rebuilt container to `out`.
    ///
    /// Nothing about the source is mutated; on error the output stream
    /// holds a partial container the caller must discard (the operation
    /// layer writes into a scratch copy and only publishes on success).
    pub fn apply<W: Write>(mut self, batch: &[EditInstruction], out: W) -> Result<RebuildResult> {
        let plan = BatchPlan::resolve(batch)?;
        let mut writer = Writer::new(out);
        let mut result = RebuildResult::default();

        for index in 0..self.archive.len() {
            let entry = self.archive.entries()[index].clone();
            if plan.deletes.contains(entry.path.as_str()) {
                result.entries_deleted += 1;
                continue;
            }
            match plan.upsert_for(&entry.path) {
                Some(&Upsert::Replace(content)) => {
                    writer.add_entry(&entry.path, content)?;
                    result.entries_replaced += 1;
                }
                Some(&Upsert::Append(content)) => {
                    let mut data = self.archive.read_to_vec_by_index(index)?;
                    data.extend_from_slice(content);
                    writer.add_entry(&entry.path, &data)?;
                    result.entries_appended += 1;
                }
                None => {
                    let raw = self.archive.read_raw_by_index(index)?;
                    writer.copy_raw(&entry, &raw)?;
                    result.entries_kept += 1;
                }
            }
        }

        // Paths the batch introduces; an append against an absent path
        // creates it with just the appended content.
        for &(path, upsert) in &plan.upserts {
            if self.archive.contains(path) {
                continue;
            }
            let content = match upsert {
                Upsert::Replace(content) | Upsert::Append(content) => content,
            };
            writer.add_entry(path, content)?;
            result.entries_added += 1;
        }

        let write_result = writer.finish()?;
        result.total_bytes = write_result.total_size;
        Ok(result)
    }
}

/// A replace/append resolved for one path.
#[derive(Debug, Clone, Copy)]
enum Upsert<'a> {
    Replace(&'a [u8]),
    Append(&'a [u8]),
}

/// A batch resolved into per-path effects.
#[derive(Debug, Default)]
struct BatchPlan<'a> {
    deletes: HashSet<&'a str>,
    /// First-occurrence order; content from the last instruction to target
    /// the path.
    upserts: Vec<(&'a str, Upsert<'a>)>,
    index: HashMap<&'a str, usize>,
}

impl<'a> BatchPlan<'a> {
    fn resolve(batch: &'a [EditInstruction]) -> Result<Self> {
        let mut plan = Self::default();
        for instruction in batch {
            let path = instruction.path.as_str();
            match &instruction.action {
                EditAction::Delete => {
                    if plan.index.contains_key(path) {
                        return Err(conflict(path));
                    }
                    plan.deletes.insert(path);
                }
                EditAction::Replace(content) => {
                    plan.push_upsert(path, Upsert::Replace(content))?;
                }
                EditAction::Append(content) => {
                    plan.push_upsert(path, Upsert::Append(content))?;
                }
            }
        }
        Ok(plan)
    }

    fn push_upsert(&mut self, path: &'a str, upsert: Upsert<'a>) -> Result<()> {
        if self.deletes.contains(path) {
            return Err(conflict(path));
        }
        match self.index.get(path) {
            Some(&slot) => self.upserts[slot].1 = upsert,
            None => {
                self.index.insert(path, self.upserts.len());
                self.upserts.push((path, upsert));
            }
        }
        Ok(())
    }

    fn upsert_for(&self, path: &str) -> Option<&Upsert<'a>> {
        self.index.get(path).map(|&slot| &self.upserts[slot].1)
    }
}

fn conflict(path: &str) -> Error {
    Error::InvalidInstruction {
        reason: format!(
            "path '{}' targeted by both delete and replace/append in one batch",
            path
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replace(path: &str, content: &str) -> EditInstruction {
        EditInstruction::replace(path, content).unwrap()
    }

    fn append(path: &str, content: &str) -> EditInstruction {
        EditInstruction::append(path, content).unwrap()
    }

    fn delete(path: &str) -> EditInstruction {
        EditInstruction::delete(path).unwrap()
    }

    #[test]
    fn test_plan_last_instruction_wins() {
        let batch = [replace("a", "first"), replace("a", "second")];
        let plan = BatchPlan::resolve(&batch).unwrap();
        assert_eq!(plan.upserts.len(), 1);
        match plan.upsert_for("a") {
            Some(&Upsert::Replace(content)) => assert_eq!(content, b"second"),
            other => panic!("unexpected upsert: {:?}", other),
        }
    }

    #[test]
    fn test_plan_last_wins_across_classes() {
        let batch = [replace("a", "whole"), append("a", "tail")];
        let plan = BatchPlan::resolve(&batch).unwrap();
        match plan.upsert_for("a") {
            Some(&Upsert::Append(content)) => assert_eq!(content, b"tail"),
            other => panic!("unexpected upsert: {:?}", other),
        }
    }

    #[test]
    fn test_plan_preserves_first_occurrence_order() {
        let batch = [
            replace("one", "1"),
            replace("two", "2"),
            replace("one", "1b"),
        ];
        let plan = BatchPlan::resolve(&batch).unwrap();
        let order: Vec<_> = plan.upserts.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, ["one", "two"]);
    }

    #[test]
    fn test_plan_rejects_delete_then_replace() {
        let batch = [delete("a"), replace("a", "x")];
        let err = BatchPlan::resolve(&batch).unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction { .. }));
    }

    #[test]
    fn test_plan_rejects_append_then_delete() {
        let batch = [append("a", "x"), delete("a")];
        let err = BatchPlan::resolve(&batch).unwrap_err();
        assert!(matches!(err, Error::InvalidInstruction { .. }));
    }

    #[test]
    fn test_plan_duplicate_deletes_allowed() {
        let batch = [delete("a"), delete("a"), delete("b")];
        let plan = BatchPlan::resolve(&batch).unwrap();
        assert_eq!(plan.deletes.len(), 2);
    }
}
