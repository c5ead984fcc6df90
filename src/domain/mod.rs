//! Core data model for side-by-side diff rendering.

pub mod error;

use serde::Serialize;
use std::fmt;

/// Relationship between the old-side and new-side span of an opcode, and the
/// change kind of a rendered chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl fmt::Display for ChangeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            ChangeTag::Equal => "equal",
            ChangeTag::Insert => "insert",
            ChangeTag::Delete => "delete",
            ChangeTag::Replace => "replace",
        };
        f.write_str(word)
    }
}

/// One aligned span pairing old lines `[i1, i2)` with new lines `[j1, j2)`.
///
/// Consecutive opcodes abut with no gaps or overlaps, and together they cover
/// both input sequences exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: ChangeTag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}

impl Opcode {
    pub fn new(tag: ChangeTag, i1: usize, i2: usize, j1: usize, j2: usize) -> Self {
        Self { tag, i1, i2, j1, j2 }
    }

    pub fn old_len(&self) -> usize {
        self.i2 - self.i1
    }

    pub fn new_len(&self) -> usize {
        self.j2 - self.j1
    }
}

/// Half-open character index range within a single line that changed relative
/// to its paired line. A zero-width range marks the point where text was
/// inserted on the other side.
pub type ChangeRegion = (usize, usize);

/// One rendered row of the side-by-side table.
///
/// Line numbers are 1-based; a side with no corresponding physical line (pure
/// insert or delete) has `None` and empty markup.
#[derive(Debug, Clone, Serialize)]
pub struct DiffLine {
    pub vlinenum: usize,
    pub old_linenum: Option<usize>,
    pub old_markup: String,
    pub old_regions: Vec<ChangeRegion>,
    pub new_linenum: Option<usize>,
    pub new_markup: String,
    pub new_regions: Vec<ChangeRegion>,
}

/// A contiguous, independently collapsible unit of rendered diff output.
#[derive(Debug, Clone, Serialize)]
pub struct DiffChunk {
    pub lines: Vec<DiffLine>,
    pub numlines: usize,
    pub change: ChangeTag,
    pub collapsible: bool,
}

/// Address of a chunk within a multi-file diff: `"<file>.<chunk>"`, where
/// `file` is 1-based and `chunk` is the 0-based position in the file's chunk
/// list. Also accepts the `"chunk.<file>.<chunk>"` anchor form used in
/// rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkId {
    pub file: usize,
    pub chunk: usize,
}

impl ChunkId {
    pub fn parse(s: &str) -> Option<ChunkId> {
        let parts: Vec<&str> = s.split('.').collect();
        let (file, chunk) = match parts.as_slice() {
            [file, chunk] => (file, chunk),
            ["chunk", file, chunk] => (file, chunk),
            _ => return None,
        };
        Some(ChunkId {
            file: file.parse().ok()?,
            chunk: chunk.parse().ok()?,
        })
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.file, self.chunk)
    }
}

/// Summary statistics derived from a chunk list. Always recomputed wholesale
/// when chunks are (re)loaded, never mutated piecemeal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub has_changes: bool,
    pub num_changes: usize,
    pub num_changed_lines: usize,
}

impl DiffStats {
    pub fn from_chunks(chunks: &[DiffChunk]) -> Self {
        let mut stats = DiffStats::default();
        for chunk in chunks {
            if chunk.change != ChangeTag::Equal {
                stats.has_changes = true;
                stats.num_changes += 1;
                stats.num_changed_lines += chunk.numlines;
            }
        }
        stats
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.num_changed_lines == 0 {
            write!(f, "no changes")
        } else if self.num_changed_lines == 1 {
            write!(f, "1 changed line")
        } else if self.num_changes == 1 {
            write!(f, "{} lines changed in 1 section", self.num_changed_lines)
        } else {
            write!(
                f,
                "{} lines changed in {} sections",
                self.num_changed_lines, self.num_changes
            )
        }
    }
}
