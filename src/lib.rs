//! Side-by-side HTML diff rendering.
//!
//! Pipeline: a unified diff is split per file; each file's before/after text
//! is obtained (from disk plus the external `patch` tool, or reconstructed
//! from the patch alone), aligned into opcodes, and folded into renderable
//! chunks with long unchanged runs collapsed behind a context window.
//! Changed line pairs additionally carry the character ranges that differ.

pub mod diff;
pub mod domain;
pub mod infra;
pub mod item;
pub mod render;

pub use domain::error::DiffError;
pub use domain::{ChangeTag, ChunkId, DiffChunk, DiffLine, DiffStats, Opcode};
pub use item::{DiffItem, DiffOptions, SideBySideDiff};
