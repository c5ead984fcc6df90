//! Pluggable line-sequence alignment strategies.
//!
//! Both strategies delegate to `similar` and differ only in the algorithm
//! used; the rest of the pipeline consumes the shared [`Opcode`] contract and
//! never cares which one produced the stream.

use crate::domain::error::DiffError;
use crate::domain::{ChangeTag, Opcode};
use similar::{Algorithm, DiffOp, DiffTag, capture_diff_slices};

pub const DEFAULT_COMPAT_VERSION: u32 = 1;

/// Alignment of two ordered line sequences into an opcode stream.
pub trait LineAligner {
    fn align(&self, old: &[String], new: &[String]) -> Vec<Opcode>;
}

/// Compat version 0: LCS alignment, closest to difflib-style matching.
pub struct LcsAligner;

/// Compat version 1: Myers alignment.
pub struct MyersAligner;

impl LineAligner for LcsAligner {
    fn align(&self, old: &[String], new: &[String]) -> Vec<Opcode> {
        capture(Algorithm::Lcs, old, new)
    }
}

impl LineAligner for MyersAligner {
    fn align(&self, old: &[String], new: &[String]) -> Vec<Opcode> {
        capture(Algorithm::Myers, old, new)
    }
}

/// Factory returning the aligner for a compatibility version.
pub fn aligner_for_version(version: u32) -> Result<Box<dyn LineAligner>, DiffError> {
    match version {
        0 => Ok(Box::new(LcsAligner)),
        1 => Ok(Box::new(MyersAligner)),
        other => Err(DiffError::UnsupportedCompatVersion(other)),
    }
}

fn capture(algorithm: Algorithm, old: &[String], new: &[String]) -> Vec<Opcode> {
    capture_diff_slices(algorithm, old, new)
        .iter()
        .map(to_opcode)
        .collect()
}

pub(crate) fn to_opcode(op: &DiffOp) -> Opcode {
    let tag = match op.tag() {
        DiffTag::Equal => ChangeTag::Equal,
        DiffTag::Insert => ChangeTag::Insert,
        DiffTag::Delete => ChangeTag::Delete,
        DiffTag::Replace => ChangeTag::Replace,
    };
    let (old, new) = (op.old_range(), op.new_range());
    Opcode::new(tag, old.start, old.end, new.start, new.end)
}
