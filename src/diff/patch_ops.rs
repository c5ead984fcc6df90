//! Opcode derivation straight from a unified-diff's hunks.
//!
//! Used when no before/after file pair exists on disk: the `+`/`-`/context
//! classification of the patch itself is trusted verbatim, so no alignment
//! ever runs. Runs of same-kind lines are flushed into opcodes on each kind
//! transition, per hunk.

use crate::domain::{ChangeTag, Opcode};
use unidiff::Hunk;

/// Line contents and opcodes reconstructed from a patch alone.
#[derive(Debug, Default)]
pub struct PatchOpcodes {
    pub old_lines: Vec<String>,
    pub new_lines: Vec<String>,
    pub opcodes: Vec<Opcode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Context,
    Removed,
    Added,
}

/// Derives `(old_lines, new_lines, opcodes)` from the hunks of one file.
///
/// Context lines belong to both sides. Lines with any other prefix (e.g. the
/// "no newline" marker) are skipped. Opcode spans are running offsets into
/// the cumulative line buffers, so the result satisfies the tiling invariant
/// over the reconstructed sequences.
pub fn opcodes_from_hunks(hunks: &[Hunk]) -> PatchOpcodes {
    let mut out = PatchOpcodes::default();

    for hunk in hunks {
        let mut old_run: Vec<String> = Vec::new();
        let mut new_run: Vec<String> = Vec::new();
        let mut last_kind: Option<LineKind> = None;

        for line in hunk.lines() {
            let kind = if line.is_context() {
                LineKind::Context
            } else if line.is_removed() {
                LineKind::Removed
            } else if line.is_added() {
                LineKind::Added
            } else {
                continue;
            };

            if let Some(last) = last_kind
                && last != kind
                && let Some(tag) = transition_tag(last, kind, !old_run.is_empty())
            {
                flush(&mut out, tag, &mut old_run, &mut new_run);
            }
            last_kind = Some(kind);

            match kind {
                LineKind::Context => {
                    old_run.push(line.value.clone());
                    new_run.push(line.value.clone());
                }
                LineKind::Removed => old_run.push(line.value.clone()),
                LineKind::Added => new_run.push(line.value.clone()),
            }
        }

        if let Some(last) = last_kind {
            let tag = closing_tag(last, !old_run.is_empty());
            flush(&mut out, tag, &mut old_run, &mut new_run);
        }
    }

    out
}

/// Tag for a run being closed by a kind transition. A removed-to-added (or
/// added-to-removed) transition returns `None`: the run keeps accumulating
/// until a context line closes it, which is how a deletion and insertion in
/// the same run become a single replace.
fn transition_tag(last: LineKind, next: LineKind, has_old: bool) -> Option<ChangeTag> {
    match (last, next) {
        (LineKind::Context, _) => Some(ChangeTag::Equal),
        (LineKind::Added, LineKind::Context) => Some(if has_old {
            ChangeTag::Replace
        } else {
            ChangeTag::Insert
        }),
        (LineKind::Removed, LineKind::Context) => Some(ChangeTag::Delete),
        _ => None,
    }
}

fn closing_tag(last: LineKind, has_old: bool) -> ChangeTag {
    match last {
        LineKind::Context => ChangeTag::Equal,
        LineKind::Removed => ChangeTag::Delete,
        LineKind::Added => {
            if has_old {
                ChangeTag::Replace
            } else {
                ChangeTag::Insert
            }
        }
    }
}

fn flush(
    out: &mut PatchOpcodes,
    tag: ChangeTag,
    old_run: &mut Vec<String>,
    new_run: &mut Vec<String>,
) {
    let i1 = out.old_lines.len();
    let j1 = out.new_lines.len();
    out.opcodes.push(Opcode::new(
        tag,
        i1,
        i1 + old_run.len(),
        j1,
        j1 + new_run.len(),
    ));
    out.old_lines.append(old_run);
    out.new_lines.append(new_run);
}
