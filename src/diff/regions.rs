//! Intra-line change-region detection.
//!
//! Given one old line and one new line, narrows the pair down to the
//! character ranges that actually differ so the renderer can highlight just
//! those. Lines that changed too much get no sub-highlight at all.

use crate::domain::ChangeRegion;
use similar::{DiffTag, TextDiff};

/// Line pairs less similar than this get no intra-line highlight; most of the
/// line changed, so highlighting fragments would only add noise.
const SIMILARITY_FLOOR: f32 = 0.6;

/// Equal runs shorter than this are folded into the surrounding changed
/// regions instead of splitting them.
const MIN_EQUAL_RUN: usize = 3;

/// Finds the changed character ranges between a pair of lines.
///
/// Returns parallel region lists for the old and new side; both are empty
/// when either line is absent (pure insert/delete rows) or when the pair is
/// too dissimilar to usefully sub-highlight.
pub fn changed_regions(
    old_line: Option<&str>,
    new_line: Option<&str>,
) -> (Vec<ChangeRegion>, Vec<ChangeRegion>) {
    let (Some(old_line), Some(new_line)) = (old_line, new_line) else {
        return (Vec::new(), Vec::new());
    };

    let diff = TextDiff::from_chars(old_line, new_line);
    if diff.ratio() < SIMILARITY_FLOOR {
        return (Vec::new(), Vec::new());
    }

    let old_chars: Vec<char> = old_line.chars().collect();
    let new_chars: Vec<char> = new_line.chars().collect();

    let mut old_regions: Vec<ChangeRegion> = Vec::new();
    let mut new_regions: Vec<ChangeRegion> = Vec::new();
    // Carry-back window (old, new): length of a preceding short equal run
    // that the next changed region should absorb.
    let mut back = (0usize, 0usize);

    for op in diff.ops() {
        let (i, j) = (op.old_range(), op.new_range());

        if op.tag() == DiffTag::Equal {
            if i.len() < MIN_EQUAL_RUN || j.len() < MIN_EQUAL_RUN {
                back = (i.len(), j.len());
            }
            continue;
        }

        let old_span = (i.start - back.0, i.end);
        let new_span = (j.start - back.1, j.end);
        back = (0, 0);

        push_region(&mut old_regions, old_span, &old_chars);
        push_region(&mut new_regions, new_span, &new_chars);
    }

    (old_regions, new_regions)
}

fn push_region(regions: &mut Vec<ChangeRegion>, span: ChangeRegion, chars: &[char]) {
    let (start, end) = span;

    // Carry-back can make spans overlap the previous region; coalesce them.
    if let Some(last) = regions.last_mut()
        && start <= last.1
        && last.1 < end
    {
        last.1 = end;
        return;
    }

    // Whitespace-only spans are dropped; zero-width spans are kept because
    // they mark a pure insertion/deletion point.
    let text = &chars[start..end];
    if !text.is_empty() && text.iter().all(|c| c.is_whitespace()) {
        return;
    }

    regions.push(span);
}
