//! Chunk building: turns an opcode stream plus line/markup arrays into the
//! ordered list of renderable chunks, collapsing long unchanged runs behind
//! a context window.

use crate::diff::regions::changed_regions;
use crate::domain::{ChangeTag, DiffChunk, DiffLine, Opcode};

pub const DEFAULT_CONTEXT_LINES: usize = 5;

/// Builds renderable chunks from an opcode stream.
///
/// `context_lines` is the number of unchanged lines kept visible at each
/// boundary of a collapsed run.
#[derive(Debug, Clone, Copy)]
pub struct ChunkBuilder {
    context_lines: usize,
}

impl Default for ChunkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LINES)
    }
}

impl ChunkBuilder {
    pub fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }

    /// Line count an equal run must exceed before its interior collapses.
    pub fn collapse_threshold(&self) -> usize {
        2 * self.context_lines + 3
    }

    /// Builds the chunk list for one file.
    ///
    /// `old_markup`/`new_markup` are parallel to `old_lines`/`new_lines`,
    /// one markup string per line. Chunks come out in file order; their
    /// concatenated rows cover every virtual line exactly once, and no
    /// changed line is ever inside a collapsible chunk.
    ///
    /// Panics when the opcode spans do not tile the inputs; that is a bug in
    /// the opcode source, not a recoverable condition.
    pub fn build(
        &self,
        opcodes: &[Opcode],
        old_lines: &[String],
        new_lines: &[String],
        old_markup: &[String],
        new_markup: &[String],
    ) -> Vec<DiffChunk> {
        verify_tiling(opcodes, old_lines.len(), new_lines.len());
        debug_assert_eq!(old_lines.len(), old_markup.len());
        debug_assert_eq!(new_lines.len(), new_markup.len());

        let collapse_threshold = self.collapse_threshold();
        let mut chunks: Vec<DiffChunk> = Vec::new();
        let mut vlinenum = 1usize;

        for op in opcodes {
            let numlines = op.old_len().max(op.new_len());
            let lines = build_rows(op, vlinenum, old_lines, new_lines, old_markup, new_markup);
            vlinenum += numlines;

            if op.tag == ChangeTag::Equal && numlines > collapse_threshold {
                let last_range_start = numlines - self.context_lines;

                if chunks.is_empty() {
                    // Top of the file: nothing above needs context, so only
                    // the trailing window stays visible.
                    push_equal(&mut chunks, &lines, 0, last_range_start, true);
                    push_equal(&mut chunks, &lines, last_range_start, numlines, false);
                } else {
                    push_equal(&mut chunks, &lines, 0, self.context_lines, false);

                    if op.i2 == old_lines.len() && op.j2 == new_lines.len() {
                        // Run reaches the end of the file: collapse straight
                        // through to the end, no trailing window.
                        push_equal(&mut chunks, &lines, self.context_lines, numlines, true);
                    } else {
                        push_equal(&mut chunks, &lines, self.context_lines, last_range_start, true);
                        push_equal(&mut chunks, &lines, last_range_start, numlines, false);
                    }
                }
            } else {
                chunks.push(DiffChunk {
                    lines,
                    numlines,
                    change: op.tag,
                    collapsible: false,
                });
            }
        }

        chunks
    }
}

fn build_rows(
    op: &Opcode,
    first_vlinenum: usize,
    old_lines: &[String],
    new_lines: &[String],
    old_markup: &[String],
    new_markup: &[String],
) -> Vec<DiffLine> {
    let numlines = op.old_len().max(op.new_len());
    let mut rows = Vec::with_capacity(numlines);

    for k in 0..numlines {
        let oi = op.i1 + k;
        let nj = op.j1 + k;
        let old = (oi < op.i2).then(|| old_lines[oi].as_str());
        let new = (nj < op.j2).then(|| new_lines[nj].as_str());

        let (old_regions, new_regions) = match (old, new) {
            (Some(o), Some(n)) if o != n => changed_regions(Some(o), Some(n)),
            _ => (Vec::new(), Vec::new()),
        };

        rows.push(DiffLine {
            vlinenum: first_vlinenum + k,
            old_linenum: old.map(|_| oi + 1),
            old_markup: old.map(|_| old_markup[oi].clone()).unwrap_or_default(),
            old_regions,
            new_linenum: new.map(|_| nj + 1),
            new_markup: new.map(|_| new_markup[nj].clone()).unwrap_or_default(),
            new_regions,
        });
    }

    rows
}

fn push_equal(chunks: &mut Vec<DiffChunk>, lines: &[DiffLine], start: usize, end: usize, collapsible: bool) {
    chunks.push(DiffChunk {
        lines: lines[start..end].to_vec(),
        numlines: end - start,
        change: ChangeTag::Equal,
        collapsible,
    });
}

// Opcode spans must abut and exactly cover both inputs; anything else means
// the opcode source is broken and continuing would render garbage.
fn verify_tiling(opcodes: &[Opcode], old_len: usize, new_len: usize) {
    let (mut i, mut j) = (0usize, 0usize);
    for op in opcodes {
        assert!(
            op.i1 == i && op.j1 == j && op.i2 >= op.i1 && op.j2 >= op.j1,
            "opcode spans do not tile the input: {op:?} expected at ({i}, {j})"
        );
        i = op.i2;
        j = op.j2;
    }
    assert!(
        i == old_len && j == new_len,
        "opcode spans do not cover the input: reached ({i}, {j}) of ({old_len}, {new_len})"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::aligner::{LineAligner, MyersAligner};

    fn lines(n: usize, prefix: &str) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    fn build_equal_run(total: usize, context: usize, with_change_after: bool) -> Vec<DiffChunk> {
        let mut old = lines(total, "ctx");
        let mut new = old.clone();
        let mut opcodes = vec![Opcode::new(ChangeTag::Equal, 0, total, 0, total)];
        if with_change_after {
            old.push("old tail".to_string());
            new.push("new tail".to_string());
            opcodes.push(Opcode::new(ChangeTag::Replace, total, total + 1, total, total + 1));
        }
        let old_markup = old.clone();
        let new_markup = new.clone();
        ChunkBuilder::new(context).build(&opcodes, &old, &new, &old_markup, &new_markup)
    }

    fn assert_coverage(chunks: &[DiffChunk], expected_total: usize) {
        let mut expected = 1usize;
        for chunk in chunks {
            assert_eq!(chunk.numlines, chunk.lines.len());
            for line in &chunk.lines {
                assert_eq!(line.vlinenum, expected);
                expected += 1;
            }
        }
        assert_eq!(expected - 1, expected_total);
    }

    #[test]
    fn test_run_at_threshold_not_split() {
        // threshold = 2*5 + 3 = 13
        let chunks = build_equal_run(13, 5, true);
        assert_eq!(chunks.len(), 2);
        assert!(!chunks[0].collapsible);
        assert_eq!(chunks[0].numlines, 13);
    }

    #[test]
    fn test_first_chunk_collapses_all_but_trailing_context() {
        let chunks = build_equal_run(14, 5, true);
        // 14 > 13: leading chunk is the very first in the file, so only the
        // trailing context window stays visible.
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].collapsible);
        assert_eq!(chunks[0].numlines, 9);
        assert!(!chunks[1].collapsible);
        assert_eq!(chunks[1].numlines, 5);
        assert_eq!(chunks[2].change, ChangeTag::Replace);
        assert_coverage(&chunks, 15);
    }

    #[test]
    fn test_trailing_run_collapses_through_to_end() {
        let total = 20;
        let old: Vec<String> = std::iter::once("old head".to_string())
            .chain(lines(total, "ctx"))
            .collect();
        let new: Vec<String> = std::iter::once("new head".to_string())
            .chain(lines(total, "ctx"))
            .collect();
        let opcodes = vec![
            Opcode::new(ChangeTag::Replace, 0, 1, 0, 1),
            Opcode::new(ChangeTag::Equal, 1, total + 1, 1, total + 1),
        ];
        let chunks = ChunkBuilder::new(5).build(&opcodes, &old, &new, &old.clone(), &new.clone());
        // replace + leading context + one collapsible tail to EOF
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].change, ChangeTag::Replace);
        assert!(!chunks[1].collapsible);
        assert_eq!(chunks[1].numlines, 5);
        assert!(chunks[2].collapsible);
        assert_eq!(chunks[2].numlines, total - 5);
        assert_coverage(&chunks, total + 1);
    }

    #[test]
    fn test_interior_run_keeps_both_windows() {
        let total = 20;
        let mut old = vec!["old head".to_string()];
        old.extend(lines(total, "ctx"));
        old.push("old tail".to_string());
        let mut new = vec!["new head".to_string()];
        new.extend(lines(total, "ctx"));
        new.push("new tail".to_string());
        let opcodes = vec![
            Opcode::new(ChangeTag::Replace, 0, 1, 0, 1),
            Opcode::new(ChangeTag::Equal, 1, total + 1, 1, total + 1),
            Opcode::new(ChangeTag::Replace, total + 1, total + 2, total + 1, total + 2),
        ];
        let chunks = ChunkBuilder::new(5).build(&opcodes, &old, &new, &old.clone(), &new.clone());
        assert_eq!(chunks.len(), 5);
        let equal_runs: Vec<_> = chunks.iter().filter(|c| c.change == ChangeTag::Equal).collect();
        assert_eq!(equal_runs.len(), 3);
        assert_eq!(equal_runs[0].numlines, 5);
        assert!(equal_runs[1].collapsible);
        assert_eq!(equal_runs[1].numlines, total - 10);
        assert_eq!(equal_runs[2].numlines, 5);
        assert_coverage(&chunks, total + 2);
    }

    #[test]
    fn test_changed_chunks_never_collapsible() {
        let old = lines(40, "a");
        let new = lines(40, "b");
        let opcodes = vec![Opcode::new(ChangeTag::Replace, 0, 40, 0, 40)];
        let chunks = ChunkBuilder::default().build(&opcodes, &old, &new, &old.clone(), &new.clone());
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].collapsible);
    }

    #[test]
    fn test_uneven_replace_pads_with_blank_side() {
        let old = lines(3, "old");
        let new = lines(1, "new");
        let opcodes = vec![Opcode::new(ChangeTag::Replace, 0, 3, 0, 1)];
        let chunks = ChunkBuilder::default().build(&opcodes, &old, &new, &old.clone(), &new.clone());
        let rows = &chunks[0].lines;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].new_linenum, Some(1));
        assert_eq!(rows[1].new_linenum, None);
        assert_eq!(rows[1].new_markup, "");
        assert_eq!(rows[2].old_linenum, Some(3));
        assert!(rows[1].new_regions.is_empty());
    }

    #[test]
    fn test_spec_scenario_fifteen_lines() {
        // Fifteen lines; the eighth differs by one trailing character.
        let mut old: Vec<String> = ('a'..='o').map(|c| c.to_string()).collect();
        let mut new = old.clone();
        old[7] = "h = 1".to_string();
        new[7] = "h = 2".to_string();

        let opcodes = MyersAligner.align(&old, &new);
        assert_eq!(
            opcodes,
            vec![
                Opcode::new(ChangeTag::Equal, 0, 7, 0, 7),
                Opcode::new(ChangeTag::Replace, 7, 8, 7, 8),
                Opcode::new(ChangeTag::Equal, 8, 15, 8, 15),
            ]
        );

        // Neither equal run exceeds the threshold of 13, so exactly three
        // chunks come out and the middle one carries the region highlight.
        let chunks = ChunkBuilder::new(5).build(&opcodes, &old, &new, &old.clone(), &new.clone());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].change, ChangeTag::Replace);
        assert!(!chunks[1].collapsible);
        assert_eq!(chunks[1].lines.len(), 1);
        assert_eq!(chunks[1].lines[0].old_regions, vec![(4, 5)]);
        assert_eq!(chunks[1].lines[0].new_regions, vec![(4, 5)]);
        assert_coverage(&chunks, 15);
    }

    #[test]
    #[should_panic(expected = "tile")]
    fn test_gapped_opcodes_panic() {
        let old = lines(4, "x");
        let new = lines(4, "x");
        let opcodes = vec![
            Opcode::new(ChangeTag::Equal, 0, 2, 0, 2),
            Opcode::new(ChangeTag::Equal, 3, 4, 3, 4),
        ];
        ChunkBuilder::default().build(&opcodes, &old, &new, &old.clone(), &new.clone());
    }
}
