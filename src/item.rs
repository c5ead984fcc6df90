//! Per-file diff assembly and multi-file aggregation.

use crate::diff::{
    ChunkBuilder, DEFAULT_COMPAT_VERSION, DEFAULT_CONTEXT_LINES, aligner_for_version,
    opcodes_from_hunks,
};
use crate::domain::error::DiffError;
use crate::domain::{ChunkId, DiffChunk, DiffStats};
use crate::infra::highlight::{Highlighter, escape_lines};
use crate::infra::patch::{apply_patch, normalize_line_endings};
use std::path::PathBuf;
use unidiff::{PatchSet, PatchedFile};

const DEV_NULL: &str = "/dev/null";

/// Options shared by every file of one diff session.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Directory holding the pre-change files. `None` switches to patch-only
    /// reconstruction: contents and opcodes come straight from the hunks.
    pub cwd: Option<PathBuf>,
    pub syntax_highlighting: bool,
    pub context_lines: usize,
    pub compat_version: u32,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            syntax_highlighting: true,
            context_lines: DEFAULT_CONTEXT_LINES,
            compat_version: DEFAULT_COMPAT_VERSION,
        }
    }
}

/// One file of a diff: paths, the file's patch, and — once `load_chunks` has
/// run — the chunk list with its derived statistics.
///
/// Two-phase: construction only records inputs; `load_chunks` computes the
/// derived state and may be re-run, replacing chunks and statistics
/// wholesale.
#[derive(Debug)]
pub struct DiffItem {
    /// 1-based position within the diff, used in chunk anchors.
    pub index: usize,
    /// Source path with any `a/` prefix stripped.
    pub source_file: String,
    /// Target path with any `b/` prefix stripped.
    pub dest_file: String,
    /// Column labels, as spelled in the diff headers.
    pub source_label: String,
    pub dest_label: String,
    patch: PatchedFile,
    options: DiffOptions,
    chunks: Vec<DiffChunk>,
    stats: DiffStats,
    loaded: bool,
}

impl DiffItem {
    pub fn new(index: usize, patch: PatchedFile, options: DiffOptions) -> Self {
        Self {
            index,
            source_file: strip_git_prefix(&patch.source_file),
            dest_file: strip_git_prefix(&patch.target_file),
            source_label: patch.source_file.clone(),
            dest_label: patch.target_file.clone(),
            patch,
            options,
            chunks: Vec::new(),
            stats: DiffStats::default(),
            loaded: false,
        }
    }

    /// The path shown to users: the target side, unless the file was
    /// deleted.
    pub fn display_path(&self) -> &str {
        if self.dest_file == DEV_NULL || self.dest_file.is_empty() {
            &self.source_file
        } else {
            &self.dest_file
        }
    }

    pub fn chunks(&self) -> &[DiffChunk] {
        &self.chunks
    }

    pub fn stats(&self) -> &DiffStats {
        &self.stats
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Computes chunks and statistics, replacing any previous result.
    pub fn load_chunks(&mut self, highlighter: &dyn Highlighter) -> Result<(), DiffError> {
        let (old_lines, new_lines, opcodes, old_markup, new_markup) =
            if self.options.cwd.is_some() {
                self.compute_from_disk(highlighter)?
            } else {
                self.compute_from_patch()
            };

        log::debug!(
            "generating diff chunks for {} ({} opcodes)",
            self.display_path(),
            opcodes.len()
        );

        let builder = ChunkBuilder::new(self.options.context_lines);
        self.chunks = builder.build(&opcodes, &old_lines, &new_lines, &old_markup, &new_markup);
        self.stats = DiffStats::from_chunks(&self.chunks);
        self.loaded = true;

        log::debug!("done: {} for {}", self.stats, self.display_path());
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn compute_from_disk(
        &self,
        highlighter: &dyn Highlighter,
    ) -> Result<
        (
            Vec<String>,
            Vec<String>,
            Vec<crate::domain::Opcode>,
            Vec<String>,
            Vec<String>,
        ),
        DiffError,
    > {
        let old = normalize_line_endings(&self.read_original()?);
        let diff_text = self.patch.to_string();
        let new = normalize_line_endings(&apply_patch(&old, &diff_text, self.display_path())?);

        let old_lines = split_lines(&old);
        let new_lines = split_lines(&new);

        let old_markup = self.markup_for(&old, &old_lines, highlighter);
        let new_markup = self.markup_for(&new, &new_lines, highlighter);

        let aligner = aligner_for_version(self.options.compat_version)?;
        let opcodes = aligner.align(&old_lines, &new_lines);

        Ok((old_lines, new_lines, opcodes, old_markup, new_markup))
    }

    #[allow(clippy::type_complexity)]
    fn compute_from_patch(
        &self,
    ) -> (
        Vec<String>,
        Vec<String>,
        Vec<crate::domain::Opcode>,
        Vec<String>,
        Vec<String>,
    ) {
        // No on-disk pair to align; the patch's own line classification is
        // trusted verbatim, and markup stays plain.
        let derived = opcodes_from_hunks(self.patch.hunks());
        let old_markup = escape_lines(&derived.old_lines);
        let new_markup = escape_lines(&derived.new_lines);
        (
            derived.old_lines,
            derived.new_lines,
            derived.opcodes,
            old_markup,
            new_markup,
        )
    }

    fn read_original(&self) -> Result<String, DiffError> {
        if self.source_file == DEV_NULL || self.source_file.is_empty() {
            // File created by this diff.
            return Ok(String::new());
        }
        let cwd = self.options.cwd.as_ref().expect("on-disk mode requires cwd");
        Ok(std::fs::read_to_string(cwd.join(&self.source_file))?)
    }

    fn markup_for(
        &self,
        text: &str,
        lines: &[String],
        highlighter: &dyn Highlighter,
    ) -> Vec<String> {
        if self.options.syntax_highlighting {
            match highlighter.highlight(text, self.display_path()) {
                Ok(markup) if markup.len() == lines.len() => return markup,
                Ok(markup) => log::warn!(
                    "highlighter returned {} markup lines for {} ({} expected); using plain markup",
                    markup.len(),
                    self.display_path(),
                    lines.len()
                ),
                Err(err) => log::warn!(
                    "syntax highlighting failed for {}: {err}",
                    self.display_path()
                ),
            }
        }
        escape_lines(lines)
    }
}

/// A per-file failure recorded during [`SideBySideDiff::load`].
#[derive(Debug)]
pub struct DiffFailure {
    pub file_index: usize,
    pub filename: String,
    pub error: DiffError,
}

/// All files of one unified diff, ready to load and render.
///
/// A failure in one file (unreadable source, patch that doesn't apply) is
/// recorded and does not stop the remaining files from loading.
#[derive(Debug)]
pub struct SideBySideDiff {
    items: Vec<DiffItem>,
    failures: Vec<DiffFailure>,
}

impl SideBySideDiff {
    pub fn from_diff_text(diff_text: &str, options: DiffOptions) -> Result<Self, DiffError> {
        // An unsupported compat version is a configuration error; reject it
        // before touching any file.
        aligner_for_version(options.compat_version)?;

        let mut patch_set = PatchSet::new();
        patch_set
            .parse(diff_text)
            .map_err(|err| DiffError::MalformedDiff(err.to_string()))?;

        let items = patch_set
            .files()
            .iter()
            .enumerate()
            .map(|(idx, file)| DiffItem::new(idx + 1, file.clone(), options.clone()))
            .collect();

        Ok(Self {
            items,
            failures: Vec::new(),
        })
    }

    /// Loads chunks for every file, isolating per-file failures.
    pub fn load(&mut self, highlighter: &dyn Highlighter) {
        self.failures.clear();
        for item in &mut self.items {
            if let Err(error) = item.load_chunks(highlighter) {
                log::warn!("skipping {}: {error}", item.display_path());
                self.failures.push(DiffFailure {
                    file_index: item.index,
                    filename: item.display_path().to_string(),
                    error,
                });
            }
        }
    }

    pub fn items(&self) -> &[DiffItem] {
        &self.items
    }

    pub fn failures(&self) -> &[DiffFailure] {
        &self.failures
    }

    /// Resolves a chunk anchor (`"2.0"` or `"chunk.2.1"`) to the file it
    /// belongs to.
    pub fn file_for_chunk_id(&self, id: &str) -> Option<&str> {
        let id = ChunkId::parse(id)?;
        self.items
            .get(id.file.checked_sub(1)?)
            .map(|item| item.display_path())
    }

    /// Renders the whole diff as a standalone HTML document.
    pub fn to_html(&self) -> Result<String, DiffError> {
        crate::render::render_document(self)
    }
}

fn strip_git_prefix(path: &str) -> String {
    if path == DEV_NULL {
        return path.to_string();
    }
    path.trim_start_matches("a/")
        .trim_start_matches("b/")
        .to_string()
}

// A text without a trailing newline would otherwise produce a duplicate
// final line number after the split.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if text.ends_with('\n') {
        lines.pop();
    }
    lines
}
