//! HTML rendering of a loaded diff through Handlebars templates.
//!
//! The view models here are the full data contract for template-driven
//! rendering: filename, revision labels, per-chunk tag/collapsible
//! flag/line count, and the rendered line rows. Chunk anchors follow the
//! `chunk.<file>.<chunk>` addressing scheme so external UI can deep-link to
//! or progressively reveal a specific chunk.

use crate::domain::error::DiffError;
use crate::domain::{ChangeTag, ChunkId, DiffChunk, DiffLine};
use crate::item::{DiffItem, SideBySideDiff};
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use serde::Serialize;

static TEMPLATES: Lazy<Handlebars<'static>> = Lazy::new(|| {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    hb.register_template_string("document", include_str!("templates/document.hbs"))
        .expect("document template must parse");
    hb.register_template_string("file", include_str!("templates/file.hbs"))
        .expect("file template must parse");
    hb
});

#[derive(Serialize)]
struct DocumentContext {
    files: Vec<FileContext>,
}

#[derive(Serialize)]
struct FileContext {
    index: usize,
    filename: String,
    source_revision: String,
    dest_revision: String,
    summary: String,
    error: Option<String>,
    chunks: Vec<ChunkContext>,
    changed_anchors: Vec<AnchorContext>,
}

#[derive(Serialize)]
struct AnchorContext {
    anchor: String,
    number: usize,
}

#[derive(Serialize)]
struct ChunkContext {
    index: usize,
    anchor: Option<String>,
    change: ChangeTag,
    collapsible: bool,
    numlines: usize,
    hidden_label: String,
    lines: Vec<LineContext>,
}

#[derive(Serialize)]
struct LineContext {
    vlinenum: usize,
    old_linenum: Option<usize>,
    old_markup: String,
    old_regions: String,
    new_linenum: Option<usize>,
    new_markup: String,
    new_regions: String,
}

/// Renders the whole diff as a standalone HTML document.
pub fn render_document(diff: &SideBySideDiff) -> Result<String, DiffError> {
    let files = diff
        .items()
        .iter()
        .map(|item| {
            let error = diff
                .failures()
                .iter()
                .find(|failure| failure.file_index == item.index)
                .map(|failure| failure.error.to_string());
            file_context(item, error)
        })
        .collect();

    Ok(TEMPLATES.render("document", &DocumentContext { files })?)
}

/// Renders a single file's side-by-side table fragment.
pub fn render_file(item: &DiffItem) -> Result<String, DiffError> {
    Ok(TEMPLATES.render("file", &file_context(item, None))?)
}

fn file_context(item: &DiffItem, error: Option<String>) -> FileContext {
    let chunks: Vec<ChunkContext> = item
        .chunks()
        .iter()
        .enumerate()
        .map(|(idx, chunk)| chunk_context(item.index, idx, chunk))
        .collect();

    let changed_anchors = chunks
        .iter()
        .filter(|chunk| chunk.change != ChangeTag::Equal)
        .enumerate()
        .map(|(n, chunk)| AnchorContext {
            anchor: chunk.anchor.clone().unwrap_or_default(),
            number: n + 1,
        })
        .collect();

    FileContext {
        index: item.index,
        filename: item.display_path().to_string(),
        source_revision: item.source_label.clone(),
        dest_revision: item.dest_label.clone(),
        summary: item.stats().to_string(),
        error,
        chunks,
        changed_anchors,
    }
}

fn chunk_context(file_index: usize, chunk_index: usize, chunk: &DiffChunk) -> ChunkContext {
    let anchor = (chunk.change != ChangeTag::Equal).then(|| {
        let id = ChunkId {
            file: file_index,
            chunk: chunk_index,
        };
        format!("chunk.{id}")
    });

    let hidden_label = if chunk.numlines == 1 {
        "1 line hidden".to_string()
    } else {
        format!("{} lines hidden", chunk.numlines)
    };

    ChunkContext {
        index: chunk_index,
        anchor,
        change: chunk.change,
        collapsible: chunk.collapsible,
        numlines: chunk.numlines,
        hidden_label,
        lines: chunk.lines.iter().map(line_context).collect(),
    }
}

fn line_context(line: &DiffLine) -> LineContext {
    LineContext {
        vlinenum: line.vlinenum,
        old_linenum: line.old_linenum,
        old_markup: line.old_markup.clone(),
        old_regions: regions_attr(&line.old_regions),
        new_linenum: line.new_linenum,
        new_markup: line.new_markup.clone(),
        new_regions: regions_attr(&line.new_regions),
    }
}

// Change regions travel as a data attribute for client-side highlighting.
fn regions_attr(regions: &[(usize, usize)]) -> String {
    if regions.is_empty() {
        return String::new();
    }
    serde_json::to_string(regions).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::highlight::Highlighter;
    use crate::item::DiffOptions;

    struct PlainMarkup;

    impl Highlighter for PlainMarkup {
        fn highlight(&self, _text: &str, _filename: &str) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("plain only")
        }
    }

    const DIFF: &str = "\
--- a/greeting.txt
+++ b/greeting.txt
@@ -1,3 +1,3 @@
 hello
-wrold
+world
 bye
";

    fn loaded_diff() -> SideBySideDiff {
        let mut diff = SideBySideDiff::from_diff_text(DIFF, DiffOptions::default()).unwrap();
        diff.load(&PlainMarkup);
        diff
    }

    #[test]
    fn test_document_contains_anchors_and_summary() {
        let html = loaded_diff().to_html().unwrap();
        assert!(html.contains("id=\"file.1\""));
        assert!(html.contains("chunk.1.1"));
        assert!(html.contains("1 changed line"));
        assert!(html.contains("greeting.txt"));
    }

    #[test]
    fn test_file_fragment_renders_rows() {
        let diff = loaded_diff();
        let html = render_file(&diff.items()[0]).unwrap();
        assert!(html.contains("wrold"));
        assert!(html.contains("world"));
        assert!(html.contains("data-regions"));
    }

    #[test]
    fn test_regions_attr() {
        assert_eq!(regions_attr(&[]), "");
        assert_eq!(regions_attr(&[(1, 4)]), "[[1,4]]");
    }
}
