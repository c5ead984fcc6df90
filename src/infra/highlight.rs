//! Syntax-highlight markup generation, one HTML string per line.
//!
//! Highlighting is an optional capability: any failure here degrades to
//! escaped plain text and is only logged, never surfaced to the caller.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const THEME: &str = "InspiredGitHub";
const MAX_LINE_LENGTH: usize = 2000;

/// Markup capability injected into chunk computation.
///
/// Implementors return one markup string per line of `text`. An error makes
/// the caller fall back to escaped plain text.
pub trait Highlighter {
    fn highlight(&self, text: &str, filename: &str) -> anyhow::Result<Vec<String>>;
}

/// Syntect-backed highlighter producing inline-styled HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, text: &str, filename: &str) -> anyhow::Result<Vec<String>> {
        let syntax = syntax_for(filename)
            .ok_or_else(|| anyhow::anyhow!("no syntax definition for '{filename}'"))?;
        let theme = &THEME_SET.themes[THEME];
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut markup = Vec::new();
        for line in split_lines_str(text) {
            if line.len() > MAX_LINE_LENGTH {
                markup.push(handlebars::html_escape(line));
                continue;
            }
            // Highlight with the newline attached so parser state stays
            // correct across lines, then drop it from the output.
            let with_nl = format!("{line}\n");
            let mut ranges = highlighter.highlight_line(&with_nl, &SYNTAX_SET)?;
            if let Some(last) = ranges.last_mut() {
                last.1 = last.1.trim_end_matches('\n');
            }
            ranges.retain(|(_, text)| !text.is_empty());
            markup.push(styled_line_to_highlighted_html(
                &ranges,
                IncludeBackground::No,
            )?);
        }
        Ok(markup)
    }
}

/// Escaped-plain-text markup for when no highlighter applies.
pub fn escape_lines(lines: &[String]) -> Vec<String> {
    lines.iter().map(|line| handlebars::html_escape(line)).collect()
}

fn syntax_for(filename: &str) -> Option<&'static SyntaxReference> {
    let path = std::path::Path::new(filename);
    let token = path
        .extension()
        .and_then(|e| e.to_str())
        .or_else(|| path.file_name().and_then(|n| n.to_str()))?;
    SYNTAX_SET.find_syntax_by_extension(token)
}

// Same line-splitting convention as the chunk pipeline: a trailing newline
// does not produce a final empty line.
fn split_lines_str(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut lines: Vec<&str> = text.split('\n').collect();
    if text.ends_with('\n') {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rust_source() {
        let markup = SyntectHighlighter
            .highlight("fn main() {}\nlet x = 1;\n", "src/main.rs")
            .unwrap();
        assert_eq!(markup.len(), 2);
        assert!(markup[0].contains("<span"));
        assert!(!markup[0].contains('\n'));
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let result = SyntectHighlighter.highlight("data", "file.unknownext123");
        assert!(result.is_err());
    }

    #[test]
    fn test_markup_line_count_matches_input() {
        let text = "one\ntwo\nthree\n";
        let markup = SyntectHighlighter.highlight(text, "notes.txt");
        // Plain text has a syntax definition in the default set.
        if let Ok(markup) = markup {
            assert_eq!(markup.len(), 3);
        }
    }

    #[test]
    fn test_oversized_line_falls_back_to_escaped() {
        let long = format!("let s = \"{}\";\n", "<".repeat(3000));
        let markup = SyntectHighlighter.highlight(&long, "x.rs").unwrap();
        assert_eq!(markup.len(), 1);
        assert!(markup[0].contains("&lt;"));
    }

    #[test]
    fn test_escape_lines() {
        let lines = vec!["a < b".to_string(), "x & y".to_string()];
        let escaped = escape_lines(&lines);
        assert_eq!(escaped[0], "a &lt; b");
        assert_eq!(escaped[1], "x &amp; y");
    }
}
