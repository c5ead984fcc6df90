//! Command-line entry point: render a unified diff as a side-by-side HTML
//! document.

use clap::Parser;
use sidediff::diff::{DEFAULT_COMPAT_VERSION, DEFAULT_CONTEXT_LINES};
use sidediff::infra::highlight::SyntectHighlighter;
use sidediff::{DiffOptions, SideBySideDiff};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sidediff", version, about = "Render a unified diff as side-by-side HTML")]
struct Cli {
    /// Unified diff file; reads stdin when omitted.
    diff: Option<PathBuf>,

    /// Directory holding the pre-change files; enables on-disk patching and
    /// syntax highlighting of full file contents.
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Unchanged lines kept visible around a collapsed run.
    #[arg(long, default_value_t = DEFAULT_CONTEXT_LINES)]
    context: usize,

    /// Line-alignment compatibility version (0 = LCS, 1 = Myers).
    #[arg(long, default_value_t = DEFAULT_COMPAT_VERSION)]
    compat: u32,

    /// Disable syntax highlighting.
    #[arg(long)]
    no_highlight: bool,

    /// Write the document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let diff_text = match &cli.diff {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            if std::io::stdin().is_terminal() {
                anyhow::bail!("no diff file given and stdin is a terminal");
            }
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let options = DiffOptions {
        cwd: cli.cwd.clone(),
        syntax_highlighting: !cli.no_highlight,
        context_lines: cli.context,
        compat_version: cli.compat,
    };

    let mut diff = SideBySideDiff::from_diff_text(&diff_text, options)?;
    diff.load(&SyntectHighlighter);

    for failure in diff.failures() {
        eprintln!("warning: {}: {}", failure.filename, failure.error);
    }

    let html = diff.to_html()?;
    match &cli.output {
        Some(path) => std::fs::write(path, html)?,
        None => print!("{html}"),
    }

    Ok(())
}
