//! Error types for diff construction.
//!
//! Algorithmic components are pure and panic on invariant violations (those
//! indicate a bug upstream); everything here covers configuration problems
//! and failures of the external collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling or rendering a side-by-side diff.
#[derive(Debug, Error)]
pub enum DiffError {
    /// An unknown line-alignment strategy was requested.
    #[error("invalid diff compatibility version ({0})")]
    UnsupportedCompatVersion(u32),

    /// The external `patch` tool exited nonzero. Carries the tool's combined
    /// stdout/stderr and the temporary working directory that was used, to
    /// aid debugging.
    #[error(
        "the patch to '{filename}' didn't apply cleanly \
         (temporary work dir was '{}'); `patch` returned:\n{output}",
        workdir.display()
    )]
    PatchFailed {
        filename: String,
        workdir: PathBuf,
        output: String,
    },

    #[error("`patch` executable not found: {0}")]
    PatchToolMissing(#[from] which::Error),

    #[error("malformed unified diff: {0}")]
    MalformedDiff(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("diff operation failed: {0}")]
    Other(#[from] anyhow::Error),
}
