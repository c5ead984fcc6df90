//! File reconstruction by delegating to the system `patch` tool.

use crate::domain::error::DiffError;
use std::io::Write;
use std::process::{Command, Stdio};

/// Normalizes `\r\n` and bare `\r` line endings to `\n`.
///
/// A lone trailing `\r` is removed rather than converted: some systems emit
/// one on files without a final newline, and turning it into a newline would
/// make `patch` reject the hunk offsets.
pub fn normalize_line_endings(data: &str) -> String {
    if data.is_empty() {
        return String::new();
    }
    let data = data.strip_suffix('\r').unwrap_or(data);
    data.replace("\r\n", "\n").replace('\r', "\n")
}

/// Applies `diff_text` to `old_text` with the system `patch` tool.
///
/// Blank diff text returns the input unchanged without spawning anything.
/// The tool runs inside a scoped temporary directory that is removed on
/// every exit path; a nonzero exit surfaces [`DiffError::PatchFailed`] with
/// the tool's combined stdout/stderr and the directory path that was used.
pub fn apply_patch(old_text: &str, diff_text: &str, filename: &str) -> Result<String, DiffError> {
    if diff_text.trim().is_empty() {
        // An unchanged file was uploaded; hand back the one we're patching.
        return Ok(old_text.to_string());
    }

    let patch_bin = which::which("patch")?;

    let workdir = tempfile::Builder::new().prefix("sidediff.").tempdir()?;
    let old_path = workdir.path().join("old");
    let new_path = workdir.path().join("new");
    std::fs::write(&old_path, normalize_line_endings(old_text))?;

    log::debug!("applying patch for {filename} in {}", workdir.path().display());

    let mut child = Command::new(&patch_bin)
        .arg("-o")
        .arg(&new_path)
        .arg(&old_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        // `patch` may exit (and close the pipe) before reading everything.
        if let Err(err) = stdin.write_all(normalize_line_endings(diff_text).as_bytes())
            && err.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(err.into());
        }
    }

    let output = child.wait_with_output()?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(DiffError::PatchFailed {
            filename: filename.to_string(),
            workdir: workdir.path().to_path_buf(),
            output: combined,
        });
    }

    Ok(std::fs::read_to_string(&new_path)?)
}
