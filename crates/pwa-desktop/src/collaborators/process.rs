//! Subprocess helpers shared by the installer and packager

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::debug;

/// Captured result of a finished command
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Diagnostics to surface on failure: stderr if present, else stdout
    pub fn diagnostics(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim_end()
        } else {
            self.stderr.trim_end()
        }
    }
}

/// Find `program` in PATH, accepting explicit paths as is
pub(crate) fn locate(program: &str) -> Result<PathBuf, which::Error> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 && candidate.exists() {
        return Ok(candidate.to_path_buf());
    }
    which::which(program)
}

/// Run `program` with `args` in `cwd` and capture its output
pub(crate) async fn run(
    program: &Path,
    args: &[String],
    cwd: &Path,
) -> std::io::Result<CommandOutput> {
    debug!(program = %program.display(), args = ?args, cwd = %cwd.display(), "process.run");

    let output = tokio::process::Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    Ok(CommandOutput {
        success: output.status.success(),
        status: output.status.to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
