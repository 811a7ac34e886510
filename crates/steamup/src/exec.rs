//! Process execution with output capture.

use std::path::Path;
use std::process::Stdio;

use steamup_core::{Error, Result};
use tokio::process::Command;
use tracing::{debug, warn};

/// Options controlling one process invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOptions {
    /// Capture standard output and return it.
    pub capture_stdout: bool,
    /// Treat a non-zero exit status as success.
    pub ignore_exit: bool,
    /// Do not echo the child's output into the log.
    pub silent: bool,
}

/// Result of one process invocation.
#[derive(Debug)]
pub struct ExecOutput {
    /// Captured standard output (empty unless requested).
    pub stdout: String,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
}

/// Run a program to completion, capturing its output.
///
/// # Errors
///
/// Returns [`Error::Io`] when the process cannot be spawned and
/// [`Error::CommandFailed`] on a non-zero exit unless `ignore_exit` is
/// set.
pub async fn run(program: &Path, args: &[&str], options: ExecOptions) -> Result<ExecOutput> {
    debug!(program = %program.display(), ?args, "Executing");

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = cmd.output().await?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let code = output.status.code();

    if !options.silent {
        for line in stdout.lines() {
            debug!(program = %program.display(), "{line}");
        }
    }

    if !output.status.success() && !options.ignore_exit {
        warn!(
            program = %program.display(),
            ?code,
            stderr = %String::from_utf8_lossy(&output.stderr),
            "Command failed"
        );
        return Err(Error::command_failed(program.display().to_string(), code));
    }

    Ok(ExecOutput {
        stdout: if options.capture_stdout {
            stdout
        } else {
            String::new()
        },
        code,
    })
}
