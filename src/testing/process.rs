//! Process runner
//!
//! Runs the executable under test exactly once, feeding it a fixed stdin
//! payload and capturing stdout and stderr into separate buffers.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;

use crate::common::{Error, Result};

/// Output captured from a process that exited successfully
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    /// The executable must never write diagnostics to stderr
    pub fn check_stderr(&self) -> Result<()> {
        if self.stderr.is_empty() {
            Ok(())
        } else {
            Err(Error::UnexpectedStderrOutput(self.stderr.clone()))
        }
    }
}

/// Resolve the executable to run.
///
/// Paths with more than one component are used as given, with relative ones
/// joined onto `base_dir` when provided. Bare names are looked up on `PATH`.
pub fn resolve_program(program: &Path, base_dir: Option<&Path>) -> Result<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return Ok(match base_dir {
            Some(base) if program.is_relative() => base.join(program),
            _ => program.to_path_buf(),
        });
    }

    which::which(program).map_err(|e| Error::launch(&program.display().to_string(), e))
}

/// Spawn `program`, write `input` to its stdin, and wait for it to exit.
///
/// Fails with [`Error::Launch`] if the process cannot be started or exits
/// with a non-zero or abnormal status. A non-empty stderr is not a failure
/// here; see [`CapturedOutput::check_stderr`].
pub async fn run_executable(program: &Path, args: &[String], input: &str) -> Result<CapturedOutput> {
    let program_name = program.display().to_string();

    tracing::debug!(program = %program_name, ?args, input_len = input.len(), "Spawning executable");

    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::launch(&program_name, e))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::launch(&program_name, "stdin was not captured"))?;

    // Write concurrently with draining stdout/stderr so a child that prints
    // before reading cannot block on a full pipe.
    let payload = input.as_bytes().to_vec();
    let writer = tokio::spawn(async move {
        stdin.write_all(&payload).await?;
        stdin.shutdown().await?;
        Ok::<(), io::Error>(())
    });

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| Error::launch(&program_name, e))?;

    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!(program = %program_name, "Executable closed stdin before reading all input");
        }
        Ok(Err(e)) => {
            return Err(Error::launch(&program_name, format!("failed to write stdin: {}", e)));
        }
        Err(e) => {
            return Err(Error::launch(&program_name, format!("stdin writer failed: {}", e)));
        }
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(Error::launch(&program_name, describe_failure(output.status, &stderr)));
    }

    tracing::debug!(
        program = %program_name,
        stdout_len = stdout.len(),
        stderr_len = stderr.len(),
        "Executable exited successfully"
    );

    Ok(CapturedOutput {
        stdout,
        stderr,
        exit_code: output.status.code(),
    })
}

fn describe_failure(status: ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        format!("executable failed with {}", status)
    } else {
        format!("executable failed with {}; stderr:\n{}", status, stderr)
    }
}
