//! Subprocess execution and capture
//!
//! The single run facility every command-running step goes through.
//! Commands are executed via `sh -c` with the context's environment,
//! both streams piped, and waited on synchronously. A nonzero exit
//! code is not an error here — exit-code policy belongs to the steps.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::context::ScenarioContext;
use crate::error::StepError;

/// Captured result of one command execution.
///
/// Immutable after creation; owned by the scenario context and
/// overwritten by the next execution.
#[derive(Debug, Clone)]
pub struct CmdOutcome {
    /// Process exit code (-1 when terminated by a signal)
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// Selector for one of the two captured streams.
///
/// Restricted at the parsing boundary to exactly these two literals;
/// step patterns reject anything else before it reaches the accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

impl std::str::FromStr for Stream {
    type Err = StepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(Stream::Stdout),
            "stderr" => Ok(Stream::Stderr),
            other => Err(StepError::syntax(format!("unknown stream: {}", other))),
        }
    }
}

impl CmdOutcome {
    /// Text of the selected stream, unmodified.
    pub fn stream(&self, stream: Stream) -> &str {
        match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        }
    }
}

/// Run `command_line` through the shell and capture its outcome.
///
/// `cwd` overrides the context working directory (used by the
/// "in repository" steps). Spawn failure is an IO error; a nonzero
/// exit code is captured, never raised.
pub fn run(
    ctx: &mut ScenarioContext,
    command_line: &str,
    cwd: Option<&Path>,
) -> Result<CmdOutcome, StepError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c");
    cmd.arg(command_line);
    cmd.current_dir(cwd.unwrap_or(ctx.workdir.as_path()));
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    cmd.env_clear();
    for (k, v) in ctx.environ() {
        cmd.env(k, v);
    }

    let output = cmd.output().map_err(|e| {
        StepError::new(
            crate::error::ErrorKind::Io,
            format!("failed to execute '{}': {}", command_line, e),
        )
    })?;

    let outcome = CmdOutcome {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    ctx.logf(&format!("$ {}", command_line));
    if !outcome.stdout.is_empty() {
        ctx.logf(&format!("[stdout]\n{}", outcome.stdout));
    }
    if !outcome.stderr.is_empty() {
        ctx.logf(&format!("[stderr]\n{}", outcome.stderr));
    }
    ctx.logf(&format!("[exit code {}]", outcome.exit_code));

    Ok(outcome)
}
