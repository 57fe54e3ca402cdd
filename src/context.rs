//! Scenario execution context
//!
//! Holds mutable per-scenario state: working directory, environment
//! variables, the single last-command outcome slot, step attachments
//! (doc string / data table), and the execution log.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::StepError;
use crate::exec::CmdOutcome;

/// Mutable state for a single scenario execution.
///
/// There is exactly one logical thread of control per scenario and at
/// most one live `CmdOutcome` at a time — every command execution
/// overwrites the slot.
#[derive(Debug)]
pub struct ScenarioContext {
    /// Scenario working directory (commands run here by default)
    pub workdir: PathBuf,
    /// Root directory holding test repositories (for "in repository" steps)
    pub repo_root: PathBuf,
    /// Environment variables — ordered for deterministic subprocess env
    env: Vec<(String, String)>,
    /// Index for lookup by key → position in `env`
    env_index: HashMap<String, usize>,
    /// Outcome of the last executed command
    last: Option<CmdOutcome>,
    /// Doc string attached to the current step, if any
    pub doc_string: Option<String>,
    /// Data table attached to the current step, if any (rows of cells)
    pub table: Option<Vec<Vec<String>>>,
    /// Execution log
    pub log: String,
}

impl ScenarioContext {
    /// Create a context rooted at the given working directory.
    ///
    /// The parent environment is inherited so that subprocesses see a
    /// normal PATH; the repository root defaults to `repos/` under the
    /// workdir.
    pub fn new(workdir: PathBuf) -> Self {
        let repo_root = workdir.join("repos");
        let mut ctx = Self {
            workdir,
            repo_root,
            env: Vec::new(),
            env_index: HashMap::new(),
            last: None,
            doc_string: None,
            table: None,
            log: String::new(),
        };
        for (key, value) in std::env::vars() {
            ctx.setenv(key, value);
        }
        ctx
    }

    /// Set an environment variable for subsequent commands.
    pub fn setenv(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(&idx) = self.env_index.get(&key) {
            self.env[idx].1 = value;
        } else {
            let idx = self.env.len();
            self.env.push((key.clone(), value));
            self.env_index.insert(key, idx);
        }
    }

    /// Get an environment variable.
    pub fn getenv(&self, key: &str) -> Option<&str> {
        self.env_index.get(key).map(|&idx| self.env[idx].1.as_str())
    }

    /// All environment variables as key/value pairs for a subprocess.
    pub fn environ(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Store a command outcome, replacing any previous one.
    pub fn set_outcome(&mut self, outcome: CmdOutcome) {
        self.last = Some(outcome);
    }

    /// The outcome of the last executed command.
    ///
    /// Fails with a lookup error when no command has been run yet.
    pub fn outcome(&self) -> Result<&CmdOutcome, StepError> {
        self.last
            .as_ref()
            .ok_or_else(|| StepError::lookup("no command has been run yet"))
    }

    /// The doc string attached to the current step.
    pub fn require_doc_string(&self) -> Result<&str, StepError> {
        self.doc_string
            .as_deref()
            .ok_or_else(|| StepError::lookup("multiline text is not provided"))
    }

    /// The data table attached to the current step.
    pub fn require_table(&self) -> Result<&[Vec<String>], StepError> {
        self.table
            .as_deref()
            .ok_or_else(|| StepError::lookup("data table is not provided"))
    }

    /// Write a log entry.
    pub fn logf(&mut self, msg: &str) {
        self.log.push_str(msg);
        if !msg.ends_with('\n') {
            self.log.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn outcome_before_any_run_is_a_lookup_error() {
        let ctx = ScenarioContext::new(PathBuf::from("/tmp"));
        let err = ctx.outcome().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lookup);
    }

    #[test]
    fn setenv_overwrites_in_place() {
        let mut ctx = ScenarioContext::new(PathBuf::from("/tmp"));
        ctx.setenv("LANG", "C");
        ctx.setenv("LANG", "C.UTF-8");
        assert_eq!(ctx.getenv("LANG"), Some("C.UTF-8"));
        let count = ctx.environ().filter(|(k, _)| *k == "LANG").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn outcome_slot_is_overwritten() {
        let mut ctx = ScenarioContext::new(PathBuf::from("/tmp"));
        ctx.set_outcome(CmdOutcome {
            exit_code: 1,
            stdout: String::new(),
            stderr: String::new(),
        });
        ctx.set_outcome(CmdOutcome {
            exit_code: 0,
            stdout: "ok\n".into(),
            stderr: String::new(),
        });
        let out = ctx.outcome().unwrap();
        assert_eq!(out.exit_code, 0);
        assert_eq!(out.stdout, "ok\n");
    }
}
