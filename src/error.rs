//! Step errors

use std::fmt;

/// The kind of step failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or insufficient external output (too few lines, wrong
    /// field count, non-numeric value)
    Format,
    /// Missing context — no prior command result, unknown repository
    Lookup,
    /// An expected property does not hold
    Assertion,
    /// Invalid scenario syntax or an unknown step
    Syntax,
    /// IO error
    Io,
}

/// A step failure with scenario file/line context
#[derive(Debug)]
pub struct StepError {
    pub kind: ErrorKind,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<usize>,
    pub step: Option<String>,
}

impl StepError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
            line: None,
            step: None,
        }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, msg)
    }

    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lookup, msg)
    }

    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Assertion, msg)
    }

    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, msg)
    }

    pub fn with_location(mut self, file: impl Into<String>, line: usize) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:", file)?;
        }
        if let Some(line) = self.line {
            write!(f, "{}:", line)?;
        }
        let located = self.file.is_some() || self.line.is_some();
        if let Some(ref step) = self.step {
            if located {
                write!(f, " ")?;
            }
            write!(f, "[{}] ", step)?;
        } else if located {
            write!(f, " ")?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StepError {}

impl From<std::io::Error> for StepError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}
