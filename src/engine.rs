//! Step dispatch engine
//!
//! The Engine holds the step registry: an explicit table mapping a
//! sentence pattern (anchored regex) to a handler, registered at
//! startup. It is stateless config — one engine can run many
//! scenarios. Dispatch is by step text in registration order; the
//! keyword is syntactic only.

use regex::Regex;

use crate::context::ScenarioContext;
use crate::error::StepError;
use crate::parser::{parse_scenario, ScenarioItem, ScenarioStep};

/// Captured arguments of a matched step pattern (capture groups 1..).
pub struct StepArgs {
    caps: Vec<String>,
}

impl StepArgs {
    /// The nth capture group (0-based over groups 1..).
    pub fn get(&self, i: usize) -> &str {
        self.caps.get(i).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.caps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }
}

/// A step definition: a sentence pattern bound to a handler.
pub trait Step: Send + Sync {
    /// The anchored regex pattern this step matches.
    fn pattern(&self) -> &'static str;

    /// Execute the step against the scenario context.
    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError>;
}

/// A boxed step definition
pub type BoxedStep = Box<dyn Step>;

struct StepDef {
    regex: Regex,
    step: BoxedStep,
}

/// The step engine — holds the pattern→handler registry.
pub struct Engine {
    defs: Vec<StepDef>,
    /// Whether to suppress step logging
    pub quiet: bool,
}

impl Engine {
    /// Create a new engine with the default step definitions.
    pub fn new() -> Self {
        let mut engine = Self {
            defs: Vec::new(),
            quiet: false,
        };
        for step in crate::steps::default_steps() {
            engine.register_step(step);
        }
        engine
    }

    /// Register a step definition. Later registrations are tried after
    /// earlier ones.
    ///
    /// # Panics
    ///
    /// Panics if the step's pattern is not a valid regex — patterns are
    /// compile-time literals, so this is a programming error.
    pub fn register_step(&mut self, step: BoxedStep) {
        let pattern = step.pattern();
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid step pattern {:?}: {}", pattern, e));
        self.defs.push(StepDef { regex, step });
    }

    /// Registered step patterns, in registration order.
    pub fn patterns(&self) -> Vec<&'static str> {
        self.defs.iter().map(|def| def.step.pattern()).collect()
    }

    /// Execute a scenario file's text against the context.
    ///
    /// Steps run strictly in order; the first failure stops the
    /// scenario and is returned annotated with file/line and the step
    /// text. Nothing is caught or retried.
    pub fn execute(
        &self,
        ctx: &mut ScenarioContext,
        scenario: &str,
        filename: &str,
    ) -> Result<(), StepError> {
        let items = parse_scenario(scenario).map_err(|e| {
            StepError::syntax(e.message).with_location(filename, e.line)
        })?;

        for item in items {
            match item {
                ScenarioItem::Section { text, .. } => {
                    if !self.quiet {
                        ctx.logf(&format!("## {}", text));
                    }
                }
                ScenarioItem::Step(step) => {
                    self.run_step(ctx, &step).map_err(|e| {
                        if e.file.is_some() {
                            e
                        } else {
                            e.with_location(filename, step.line_number)
                                .with_step(&step.text)
                        }
                    })?;
                }
            }
        }

        Ok(())
    }

    fn run_step(&self, ctx: &mut ScenarioContext, step: &ScenarioStep) -> Result<(), StepError> {
        if !self.quiet {
            ctx.logf(&format!("> {}", step.raw));
        }

        let (def, args) = self
            .find_step(&step.text)
            .ok_or_else(|| StepError::syntax(format!("no step definition matches: {}", step.text)))?;

        ctx.doc_string = step.doc_string.clone();
        ctx.table = step.table.clone();
        let result = def.step.run(ctx, &args);
        ctx.doc_string = None;
        ctx.table = None;

        result
    }

    fn find_step(&self, text: &str) -> Option<(&StepDef, StepArgs)> {
        for def in &self.defs {
            if let Some(caps) = def.regex.captures(text) {
                let args = StepArgs {
                    caps: caps
                        .iter()
                        .skip(1)
                        .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                        .collect(),
                };
                return Some((def, args));
            }
        }
        None
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
