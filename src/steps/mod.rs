//! Built-in step definitions
//!
//! One struct per sentence pattern, registered in a fixed order by
//! `default_steps()`. Command steps drive subprocess execution and
//! exit-code/stream assertions; history steps assert over the DNF
//! history output formats.

mod command;
mod history;

use crate::engine::BoxedStep;

/// Return the default set of step definitions, in dispatch order.
pub fn default_steps() -> Vec<BoxedStep> {
    vec![
        // command execution
        Box::new(command::SuccessfullyRunInRepository),
        Box::new(command::SuccessfullyRun),
        Box::new(command::RunCommand),
        // exit code assertions
        Box::new(command::ShouldPass),
        Box::new(command::ShouldFail),
        Box::new(command::ExitCodeIs),
        // stream assertions
        Box::new(command::StreamMatchExactly),
        Box::new(command::StreamEmpty),
        Box::new(command::StreamNotMatchRegexp),
        Box::new(command::StreamMatchRegexp),
        // history assertions
        Box::new(history::HistoryRangeContains),
        Box::new(history::HistoryContains),
        Box::new(history::HistoryUserinstalled),
        Box::new(history::HistoryInfoScoped),
        Box::new(history::HistoryInfo),
    ]
}
