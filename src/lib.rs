//! dnf-stepspec: a step-definition engine for E2E testing DNF
//!
//! Binds natural-language scenario steps to subprocess execution and
//! output verification for the DNF package manager. Scenario files are
//! plain text; each step runs a command, captures its exit code and
//! standard streams, or asserts a property of the last captured
//! result — including structured checks over the DNF history listing
//! and history info output formats.
//!
//! # Scenario Syntax
//!
//! ```text
//! Scenario: install a package
//! When I run "dnf install -y foo"
//! Then the command should pass
//! And the command stderr should be empty
//! Then history should contain "install -y foo" with action "Install" and "1" packages
//! Then history info should match
//!     | Key          | Value           |
//!     | Command Line | install -y foo  |
//!     | Return-Code  | Success         |
//!     | Install      | foo             |
//! ```
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | `I run "..."` | Execute a command, capture its outcome |
//! | `I successfully run "..."` | Execute and require exit code 0 |
//! | `I successfully run "..." in repository "..."` | Execute in a repo dir |
//! | `the command should pass` / `should fail` | Exit-code assertions |
//! | `the command exit code is 1,3,100-102` | Exit-code set membership |
//! | `the command stdout\|stderr should match exactly` | Doc-string comparison |
//! | `the command stdout\|stderr should be empty` | Empty-stream assertion |
//! | `the command stdout\|stderr should (not) match regexp "..."` | Regex assertions |
//! | `history should contain "..." with action "..." and "..." packages` | Listing row check |
//! | `history range "..." should contain ...` | Listing check over a range |
//! | `history userinstalled should` | Userinstalled membership table |
//! | `history info [ "spec" ] should match` | History-info expectation table |

mod codes;
mod context;
mod engine;
mod error;
mod exec;
mod history;
mod parser;
mod repos;
mod runner;
mod steps;
mod table;

pub use codes::ExitCodeSet;
pub use context::ScenarioContext;
pub use engine::{BoxedStep, Engine, Step, StepArgs};
pub use error::{ErrorKind, StepError};
pub use exec::{run, CmdOutcome, Stream};
pub use history::{
    check_info, check_listing, check_userinstalled, parse_listing, tokenize_info_line, Action,
    InfoExpectations, InfoToken, ListingRow,
};
pub use parser::{parse_scenario, Keyword, ScenarioItem, ScenarioStep};
pub use repos::get_repo_dir;
pub use runner::{CaseResult, RunConfig, RunResult, Runner, SetupEnv};
pub use steps::default_steps;
pub use table::{parse_kv_table, split_packages};

// Convenience functions for cargo test integration
pub use runner::{run_and_assert, run_and_assert_config, run_and_assert_with};
