//! History assertion steps
//!
//! These steps run the relevant `dnf history` subcommand themselves
//! (through the single run facility, like every other command-running
//! step) and assert over its output with the parsers in
//! `crate::history`.

use crate::context::ScenarioContext;
use crate::engine::{Step, StepArgs};
use crate::error::StepError;
use crate::exec;
use crate::history::{check_info, check_listing, check_userinstalled, InfoExpectations};
use crate::table::{parse_kv_table, split_packages};

/// Table keys for the history-info expectation table.
const INFO_KEYS: &[&str] = &[
    "Command Line",
    "Return-Code",
    "Install",
    "Erase",
    "Upgrade",
    "Upgraded",
    "Reinstall",
    "Downgrade",
];

fn run_history(ctx: &mut ScenarioContext, command: &str) -> Result<String, StepError> {
    let outcome = exec::run(ctx, command, None)?;
    let stdout = outcome.stdout.clone();
    ctx.set_outcome(outcome);
    Ok(stdout)
}

// ──────────────────────────────────────────────────────────
// history should contain "{cmd}" with action "{act}" and "{alt}" packages
// ──────────────────────────────────────────────────────────

pub(super) struct HistoryContains;

impl Step for HistoryContains {
    fn pattern(&self) -> &'static str {
        r#"^history should contain "(.+)" with action "(.+)" and "(.+)" packages?$"#
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let stdout = run_history(ctx, "dnf history")?;
        check_listing(&stdout, args.get(0), args.get(1), args.get(2))
    }
}

// ──────────────────────────────────────────────────────────
// history range "{range}" should contain ...
// ──────────────────────────────────────────────────────────

pub(super) struct HistoryRangeContains;

impl Step for HistoryRangeContains {
    fn pattern(&self) -> &'static str {
        r#"^history range "([^"]+)" should contain "(.+)" with action "(.+)" and "(.+)" packages?$"#
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        // The range qualifier is forwarded verbatim to the history command
        let stdout = run_history(ctx, &format!("dnf history {}", args.get(0)))?;
        check_listing(&stdout, args.get(1), args.get(2), args.get(3))
    }
}

// ──────────────────────────────────────────────────────────
// history userinstalled should  (table: Match / Not match)
// ──────────────────────────────────────────────────────────

pub(super) struct HistoryUserinstalled;

impl Step for HistoryUserinstalled {
    fn pattern(&self) -> &'static str {
        "^history userinstalled should$"
    }

    fn run(&self, ctx: &mut ScenarioContext, _args: &StepArgs) -> Result<(), StepError> {
        let rows = ctx.require_table()?.to_vec();
        let table = parse_kv_table(&rows, ["Action", "Packages"], &["Match", "Not match"])?;
        let matched = table.get("Match").map(|v| split_packages(v)).unwrap_or_default();
        let not_matched = table
            .get("Not match")
            .map(|v| split_packages(v))
            .unwrap_or_default();

        let stdout = run_history(ctx, "dnf history userinstalled")?;
        check_userinstalled(&stdout, &matched, &not_matched)
    }
}

// ──────────────────────────────────────────────────────────
// history info [ "{spec}" ] should match  (expectation table)
// ──────────────────────────────────────────────────────────

pub(super) struct HistoryInfo;

impl Step for HistoryInfo {
    fn pattern(&self) -> &'static str {
        "^history info should match$"
    }

    fn run(&self, ctx: &mut ScenarioContext, _args: &StepArgs) -> Result<(), StepError> {
        history_info(ctx, None)
    }
}

pub(super) struct HistoryInfoScoped;

impl Step for HistoryInfoScoped {
    fn pattern(&self) -> &'static str {
        r#"^history info "([^"]+)" should match$"#
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        history_info(ctx, Some(args.get(0).to_string()))
    }
}

fn history_info(ctx: &mut ScenarioContext, spec: Option<String>) -> Result<(), StepError> {
    let expect = match ctx.table.clone() {
        Some(rows) => {
            let table = parse_kv_table(&rows, ["Key", "Value"], INFO_KEYS)?;
            InfoExpectations::from_table(&table)
        }
        None => InfoExpectations::default(),
    };

    // The transaction spec is forwarded verbatim
    let command = match spec {
        Some(spec) => format!("dnf history info {}", spec),
        None => "dnf history info".to_string(),
    };
    let stdout = run_history(ctx, &command)?;
    check_info(&stdout, &expect)
}
