//! DNF history output parsing
//!
//! Tokenizers and checks for the two semi-structured text formats the
//! history steps consume: the pipe-delimited listing table and the
//! colon-delimited per-transaction info record. Both are free-text
//! output of an external tool and are parsed defensively; format drift
//! surfaces as a format error, a failed expectation as an assertion
//! error.

use std::collections::HashMap;

use crate::error::StepError;
use crate::table::split_packages;

// ──────────────────────────────────────────────────────────
// history list — pipe-delimited table
// ──────────────────────────────────────────────────────────

/// One data row of the history listing.
///
/// Fields are the pipe-split trimmed columns plus the whitespace-split
/// tokens of the last column — the trailing column holds a composite
/// value like "1 >" (transaction id and altered marker sharing a cell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub fields: Vec<String>,
}

impl ListingRow {
    fn parse(line: &str) -> Self {
        let mut fields: Vec<String> =
            line.split('|').map(|col| col.trim().to_string()).collect();
        let extra: Vec<String> = fields
            .last()
            .map(|last| last.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        fields.extend(extra);
        Self { fields }
    }

    /// Whether every expected word appears among the row's fields
    /// (order-independent, exact match).
    pub fn contains_all(&self, words: &[&str]) -> bool {
        words
            .iter()
            .all(|w| self.fields.iter().any(|f| f == w))
    }
}

/// Parse history-listing stdout into data rows.
///
/// The first 3 lines (banner, header, separator) are always discarded;
/// fewer than 4 lines total is a format error.
pub fn parse_listing(text: &str) -> Result<Vec<ListingRow>, StepError> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= 3 {
        return Err(StepError::format("No output"));
    }
    Ok(lines[3..].iter().map(|line| ListingRow::parse(line)).collect())
}

/// Check that some listing row contains the command, action, and
/// altered-count marker.
pub fn check_listing(text: &str, cmd: &str, act: &str, alt: &str) -> Result<(), StepError> {
    let rows = parse_listing(text)?;
    if rows.iter().any(|row| row.contains_all(&[cmd, act, alt])) {
        Ok(())
    } else {
        Err(StepError::assertion(format!(
            "\"{}\" with action \"{}\" and \"{}\" packages not matched!",
            cmd, act, alt
        )))
    }
}

// ──────────────────────────────────────────────────────────
// history userinstalled — substring membership
// ──────────────────────────────────────────────────────────

/// Check userinstalled output against required and forbidden package
/// lists. Containment is plain substring matching over the whole text.
pub fn check_userinstalled(
    output: &str,
    matched: &[String],
    not_matched: &[String],
) -> Result<(), StepError> {
    if output.is_empty() {
        return Err(StepError::format("No output"));
    }
    for pkg in matched {
        if !output.contains(pkg.as_str()) {
            return Err(StepError::assertion(format!(
                "Package {} not matched as userinstalled",
                pkg
            )));
        }
    }
    for pkg in not_matched {
        if output.contains(pkg.as_str()) {
            return Err(StepError::assertion(format!(
                "Package {} matched as userinstalled",
                pkg
            )));
        }
    }
    Ok(())
}

// ──────────────────────────────────────────────────────────
// history info — colon-delimited record
// ──────────────────────────────────────────────────────────

/// A transaction action recognized in history-info output and
/// expectation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Erase,
    Upgrade,
    Upgraded,
    Reinstall,
    Downgrade,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Install,
        Action::Erase,
        Action::Upgrade,
        Action::Upgraded,
        Action::Reinstall,
        Action::Downgrade,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Install => "Install",
            Action::Erase => "Erase",
            Action::Upgrade => "Upgrade",
            Action::Upgraded => "Upgraded",
            Action::Reinstall => "Reinstall",
            Action::Downgrade => "Downgrade",
        }
    }
}

/// One tokenized line of history-info output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoToken {
    /// "Begin rpmdb version" marker; the version token is the 3rd
    /// colon-separated part
    RpmdbBegin { version: String },
    /// "End rpmdb version" marker
    RpmdbEnd { version: String },
    /// "Command Line : ..." value
    CommandLine(String),
    /// "Return-Code : ..." value
    ReturnCode(String),
    /// Any other line (package action lines land here)
    Plain(String),
}

/// Tokenize one history-info line into a tagged record.
///
/// Marker lines with the wrong number of colon-separated parts are
/// format errors.
pub fn tokenize_info_line(line: &str) -> Result<InfoToken, StepError> {
    if line.contains("Begin rpmdb version") {
        let version = rpmdb_version(line)?;
        return Ok(InfoToken::RpmdbBegin { version });
    }
    if line.contains("End rpmdb version") {
        let version = rpmdb_version(line)?;
        return Ok(InfoToken::RpmdbEnd { version });
    }
    if line.contains("Command Line") {
        return Ok(InfoToken::CommandLine(two_part_value(line)?));
    }
    if line.contains("Return-Code") {
        return Ok(InfoToken::ReturnCode(two_part_value(line)?));
    }
    Ok(InfoToken::Plain(line.to_string()))
}

fn rpmdb_version(line: &str) -> Result<String, StepError> {
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() != 3 {
        return Err(StepError::format(format!(
            "expected 3 colon-separated parts in rpmdb version line, got {}: {:?}",
            parts.len(),
            line
        )));
    }
    Ok(parts[2].trim().to_string())
}

fn two_part_value(line: &str) -> Result<String, StepError> {
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() != 2 {
        return Err(StepError::format(format!(
            "expected 2 colon-separated parts, got {}: {:?}",
            parts.len(),
            line
        )));
    }
    Ok(parts[1].trim().to_string())
}

/// Expectations for one history-info check, built from a scenario
/// data table. Absent keys mean no expectation.
#[derive(Debug, Default)]
pub struct InfoExpectations {
    pub command_line: Option<String>,
    pub return_code: Option<String>,
    /// Per recognized action, the packages expected to appear with it
    pub actions: Vec<(Action, Vec<String>)>,
}

impl InfoExpectations {
    /// Build from a parsed key/value table.
    pub fn from_table(table: &HashMap<String, String>) -> Self {
        let actions = Action::ALL
            .iter()
            .filter_map(|&action| {
                table
                    .get(action.as_str())
                    .map(|list| (action, split_packages(list)))
            })
            .collect();
        Self {
            command_line: table.get("Command Line").cloned(),
            return_code: table.get("Return-Code").cloned(),
            actions,
        }
    }
}

/// Check history-info output against the expectations.
///
/// Single top-to-bottom scan: each "End rpmdb version" is paired with
/// the most recent pending Begin and the two version tokens must
/// differ — the rpmdb must show a version change across the
/// transaction. Command-Line and Return-Code lines are only enforced
/// when the table supplied an expectation, but a supplied expectation
/// requires the line to exist. Action packages are checked off when a
/// line contains both the package name and the action keyword.
pub fn check_info(output: &str, expect: &InfoExpectations) -> Result<(), StepError> {
    if output.is_empty() {
        return Err(StepError::format("No output"));
    }

    let mut begin_seen = false;
    let mut pending_begin: Option<String> = None;
    let mut command_line_seen = false;
    let mut return_code_seen = false;

    for line in output.lines() {
        match tokenize_info_line(line)? {
            InfoToken::RpmdbBegin { version } => {
                begin_seen = true;
                pending_begin = Some(version);
            }
            InfoToken::RpmdbEnd { version } => {
                if let Some(begin) = pending_begin.take() {
                    if begin == version {
                        return Err(StepError::assertion(format!(
                            "rpmdb version did not change across the transaction: {}",
                            begin
                        )));
                    }
                }
            }
            InfoToken::CommandLine(value) => {
                if let Some(ref expected) = expect.command_line {
                    command_line_seen = true;
                    if value != expected.trim() {
                        return Err(StepError::assertion(format!(
                            "Command Line mismatch: expected {:?}, got {:?}",
                            expected, value
                        )));
                    }
                }
            }
            InfoToken::ReturnCode(value) => {
                if let Some(ref expected) = expect.return_code {
                    return_code_seen = true;
                    if value != expected.trim() {
                        return Err(StepError::assertion(format!(
                            "Return-Code mismatch: expected {:?}, got {:?}",
                            expected, value
                        )));
                    }
                }
            }
            InfoToken::Plain(_) => {}
        }
    }

    if !begin_seen {
        return Err(StepError::format("Begin rpmdb version not found"));
    }
    if expect.command_line.is_some() && !command_line_seen {
        return Err(StepError::format("Command Line not found"));
    }
    if expect.return_code.is_some() && !return_code_seen {
        return Err(StepError::format("Return-Code not found"));
    }

    for (action, packages) in &expect.actions {
        let mut pending: Vec<&str> = packages.iter().map(String::as_str).collect();
        for line in output.lines() {
            pending.retain(|pkg| !(line.contains(pkg) && line.contains(action.as_str())));
        }
        if let Some(pkg) = pending.first() {
            return Err(StepError::assertion(format!(
                "package {} not matched for action {}",
                pkg,
                action.as_str()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const LISTING: &str = "\
ID | Command line | Date and time    | Action(s)      | Altered
-------------------------------------------------------------------------------
     2 | install bar              | 2026-08-20 10:12 | Install        |    2
     1 | install foo              | 2026-08-20 10:02 | Install        |    1 >";

    #[test]
    fn listing_needs_more_than_three_lines() {
        let err = parse_listing("one\ntwo\nthree").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
        assert_eq!(err.message, "No output");
    }

    #[test]
    fn listing_rows_expand_the_trailing_column() {
        // Banner line + header + separator, then data
        let text = format!("Last metadata expiration check\n{}", LISTING);
        let rows = parse_listing(&text).unwrap();
        assert_eq!(rows.len(), 2);
        // "1 >" is both the trimmed column and its whitespace tokens
        let last = &rows[1];
        assert!(last.fields.iter().any(|f| f == "1 >"));
        assert!(last.fields.iter().any(|f| f == "1"));
        assert!(last.fields.iter().any(|f| f == ">"));
    }

    #[test]
    fn listing_containment_is_order_independent() {
        let text = format!("banner\n{}", LISTING);
        check_listing(&text, "install foo", "Install", "1").unwrap();
        check_listing(&text, "1", "install foo", "Install").unwrap();

        let err = check_listing(&text, "install foo", "Erase", "1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
        assert!(err.message.contains("install foo"));
        assert!(err.message.contains("Erase"));
    }

    #[test]
    fn userinstalled_checks_substrings() {
        let output = "foo-1.0-1.x86_64\nbar-2.0-1.x86_64\n";
        check_userinstalled(
            output,
            &["foo".into(), "bar-2.0".into()],
            &["baz".into()],
        )
        .unwrap();

        let err =
            check_userinstalled(output, &["quux".into()], &[]).unwrap_err();
        assert!(err.message.contains("quux"));
        assert!(err.message.contains("not matched"));

        let err =
            check_userinstalled(output, &[], &["bar".into()]).unwrap_err();
        assert!(err.message.contains("bar"));

        let err = check_userinstalled("", &[], &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
    }

    #[test]
    fn info_tokenizer_tags_marker_lines() {
        assert_eq!(
            tokenize_info_line("Begin rpmdb version : 111").unwrap_err().kind,
            ErrorKind::Format
        );
        assert_eq!(
            tokenize_info_line("Begin rpmdb version:version:111").unwrap(),
            InfoToken::RpmdbBegin { version: "111".into() }
        );
        assert_eq!(
            tokenize_info_line("Command Line : install foo").unwrap(),
            InfoToken::CommandLine("install foo".into())
        );
        assert_eq!(
            tokenize_info_line("Return-Code : Success").unwrap(),
            InfoToken::ReturnCode("Success".into())
        );
        assert_eq!(
            tokenize_info_line("    Install foo-1.0-1.x86_64 @testrepo").unwrap(),
            InfoToken::Plain("    Install foo-1.0-1.x86_64 @testrepo".into())
        );
    }

    fn info_output(begin: &str, end: &str) -> String {
        format!(
            "Transaction ID : 1\n\
             Begin rpmdb version:version:{}\n\
             Command Line : install foo\n\
             Return-Code : Success\n\
             Packages Altered\n\
             \x20   Install foo-1.0-1.x86_64 @testrepo\n\
             End rpmdb version:version:{}\n",
            begin, end
        )
    }

    #[test]
    fn info_version_change_is_required() {
        let expect = InfoExpectations::default();
        check_info(&info_output("111", "112"), &expect).unwrap();

        let err = check_info(&info_output("111", "111"), &expect).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
        assert!(err.message.contains("111"));
    }

    #[test]
    fn info_requires_a_begin_marker() {
        let err = check_info("Transaction ID : 1\n", &InfoExpectations::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
        assert_eq!(err.message, "Begin rpmdb version not found");

        let err = check_info("", &InfoExpectations::default()).unwrap_err();
        assert_eq!(err.message, "No output");
    }

    #[test]
    fn info_expectations_only_enforced_when_supplied() {
        // No Command Line / Return-Code lines at all — fine without expectations
        let output = "Begin rpmdb version:version:1\nEnd rpmdb version:version:2\n";
        check_info(output, &InfoExpectations::default()).unwrap();

        // ... but a supplied expectation requires the line to exist
        let expect = InfoExpectations {
            command_line: Some("install foo".into()),
            ..Default::default()
        };
        let err = check_info(output, &expect).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
        assert_eq!(err.message, "Command Line not found");
    }

    #[test]
    fn info_command_line_and_return_code_compared_trimmed() {
        let output = info_output("111", "112");
        let expect = InfoExpectations {
            command_line: Some("install foo".into()),
            return_code: Some("Success".into()),
            ..Default::default()
        };
        check_info(&output, &expect).unwrap();

        let expect = InfoExpectations {
            command_line: Some("install bar".into()),
            ..Default::default()
        };
        let err = check_info(&output, &expect).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
        assert!(err.message.contains("install bar"));
        assert!(err.message.contains("install foo"));
    }

    #[test]
    fn info_action_packages_are_checked_off() {
        let output = info_output("111", "112");
        let mut table = HashMap::new();
        table.insert("Install".to_string(), "foo".to_string());
        let expect = InfoExpectations::from_table(&table);
        check_info(&output, &expect).unwrap();

        let mut table = HashMap::new();
        table.insert("Install".to_string(), "foo, missing-pkg".to_string());
        let expect = InfoExpectations::from_table(&table);
        let err = check_info(&output, &expect).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
        assert!(err.message.contains("missing-pkg"));
        assert!(err.message.contains("Install"));
    }

    #[test]
    fn info_multiple_transactions_pair_in_scan_order() {
        let output = "\
Begin rpmdb version:version:111\n\
End rpmdb version:version:112\n\
Begin rpmdb version:version:112\n\
End rpmdb version:version:113\n";
        check_info(output, &InfoExpectations::default()).unwrap();

        let bad = "\
Begin rpmdb version:version:111\n\
End rpmdb version:version:112\n\
Begin rpmdb version:version:112\n\
End rpmdb version:version:112\n";
        assert!(check_info(bad, &InfoExpectations::default()).is_err());
    }
}
