//! Exit-code set specifications
//!
//! Parses the textual exit-code specs used by the
//! "the command exit code is ..." step: a comma-separated list where
//! each element is a literal code or an inclusive range, e.g.
//! "1,3,100-102".

use std::collections::HashSet;

use crate::error::StepError;

/// A set of acceptable exit codes.
///
/// Ranges are stored as endpoint pairs and never enumerated, so a
/// spec like "0-2000000000" costs nothing beyond its two endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitCodeSet {
    singles: HashSet<i32>,
    ranges: Vec<(i32, i32)>,
}

impl ExitCodeSet {
    /// Parse a spec like "1,3,100-102" into the union of its codes.
    ///
    /// A reversed range ("7-5") contributes nothing. Any non-numeric
    /// token or endpoint is a format error and no partial result is
    /// returned.
    pub fn parse(spec: &str) -> Result<Self, StepError> {
        let mut singles = HashSet::new();
        let mut ranges = Vec::new();
        for part in spec.split(',') {
            if let Some((lower, upper)) = part.split_once('-') {
                let lower = parse_code(lower)?;
                let upper = parse_code(upper)?;
                if lower <= upper {
                    ranges.push((lower, upper));
                }
            } else {
                singles.insert(parse_code(part)?);
            }
        }
        Ok(Self { singles, ranges })
    }

    /// Whether the given exit code is in the set.
    pub fn contains(&self, code: i32) -> bool {
        self.singles.contains(&code)
            || self
                .ranges
                .iter()
                .any(|&(lower, upper)| lower <= code && code <= upper)
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.ranges.is_empty()
    }
}

fn parse_code(token: &str) -> Result<i32, StepError> {
    token
        .trim()
        .parse()
        .map_err(|_| StepError::format(format!("invalid exit code: {:?}", token.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn set(spec: &str) -> ExitCodeSet {
        ExitCodeSet::parse(spec).unwrap()
    }

    #[test]
    fn single_code() {
        let s = set("0");
        assert!(s.contains(0));
        assert!(!s.contains(1));
    }

    #[test]
    fn list_and_range_union() {
        let s = set("1,3,100-102");
        for code in [1, 3, 100, 101, 102] {
            assert!(s.contains(code), "missing {}", code);
        }
        assert!(!s.contains(2));
        assert!(!s.contains(99));
        assert!(!s.contains(103));
    }

    #[test]
    fn whitespace_around_tokens_is_trimmed() {
        let s = set(" 1 , 4 - 6 ");
        assert!(s.contains(1));
        assert!(s.contains(5));
        assert!(s.contains(6));
        assert!(!s.contains(3));
        assert!(!s.contains(7));
    }

    #[test]
    fn degenerate_range_is_a_single_code() {
        let s = set("5-5");
        assert!(s.contains(5));
        assert!(!s.contains(4));
        assert!(!s.contains(6));
    }

    #[test]
    fn reversed_range_contributes_nothing() {
        let s = set("7-5");
        assert!(s.is_empty());
        // ... but still parses alongside valid tokens
        let s = set("2,7-5");
        assert!(s.contains(2));
        assert!(!s.contains(6));
    }

    #[test]
    fn wide_range_is_not_enumerated() {
        // Spec text comes straight from the scenario, so huge ranges
        // must stay cheap: endpoints only, no materialized set.
        let s = set("0-2000000000");
        assert!(s.contains(0));
        assert!(s.contains(1_000_000_000));
        assert!(s.contains(2_000_000_000));
        assert!(!s.contains(-1));
    }

    #[test]
    fn non_numeric_token_is_a_format_error() {
        let err = ExitCodeSet::parse("abc").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
        assert!(ExitCodeSet::parse("1,abc").is_err());
        assert!(ExitCodeSet::parse("1-x").is_err());
    }
}
