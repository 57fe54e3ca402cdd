//! Scenario file parser
//!
//! Parses plain-text `.steps` scenario files:
//! - `#` at line start is a comment (whole line ignored)
//! - `Feature:` / `Scenario:` lines are section markers (logged, not dispatched)
//! - `Given` / `When` / `Then` lines are steps; `And` / `But` inherit
//!   the previous keyword
//! - a step may be followed by a `"""` fenced doc string (the fence's
//!   indentation is stripped from the content) or a `|`-delimited data
//!   table

/// A step keyword as written in the scenario file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Given,
    When,
    Then,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Given => "Given",
            Keyword::When => "When",
            Keyword::Then => "Then",
        }
    }
}

/// A parsed scenario step.
#[derive(Debug, Clone)]
pub struct ScenarioStep {
    /// Resolved keyword (`And`/`But` already resolved to the previous one)
    pub keyword: Keyword,
    /// Step text after the keyword
    pub text: String,
    /// Doc string attached to the step, if any
    pub doc_string: Option<String>,
    /// Data table attached to the step, if any (rows of trimmed cells)
    pub table: Option<Vec<Vec<String>>>,
    /// Original line text (for error messages and logging)
    pub raw: String,
    /// Line number in the scenario file
    pub line_number: usize,
}

/// One item of a parsed scenario file.
#[derive(Debug, Clone)]
pub enum ScenarioItem {
    /// A `Feature:` or `Scenario:` section marker
    Section { text: String, line_number: usize },
    /// A dispatchable step
    Step(ScenarioStep),
}

/// Parse error with line context
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parse a scenario file into section markers and steps.
pub fn parse_scenario(text: &str) -> Result<Vec<ScenarioItem>, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut items: Vec<ScenarioItem> = Vec::new();
    let mut last_keyword: Option<Keyword> = None;

    let mut i = 0;
    while i < lines.len() {
        let raw = lines[i];
        let line_number = i + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }

        if trimmed.starts_with("Feature:") || trimmed.starts_with("Scenario:") {
            items.push(ScenarioItem::Section {
                text: trimmed.to_string(),
                line_number,
            });
            i += 1;
            continue;
        }

        if trimmed.starts_with('|') {
            return Err(ParseError {
                message: "data table without a preceding step".into(),
                line: line_number,
            });
        }
        if trimmed.starts_with("\"\"\"") {
            return Err(ParseError {
                message: "doc string without a preceding step".into(),
                line: line_number,
            });
        }

        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some(pair) => pair,
            None => (trimmed, ""),
        };
        let keyword = match word {
            "Given" => Keyword::Given,
            "When" => Keyword::When,
            "Then" => Keyword::Then,
            "And" | "But" => last_keyword.ok_or_else(|| ParseError {
                message: format!("'{}' without a preceding step", word),
                line: line_number,
            })?,
            other => {
                return Err(ParseError {
                    message: format!("expected a step keyword, got {:?}", other),
                    line: line_number,
                });
            }
        };
        last_keyword = Some(keyword);

        let step_text = rest.trim().to_string();
        if step_text.is_empty() {
            return Err(ParseError {
                message: "empty step".into(),
                line: line_number,
            });
        }

        i += 1;

        // Optional doc string
        let mut doc_string = None;
        if i < lines.len() && lines[i].trim() == "\"\"\"" {
            let fence_indent = indent_of(lines[i]);
            let opened_at = i + 1;
            i += 1;
            let mut content = String::new();
            loop {
                if i >= lines.len() {
                    return Err(ParseError {
                        message: "unterminated doc string".into(),
                        line: opened_at,
                    });
                }
                if lines[i].trim() == "\"\"\"" {
                    i += 1;
                    break;
                }
                content.push_str(strip_indent(lines[i], fence_indent));
                // Every content line keeps its newline so the block can
                // be compared exactly against captured command output.
                content.push('\n');
                i += 1;
            }
            doc_string = Some(content);
        }

        // Optional data table
        let mut table = None;
        if i < lines.len() && lines[i].trim().starts_with('|') {
            let mut rows = Vec::new();
            while i < lines.len() && lines[i].trim().starts_with('|') {
                rows.push(parse_table_row(lines[i].trim()));
                i += 1;
            }
            table = Some(rows);
        }

        items.push(ScenarioItem::Step(ScenarioStep {
            keyword,
            text: step_text,
            doc_string,
            table,
            raw: trimmed.to_string(),
            line_number,
        }));
    }

    Ok(items)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Strip at most `indent` leading whitespace characters.
fn strip_indent(line: &str, indent: usize) -> &str {
    let mut taken = 0;
    for (pos, c) in line.char_indices() {
        if taken >= indent || !c.is_whitespace() {
            return &line[pos..];
        }
        taken += 1;
    }
    ""
}

/// Split `| a | b |` into trimmed cells.
fn parse_table_row(line: &str) -> Vec<String> {
    line.trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}
