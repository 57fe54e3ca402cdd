//! Command execution, exit-code, and stream assertion steps

use similar::TextDiff;

use crate::codes::ExitCodeSet;
use crate::context::ScenarioContext;
use crate::engine::{Step, StepArgs};
use crate::error::{ErrorKind, StepError};
use crate::exec::{self, Stream};
use crate::repos;

// ──────────────────────────────────────────────────────────
// I run "{command}"
// ──────────────────────────────────────────────────────────

pub(super) struct RunCommand;

impl Step for RunCommand {
    fn pattern(&self) -> &'static str {
        r#"^I run "(.+)"$"#
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let outcome = exec::run(ctx, args.get(0), None)?;
        ctx.set_outcome(outcome);
        Ok(())
    }
}

// ──────────────────────────────────────────────────────────
// I successfully run "{command}"
// ──────────────────────────────────────────────────────────

pub(super) struct SuccessfullyRun;

impl Step for SuccessfullyRun {
    fn pattern(&self) -> &'static str {
        r#"^I successfully run "(.+)"$"#
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let outcome = exec::run(ctx, args.get(0), None)?;
        ctx.set_outcome(outcome);
        require_pass(ctx)
    }
}

// ──────────────────────────────────────────────────────────
// I successfully run "{command}" in repository "{repository}"
// ──────────────────────────────────────────────────────────

pub(super) struct SuccessfullyRunInRepository;

impl Step for SuccessfullyRunInRepository {
    fn pattern(&self) -> &'static str {
        r#"^I successfully run "(.+)" in repository "(.+)"$"#
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let repo = repos::get_repo_dir(ctx, args.get(1)).ok_or_else(|| {
            StepError::lookup(format!("repository {:?} does not exist", args.get(1)))
        })?;
        let outcome = exec::run(ctx, args.get(0), Some(&repo))?;
        ctx.set_outcome(outcome);
        require_pass(ctx)
    }
}

// ──────────────────────────────────────────────────────────
// the command should pass / fail
// ──────────────────────────────────────────────────────────

pub(super) struct ShouldPass;

impl Step for ShouldPass {
    fn pattern(&self) -> &'static str {
        "^the command should pass$"
    }

    fn run(&self, ctx: &mut ScenarioContext, _args: &StepArgs) -> Result<(), StepError> {
        require_pass(ctx)
    }
}

pub(super) struct ShouldFail;

impl Step for ShouldFail {
    fn pattern(&self) -> &'static str {
        "^the command should fail$"
    }

    fn run(&self, ctx: &mut ScenarioContext, _args: &StepArgs) -> Result<(), StepError> {
        let code = ctx.outcome()?.exit_code;
        if code == 0 {
            return Err(StepError::assertion(
                "expected a nonzero exit code, got 0",
            ));
        }
        Ok(())
    }
}

fn require_pass(ctx: &ScenarioContext) -> Result<(), StepError> {
    let outcome = ctx.outcome()?;
    if outcome.exit_code != 0 {
        return Err(StepError::assertion(format!(
            "expected exit code 0, got {}",
            outcome.exit_code
        )));
    }
    Ok(())
}

// ──────────────────────────────────────────────────────────
// the command exit code is {spec}
// ──────────────────────────────────────────────────────────

pub(super) struct ExitCodeIs;

impl Step for ExitCodeIs {
    fn pattern(&self) -> &'static str {
        "^the command exit code is (.+)$"
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let spec = args.get(0);
        let codes = ExitCodeSet::parse(spec)?;
        let code = ctx.outcome()?.exit_code;
        if !codes.contains(code) {
            return Err(StepError::assertion(format!(
                "exit code {} is not in {:?}",
                code, spec
            )));
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────────────────
// the command {stream} should match exactly / be empty
// ──────────────────────────────────────────────────────────

pub(super) struct StreamMatchExactly;

impl Step for StreamMatchExactly {
    fn pattern(&self) -> &'static str {
        "^the command (stdout|stderr) should match exactly$"
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let stream: Stream = args.get(0).parse()?;
        let expected = ctx.require_doc_string()?.to_string();
        match_exactly(ctx, stream, &expected)
    }
}

pub(super) struct StreamEmpty;

impl Step for StreamEmpty {
    fn pattern(&self) -> &'static str {
        "^the command (stdout|stderr) should be empty$"
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let stream: Stream = args.get(0).parse()?;
        match_exactly(ctx, stream, "")
    }
}

fn match_exactly(
    ctx: &mut ScenarioContext,
    stream: Stream,
    expected: &str,
) -> Result<(), StepError> {
    let actual = ctx.outcome()?.stream(stream).to_string();
    if actual != expected {
        let diff = TextDiff::from_lines(expected, &actual);
        let udiff = diff
            .unified_diff()
            .header("expected", stream.as_str())
            .to_string();
        ctx.logf(&udiff);
        return Err(StepError::assertion(format!(
            "command {} does not match the expected text",
            stream.as_str()
        )));
    }
    Ok(())
}

// ──────────────────────────────────────────────────────────
// the command {stream} should (not) match regexp "{re}"
// ──────────────────────────────────────────────────────────

pub(super) struct StreamMatchRegexp;

impl Step for StreamMatchRegexp {
    fn pattern(&self) -> &'static str {
        r#"^the command (stdout|stderr) should match regexp "(.+)"$"#
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let stream: Stream = args.get(0).parse()?;
        let pattern = args.get(1);
        let re = compile_regex(pattern)?;
        let content = ctx.outcome()?.stream(stream);
        if !re.is_match(content) {
            return Err(StepError::assertion(format!(
                "command {} does not match regexp /{}/:\n{}",
                stream.as_str(),
                pattern,
                content
            )));
        }
        Ok(())
    }
}

pub(super) struct StreamNotMatchRegexp;

impl Step for StreamNotMatchRegexp {
    fn pattern(&self) -> &'static str {
        r#"^the command (stdout|stderr) should not match regexp "(.+)"$"#
    }

    fn run(&self, ctx: &mut ScenarioContext, args: &StepArgs) -> Result<(), StepError> {
        let stream: Stream = args.get(0).parse()?;
        let pattern = args.get(1);
        let re = compile_regex(pattern)?;
        let content = ctx.outcome()?.stream(stream);
        if re.is_match(content) {
            return Err(StepError::assertion(format!(
                "command {} matches regexp /{}/:\n{}",
                stream.as_str(),
                pattern,
                content
            )));
        }
        Ok(())
    }
}

/// Compile a step regexp with multiline mode and a size limit.
fn compile_regex(pattern: &str) -> Result<regex::Regex, StepError> {
    regex::RegexBuilder::new(&format!("(?m){}", pattern))
        .size_limit(1 << 20)
        .build()
        .map_err(|e| {
            StepError::new(ErrorKind::Syntax, format!("invalid regexp /{}/: {}", pattern, e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use std::path::PathBuf;

    fn run_scenario(scenario: &str) -> Result<ScenarioContext, StepError> {
        let engine = Engine::new();
        let mut ctx = ScenarioContext::new(PathBuf::from("."));
        engine.execute(&mut ctx, scenario, "test.steps")?;
        Ok(ctx)
    }

    #[test]
    fn run_and_pass() {
        run_scenario(
            "When I run \"true\"\n\
             Then the command should pass\n",
        )
        .unwrap();
    }

    #[test]
    fn run_and_fail() {
        run_scenario(
            "When I run \"false\"\n\
             Then the command should fail\n",
        )
        .unwrap();

        let err = run_scenario(
            "When I run \"true\"\n\
             Then the command should fail\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
    }

    #[test]
    fn successfully_run_requires_exit_zero() {
        run_scenario("When I successfully run \"true\"\n").unwrap();

        let err = run_scenario("When I successfully run \"exit 4\"\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
        assert!(err.message.contains('4'));
    }

    #[test]
    fn run_in_unknown_repository_is_a_lookup_error() {
        let err = run_scenario(
            "When I successfully run \"true\" in repository \"nope\"\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lookup);
        assert!(err.message.contains("nope"));
    }

    #[test]
    fn run_in_repository_uses_the_repo_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("repos/base")).unwrap();
        std::fs::write(tmp.path().join("repos/base/marker"), "x").unwrap();

        let engine = Engine::new();
        let mut ctx = ScenarioContext::new(tmp.path().to_path_buf());
        engine
            .execute(
                &mut ctx,
                "When I successfully run \"test -f marker\" in repository \"base\"\n",
                "test.steps",
            )
            .unwrap();
    }

    #[test]
    fn exit_code_set_membership() {
        run_scenario(
            "When I run \"exit 101\"\n\
             Then the command exit code is 1,3,100-102\n",
        )
        .unwrap();

        let err = run_scenario(
            "When I run \"exit 2\"\n\
             Then the command exit code is 1,3,100-102\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);

        let err = run_scenario(
            "When I run \"true\"\n\
             Then the command exit code is abc\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Format);
    }

    #[test]
    fn assertion_before_any_run_is_a_lookup_error() {
        let err = run_scenario("Then the command should pass\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lookup);
    }

    #[test]
    fn stream_match_exactly() {
        run_scenario(
            "When I run \"printf 'a\\nb\\n'\"\n\
             Then the command stdout should match exactly\n\
             \"\"\"\n\
             a\n\
             b\n\
             \"\"\"\n",
        )
        .unwrap();

        let err = run_scenario(
            "When I run \"echo other\"\n\
             Then the command stdout should match exactly\n\
             \"\"\"\n\
             expected\n\
             \"\"\"\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
    }

    #[test]
    fn match_exactly_without_doc_string_is_a_lookup_error() {
        let err = run_scenario(
            "When I run \"true\"\n\
             Then the command stdout should match exactly\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lookup);
    }

    #[test]
    fn stream_empty_requires_exactly_empty() {
        run_scenario(
            "When I run \"true\"\n\
             Then the command stdout should be empty\n\
             And the command stderr should be empty\n",
        )
        .unwrap();

        let err = run_scenario(
            "When I run \"echo x\"\n\
             Then the command stdout should be empty\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
    }

    #[test]
    fn stream_regexp_match_and_negation() {
        run_scenario(
            "When I run \"echo installed foo-1.0\"\n\
             Then the command stdout should match regexp \"foo-[0-9.]+\"\n\
             And the command stdout should not match regexp \"bar\"\n",
        )
        .unwrap();

        let err = run_scenario(
            "When I run \"echo foo\"\n\
             Then the command stdout should match regexp \"bar\"\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);

        let err = run_scenario(
            "When I run \"echo foo\"\n\
             Then the command stdout should not match regexp \"foo\"\n",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Assertion);
    }

    #[test]
    fn stderr_is_selectable() {
        run_scenario(
            "When I run \"echo warn >&2\"\n\
             Then the command stderr should match regexp \"warn\"\n\
             And the command stdout should be empty\n",
        )
        .unwrap();
    }
}
