//! Scenario runner
//!
//! Discovers `.steps` scenario files in a directory, creates a fresh
//! temp working directory per scenario, executes the steps, and
//! reports results.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::context::ScenarioContext;
use crate::engine::Engine;

/// Configuration for the scenario runner
pub struct RunConfig {
    /// Directory containing scenario files
    pub dir: PathBuf,
    /// Optional filter — only run scenarios matching this pattern
    pub filter: Option<String>,
    /// Root directory for temp working directories
    pub workdir_root: Option<PathBuf>,
    /// Preserve working directories after a scenario (for debugging)
    pub preserve_work: bool,
    /// Setup function called before each scenario
    pub setup: Option<Box<dyn Fn(&mut SetupEnv) -> anyhow::Result<()> + Send>>,
    /// Verbose mode — print the execution log
    pub verbose: bool,
    /// File extensions to scan (default: [".steps"])
    pub extensions: Vec<String>,
}

/// Environment available during setup
pub struct SetupEnv {
    /// The working directory for the scenario
    pub work_dir: PathBuf,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("scenarios"),
            filter: None,
            workdir_root: None,
            preserve_work: false,
            setup: None,
            verbose: false,
            extensions: vec![".steps".into()],
        }
    }
}

/// Result of running all scenarios
#[derive(Debug)]
pub struct RunResult {
    /// Individual scenario results
    pub cases: Vec<CaseResult>,
    /// Total duration
    pub duration: Duration,
}

impl RunResult {
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.cases.iter().filter(|c| !c.passed).count()
    }

    /// Format a summary line
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed ({}ms)",
            self.passed_count(),
            self.failed_count(),
            self.duration.as_millis(),
        )
    }
}

/// Result of a single scenario
#[derive(Debug)]
pub struct CaseResult {
    /// Scenario name (filename without extension)
    pub name: String,
    /// Source file path
    pub file: PathBuf,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Execution log
    pub log: String,
    /// Duration
    pub duration: Duration,
    /// Working directory (if preserved)
    pub workdir: Option<PathBuf>,
}

/// The scenario runner
pub struct Runner {
    engine: Engine,
    config: RunConfig,
}

impl Runner {
    /// Create a new runner with the given config
    pub fn new(config: RunConfig) -> Self {
        Self {
            engine: Engine::new(),
            config,
        }
    }

    /// Create a new runner with a custom engine
    pub fn with_engine(engine: Engine, config: RunConfig) -> Self {
        Self { engine, config }
    }

    /// Mutable access to the engine (for registering custom steps)
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Discover scenario files in the configured directory
    pub fn discover(&self) -> Result<Vec<PathBuf>, std::io::Error> {
        let mut files = Vec::new();
        let dir = &self.config.dir;

        if !dir.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("scenario directory not found: {}", dir.display()),
            ));
        }

        if dir.is_file() {
            files.push(dir.clone());
            return Ok(files);
        }

        self.scan_dir(dir, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn scan_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                self.scan_dir(&path, files)?;
            } else if self.is_scenario_file(&path) {
                if let Some(ref filter) = self.config.filter {
                    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
                    if !name.contains(filter.as_str()) {
                        continue;
                    }
                }
                files.push(path);
            }
        }
        Ok(())
    }

    fn is_scenario_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| {
                self.config
                    .extensions
                    .iter()
                    .any(|ext| name.ends_with(ext.as_str()))
            })
            .unwrap_or(false)
    }

    /// Run all discovered scenarios
    pub fn run_all(&self) -> Result<RunResult, std::io::Error> {
        let start = Instant::now();
        let files = self.discover()?;

        let mut cases = Vec::new();
        for file in &files {
            cases.push(self.run_one(file));
        }

        Ok(RunResult {
            cases,
            duration: start.elapsed(),
        })
    }

    /// Count the scenarios that would be run
    pub fn count(&self) -> Result<usize, std::io::Error> {
        Ok(self.discover()?.len())
    }

    /// Run a single scenario file
    pub fn run_one(&self, file: &Path) -> CaseResult {
        let start = Instant::now();
        let name = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        let (scenario, tmpdir) = match self.prepare(file, &name) {
            Ok(pair) => pair,
            Err(error) => {
                return CaseResult {
                    name,
                    file: file.to_path_buf(),
                    passed: false,
                    error: Some(error),
                    log: String::new(),
                    duration: start.elapsed(),
                    workdir: None,
                };
            }
        };

        let workdir = tmpdir.path().to_path_buf();
        let mut ctx = ScenarioContext::new(workdir.clone());

        let (passed, error) = self.execute(file, &scenario, &mut ctx, &workdir);

        // Preserve the workdir on failure or when configured
        let preserved_workdir = if self.config.preserve_work || !passed {
            let path = tmpdir.path().to_path_buf();
            std::mem::forget(tmpdir); // leak to preserve
            Some(path)
        } else {
            None
        };

        CaseResult {
            name,
            file: file.to_path_buf(),
            passed,
            error,
            log: ctx.log,
            duration: start.elapsed(),
            workdir: preserved_workdir,
        }
    }

    /// Read the scenario file and create a working directory.
    fn prepare(&self, file: &Path, name: &str) -> Result<(String, tempfile::TempDir), String> {
        let scenario = std::fs::read_to_string(file)
            .map_err(|e| format!("failed to read scenario: {}", e))?;

        let tmpdir = self
            .create_workdir(name)
            .map_err(|e| format!("failed to create workdir: {}", e))?;

        Ok((scenario, tmpdir))
    }

    /// Run setup and execute the steps. Returns (passed, error).
    fn execute(
        &self,
        file: &Path,
        scenario: &str,
        ctx: &mut ScenarioContext,
        workdir: &Path,
    ) -> (bool, Option<String>) {
        if let Some(ref setup) = self.config.setup {
            let mut env = SetupEnv {
                work_dir: workdir.to_path_buf(),
                env: Vec::new(),
            };
            if let Err(e) = setup(&mut env) {
                return (false, Some(format!("setup failed: {}", e)));
            }
            for (k, v) in env.env {
                ctx.setenv(k, v);
            }
        }

        let filename = file.to_string_lossy().to_string();
        match self.engine.execute(ctx, scenario, &filename) {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        }
    }

    fn create_workdir(&self, name: &str) -> Result<tempfile::TempDir, std::io::Error> {
        let prefix = format!("stepspec-{}-", name);
        if let Some(ref root) = self.config.workdir_root {
            std::fs::create_dir_all(root)?;
            tempfile::Builder::new().prefix(&prefix).tempdir_in(root)
        } else {
            tempfile::Builder::new().prefix(&prefix).tempdir()
        }
    }
}

/// Run scenario files and integrate with `#[test]` by panicking on failure.
///
/// ```rust,ignore
/// #[test]
/// fn scenarios() {
///     dnf_stepspec::run_and_assert("tests/scenarios");
/// }
/// ```
pub fn run_and_assert(dir: impl Into<PathBuf>) {
    run_and_assert_with(dir, |_| {});
}

/// Like `run_and_assert` but allows engine customization.
pub fn run_and_assert_with(dir: impl Into<PathBuf>, customize: impl FnOnce(&mut Engine)) {
    run_and_assert_config(
        RunConfig {
            dir: dir.into(),
            verbose: std::env::var("STEPSPEC_VERBOSE").is_ok(),
            preserve_work: std::env::var("STEPSPEC_WORK").is_ok(),
            ..Default::default()
        },
        customize,
    );
}

/// Like `run_and_assert_with` but with full runner configuration.
pub fn run_and_assert_config(config: RunConfig, customize: impl FnOnce(&mut Engine)) {
    let mut engine = Engine::new();
    customize(&mut engine);

    let verbose = config.verbose;
    let runner = Runner::with_engine(engine, config);
    let result = runner.run_all().expect("failed to run scenarios");

    eprint!("{}", format_report(&result, verbose));

    if result.cases.is_empty() {
        panic!(
            "no scenarios found in {}",
            runner.config.dir.display()
        );
    }
    if !result.all_passed() {
        panic!("{} scenario(s) failed", result.failed_count());
    }
}

/// Render the per-case lines and summary printed by the
/// `run_and_assert` family. Verbose mode includes the execution log
/// for passing cases; failing cases always carry theirs.
fn format_report(result: &RunResult, verbose: bool) -> String {
    let mut out = String::new();
    for case in &result.cases {
        if case.passed {
            out.push_str(&format!(
                "PASS  {} ({}ms)\n",
                case.name,
                case.duration.as_millis()
            ));
            if verbose && !case.log.is_empty() {
                out.push_str("  --- log ---\n");
                for line in case.log.lines() {
                    out.push_str(&format!("  {}\n", line));
                }
            }
        } else {
            out.push_str(&format!("FAIL  {}\n", case.name));
            if let Some(ref err) = case.error {
                out.push_str(&format!("  {}\n", err));
            }
            if !case.log.is_empty() {
                out.push_str("  --- log ---\n");
                for line in case.log.lines() {
                    out.push_str(&format!("  {}\n", line));
                }
            }
            if let Some(ref wd) = case.workdir {
                out.push_str(&format!("  workdir: {}\n", wd.display()));
            }
        }
    }
    out.push_str(&format!("\n{}\n", result.summary()));
    out
}
