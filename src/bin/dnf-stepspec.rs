//! dnf-stepspec CLI
//!
//! Run DNF E2E scenarios from `.steps` files.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use dnf_stepspec::{RunConfig, Runner};

#[derive(Parser, Debug)]
#[command(name = "dnf-stepspec")]
#[command(version)]
#[command(about = "Run DNF E2E scenarios from .steps files")]
struct Cli {
    /// Directory or file to run
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Only run scenarios whose name contains this string
    #[arg(short = 'f', long)]
    filter: Option<String>,

    /// Verbose output: show the execution log
    #[arg(short, long)]
    verbose: bool,

    /// Keep working directories after a scenario (for debugging)
    #[arg(short = 'k', long = "keep")]
    keep: bool,

    /// Root directory for working directories
    #[arg(long = "workdir")]
    workdir: Option<PathBuf>,

    /// File extensions to match [default: .steps]
    #[arg(long = "ext", default_value = ".steps")]
    extensions: Vec<String>,

    /// List available step patterns
    #[arg(long = "list-steps")]
    list_steps: bool,

    /// Show number of scenarios without running
    #[arg(long = "count")]
    count: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list_steps {
        print_steps();
        return ExitCode::SUCCESS;
    }

    let is_file = cli.path.is_file();

    let config = RunConfig {
        dir: cli.path.clone(),
        filter: if is_file { None } else { cli.filter },
        workdir_root: cli.workdir,
        preserve_work: cli.keep,
        verbose: cli.verbose,
        extensions: cli.extensions,
        setup: None,
    };

    let runner = Runner::new(config);

    if cli.count {
        match runner.count() {
            Ok(count) => {
                println!("Found {} scenario(s)", count);
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let result = match runner.run_all() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for case in &result.cases {
        if case.passed {
            println!("PASS  {} ({}ms)", case.name, case.duration.as_millis());
            if cli.verbose && !case.log.is_empty() {
                for line in case.log.lines() {
                    println!("      {}", line);
                }
            }
        } else {
            println!("FAIL  {}", case.name);
            if let Some(ref err) = case.error {
                for line in err.lines() {
                    println!("      {}", line);
                }
            }
            if !case.log.is_empty() {
                println!("      --- log ---");
                for line in case.log.lines() {
                    println!("      {}", line);
                }
            }
            if let Some(ref wd) = case.workdir {
                println!("      workdir: {}", wd.display());
            }
        }
    }

    println!();
    println!("{}", result.summary());

    if result.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_steps() {
    println!("Registered steps:");
    println!();

    let engine = dnf_stepspec::Engine::new();
    for pattern in engine.patterns() {
        println!("  {}", pattern);
    }

    println!();
    println!("Scenario syntax:");
    println!("  Given/When/Then <step>   a step (And/But inherit the keyword)");
    println!("  #                        comment line");
    println!("  Feature:/Scenario:       section marker");
    println!("  \"\"\" ... \"\"\"              doc string attached to a step");
    println!("  | key | value |          data table attached to a step");
}
