#![warn(missing_docs)]
//! Stresstest CLI Library
//!
//! Command-line front end for differential stress testing. Parses the
//! `test <program> <bruteforce> <generator>` command, layers `stress.toml`
//! defaults under the flags, runs every case through the [`Orchestrator`] and
//! prints the failure report.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> std::process::ExitCode {
//!     match stresstest_cli::run() {
//!         Ok(code) => code,
//!         Err(e) => {
//!             eprintln!("Error: {:#}", e);
//!             stresstest_cli::EXIT_FATAL.into()
//!         }
//!     }
//! }
//! ```

mod config;
mod orchestrator;
mod progress;

pub use config::*;
pub use orchestrator::{Orchestrator, OrchestratorError};
pub use progress::ConsoleProgress;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use owo_colors::{OwoColorize, Stream, Style};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use stresstest_core::{CaseCommands, CommandSpec, ProcessRunner, WorkDir};
use stresstest_report::{LineKind, OutputFormat, ReportLine};

/// Exit code when at least one case failed
pub const EXIT_CASES_FAILED: u8 = 1;
/// Exit code for fatal errors (bad configuration, orchestrator failure)
pub const EXIT_FATAL: u8 = 2;

/// Stresstest CLI arguments
#[derive(Parser, Debug)]
#[command(name = "stresstest")]
#[command(
    author,
    version,
    about = "Stresstest - differential testing against a bruteforce solution"
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test your program against a bruteforce solution on generated inputs
    Test(TestArgs),
    /// Print a default stress.toml
    Init,
}

/// Arguments of `stresstest test`
#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    /// Solution under test
    pub program: PathBuf,

    /// Known-correct (slow) solution
    pub bruteforce: PathBuf,

    /// Random test generator
    pub generator: PathBuf,

    /// How many tests to generate [default: 10]
    #[arg(short, long)]
    pub count: Option<usize>,

    /// Remove the working directory after testing
    #[arg(short, long)]
    pub remove: bool,

    /// Use python3 command instead of just python
    #[arg(long)]
    pub python3: bool,

    /// Programs are already compiled executables
    #[arg(long)]
    pub exe: bool,

    /// Number of tests run concurrently (0 = all cores)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Kill a program that runs longer than this (e.g., "5s"); default waits forever
    #[arg(long)]
    pub timeout: Option<String>,

    /// Working directory for generated files [default: generated-tests]
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Report format: human, json
    #[arg(long)]
    pub format: Option<String>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Effective settings after layering stress.toml under CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Number of cases
    pub count: usize,
    /// Worker threads (0 = all cores)
    pub jobs: usize,
    /// Per-process timeout
    pub timeout: Option<Duration>,
    /// Interpreter for scripts
    pub interpreter: String,
    /// Run programs directly
    pub exe: bool,
    /// Working directory
    pub directory: PathBuf,
    /// Report format
    pub format: OutputFormat,
    /// Delete the working directory afterwards
    pub remove: bool,
}

impl RunSettings {
    /// Layer: built-in defaults → stress.toml → CLI flags.
    pub fn resolve(args: &TestArgs, config: &StressConfig) -> anyhow::Result<Self> {
        let timeout = match &args.timeout {
            Some(raw) => Some(parse_duration(raw)?),
            None => config.timeout()?,
        };
        let format = args
            .format
            .as_deref()
            .unwrap_or(&config.output.format)
            .parse::<OutputFormat>()
            .map_err(anyhow::Error::msg)?;
        let interpreter = if args.python3 {
            "python3".to_string()
        } else {
            config.runner.interpreter.clone()
        };

        Ok(Self {
            count: args.count.unwrap_or(config.runner.count),
            jobs: args.jobs.unwrap_or(config.runner.jobs),
            timeout,
            interpreter,
            exe: args.exe || config.runner.exe,
            directory: args
                .dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.output.directory)),
            format,
            remove: args.remove || config.output.remove,
        })
    }

    /// Command specs for the three programs
    pub fn commands(&self, args: &TestArgs) -> CaseCommands {
        let resolve = |path: &PathBuf| CommandSpec::resolve(path, self.exe, &self.interpreter);
        CaseCommands {
            program: resolve(&args.program),
            reference: resolve(&args.bruteforce),
            generator: resolve(&args.generator),
        }
    }
}

/// Run the Stresstest CLI with the process arguments.
///
/// # Returns
/// The exit code for the run, or an error for fatal failures.
pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Stresstest CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<ExitCode> {
    init_logging(cli.verbose);

    match cli.command {
        Commands::Test(args) => {
            // Discover stress.toml configuration (CLI flags override)
            let config = StressConfig::discover().unwrap_or_default();
            run_tests(&args, &config)
        }
        Commands::Init => {
            print!("{}", StressConfig::default_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "stresstest=debug"
    } else {
        "stresstest=warn"
    };
    // Ignore "already set" when embedded in a host that installed its own subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_tests(args: &TestArgs, config: &StressConfig) -> anyhow::Result<ExitCode> {
    let settings = RunSettings::resolve(args, config)?;
    tracing::debug!(?settings, "resolved settings");

    let workdir = WorkDir::create(&settings.directory).with_context(|| {
        format!(
            "Failed to create working directory {}",
            settings.directory.display()
        )
    })?;

    let orchestrator = Orchestrator::new(
        settings.commands(args),
        ProcessRunner::new(settings.timeout),
        settings.jobs,
    );
    let progress = match settings.format {
        OutputFormat::Human => ConsoleProgress::new(settings.count),
        OutputFormat::Json => ConsoleProgress::hidden(),
    };

    let outcome = orchestrator.run_all(settings.count, &workdir, &progress);
    match &outcome {
        Ok(summary) => progress.finish(stresstest_report::summary_text(summary)),
        Err(_) => progress.finish("aborted"),
    }

    if settings.remove {
        let root = workdir.root().to_path_buf();
        if let Err(e) = workdir.remove() {
            eprintln!("Warning: failed to remove {}: {}", root.display(), e);
        }
    }

    // Fatal errors are reported once by the caller, without a per-case listing
    let summary = outcome?;

    match settings.format {
        OutputFormat::Human => {
            let lines = stresstest_report::render(&summary);
            match &args.output {
                Some(path) => write_report(path, &stresstest_report::render_plain(&summary))?,
                None => print_human(&lines)?,
            }
        }
        OutputFormat::Json => {
            let json = stresstest_report::generate_json_report(&summary)?;
            match &args.output {
                Some(path) => write_report(path, &json)?,
                None => println!("{}", json),
            }
        }
    }

    if summary.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_CASES_FAILED))
    }
}

fn write_report(path: &std::path::Path, contents: &str) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(contents.as_bytes())?;
    eprintln!("Report written to: {}", path.display());
    Ok(())
}

fn print_human(lines: &[ReportLine]) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        let style = match line.kind {
            LineKind::Blank => {
                writeln!(out)?;
                continue;
            }
            LineKind::CaseId => Style::new().yellow(),
            LineKind::Label => Style::new().red().bold(),
            LineKind::Cause => Style::new().red(),
            LineKind::Summary => Style::new().bold(),
        };
        writeln!(
            out,
            "{}",
            line.text
                .if_supports_color(Stream::Stdout, |text| text.style(style))
        )?;
    }
    Ok(())
}
