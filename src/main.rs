//! FileBatch CLI - audited batch file operations
//!
//! Runs one operation (or a plan of operations) on a single operator and
//! prints the resulting status report.

use clap::Parser;
use filebatch::config::{CliArgs, Commands, OutputFormat, Settings};
use filebatch::core::{BatchPlan, FileBatchOperator, StatusSnapshot, VerifyOutcome};
use filebatch::error::Result;
use filebatch::fs::LocalFileSystem;
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Report written to stdout and `--status-file`
#[derive(Serialize)]
struct Report<'a> {
    generated_at: chrono::DateTime<chrono::Utc>,
    operation: &'static str,
    passed: Option<bool>,
    #[serde(flatten)]
    snapshot: &'a StatusSnapshot,
}

fn main() {
    let args = CliArgs::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(Some(true)) => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn run(args: &CliArgs) -> Result<Option<bool>> {
    let settings = Settings::from_cli(args)?;
    let fs = LocalFileSystem::new(settings.copy_options()?);
    let mut operator = FileBatchOperator::with_fs(fs);

    let (operation, passed) = match &args.command {
        Commands::Verify { source, files, all } => {
            let files = files.collect()?;
            let outcome = operator.verify(&files, source, *all);
            if outcome == VerifyOutcome::ParamsMissing {
                tracing::warn!("verification undetermined: no files or no directory given");
            }
            ("verify", outcome.passed())
        }
        Commands::Copy {
            source,
            destination,
            files,
            overwrite,
        } => {
            let files = files.collect()?;
            ("copy", Some(operator.copy(&files, source, destination, *overwrite)))
        }
        Commands::Delete { source, files } => {
            let files = files.collect()?;
            ("delete", Some(operator.delete(&files, source)))
        }
        Commands::Move {
            source,
            destination,
            files,
            overwrite,
        } => {
            let files = files.collect()?;
            ("move", Some(operator.move_files(&files, source, destination, *overwrite)))
        }
        Commands::Run {
            plan,
            continue_on_failure,
        } => {
            let mut plan = BatchPlan::load(plan)?;
            plan.continue_on_failure |= *continue_on_failure;
            let report = operator.run_plan(&plan);
            if report.skipped > 0 {
                tracing::warn!(skipped = report.skipped, "plan stopped early");
            }
            ("run", Some(report.success))
        }
    };

    let snapshot = operator.status();
    let report = Report {
        generated_at: chrono::Utc::now(),
        operation,
        passed,
        snapshot: &snapshot,
    };

    if let Some(path) = &args.status_file {
        write_report(&report, path)?;
    }

    if !args.quiet {
        match args.format {
            OutputFormat::Text => print!("{}", snapshot.summary()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
    }

    Ok(passed)
}

fn write_report(report: &Report<'_>, path: &Path) -> Result<()> {
    use filebatch::error::IoResultExt;

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_path(path)?;
    tracing::info!(path = %path.display(), "status report written");
    Ok(())
}
