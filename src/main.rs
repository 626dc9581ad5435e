//! `npm-advisor` — collect a project's declared, outdated and vulnerable npm
//! dependencies into one JSON report.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]); flags override it.
//! 3. Read `package.json`, run `npm outdated` and `npm audit` ([`collector`]).
//! 4. Render the outcome ([`report`]): pure JSON on stdout by default.
//! 5. Exit `0`, `1` (vulnerabilities at or above `--fail-on`), or `3`
//!    (collection failed, error report written).

mod advice;
mod cli;
mod collector;
mod config;
mod error;
mod manifest;
mod models;
mod npm;
mod report;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use collector::Collector;
use config::load_config;
use error::ExitCode;
use models::{ErrorReport, Outcome, Severity};
use npm::NpmCli;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            // Still hand the caller a JSON document.
            let outcome = Outcome::Failure(ErrorReport {
                error: err.to_string(),
                stack: format!("{err:?}"),
                additional_info: None,
            });
            match report::json::render(&outcome, cli.pretty) {
                Ok(text) => println!("{text}"),
                Err(_) => eprintln!("error: {err:#}"),
            }
            ExitCode::CollectionFailed
        }
    };

    std::process::exit(code.as_i32());
}

fn run(cli: &Cli) -> Result<ExitCode> {
    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;

    let program = cli
        .npm
        .clone()
        .unwrap_or_else(|| config.package_manager.program.clone());
    let timeout = cli
        .timeout
        .map(Duration::from_secs)
        .or_else(|| config.package_manager.timeout());
    let fail_on = cli.fail_on.map(Severity::from).or(config.policy.fail_on);

    debug!(path = %path.display(), %program, ?timeout, ?fail_on, "starting collection");

    let collector = Collector::new(&path, NpmCli::new(program, timeout));

    let spinner = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("Collecting npm data for {}", collector.project_dir().display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    let outcome = collector.collect_outcome();
    spinner.finish_and_clear();

    // Saved first; a failed save is logged so stdout still carries one document.
    if let Some(out) = &cli.output {
        if let Err(err) = report::json::write_file(&outcome, cli.pretty, out) {
            tracing::error!("could not save report: {err:#}");
        }
    }

    match cli.report {
        ReportFormat::Json => println!("{}", report::json::render(&outcome, cli.pretty)?),
        ReportFormat::Terminal => report::terminal::render(&outcome, &path),
    }

    Ok(exit_code(&outcome, fail_on))
}

fn exit_code(outcome: &Outcome, fail_on: Option<Severity>) -> ExitCode {
    let report = match outcome {
        Outcome::Failure(_) => return ExitCode::CollectionFailed,
        Outcome::Success(report) => report,
    };

    match fail_on {
        Some(threshold) if advice::summarize(report).at_or_above(threshold) > 0 => {
            ExitCode::VulnerabilitiesFound
        }
        _ => ExitCode::Success,
    }
}

/// Logs go to stderr so stdout stays a single JSON document.
/// `RUST_LOG` takes precedence over `-v` / `-q`.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new("warn")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{empty_object, DependencyMap, Report};
    use serde_json::json;

    fn report_with(vulnerabilities: serde_json::Value) -> Outcome {
        Outcome::Success(Report {
            project: "demo".to_string(),
            timestamp: "2026-10-16T09:30:00.000Z".to_string(),
            dependencies: DependencyMap::new(),
            dev_dependencies: DependencyMap::new(),
            peer_dependencies: DependencyMap::new(),
            outdated: empty_object(),
            vulnerabilities,
        })
    }

    #[test]
    fn test_exit_code_for_failure() {
        let outcome = Outcome::Failure(ErrorReport {
            error: "x".to_string(),
            stack: "x".to_string(),
            additional_info: None,
        });
        assert_eq!(exit_code(&outcome, None), ExitCode::CollectionFailed);
    }

    #[test]
    fn test_exit_code_threshold() {
        let outcome = report_with(json!({
            "metadata": { "vulnerabilities": { "moderate": 1, "total": 1 } }
        }));
        assert_eq!(exit_code(&outcome, None), ExitCode::Success);
        assert_eq!(exit_code(&outcome, Some(Severity::High)), ExitCode::Success);
        assert_eq!(
            exit_code(&outcome, Some(Severity::Moderate)),
            ExitCode::VulnerabilitiesFound
        );
    }
}
