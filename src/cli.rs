use std::path::PathBuf;

use clap::Parser;

use crate::models::Severity;

#[derive(Parser, Debug)]
#[command(
    name = "npm-advisor",
    about = "Collect npm dependency, outdated and audit data into a single JSON report",
    version
)]
pub struct Cli {
    /// Project directory containing package.json
    #[arg(default_value = ".", env = "SCAN_PROJECT_PATH")]
    pub path: PathBuf,

    /// Package manager executable [default: npm, or package_manager.program from config]
    #[arg(long, value_name = "PROGRAM")]
    pub npm: Option<String>,

    /// Per-command timeout in seconds for `outdated` and `audit`
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file [default: ./.npm-advisor/config.toml, fallback ~/.config/npm-advisor/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Also write the JSON document to this file
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exit with code 1 when the audit reports vulnerabilities at or above this severity
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on: Option<SeverityArg>,

    /// Log debug details to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors to stderr
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Json,
    Terminal,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SeverityArg {
    Info,
    Low,
    Moderate,
    High,
    Critical,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Low => Severity::Low,
            SeverityArg::Moderate => Severity::Moderate,
            SeverityArg::High => Severity::High,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}
