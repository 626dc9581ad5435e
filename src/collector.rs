use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CollectError;
use crate::manifest::read_manifest;
use crate::models::{empty_object, AdditionalInfo, ErrorReport, Outcome, Report};
use crate::npm::{Invocation, PackageManager};

/// Gathers a [`Report`] for one project directory.
pub struct Collector<P> {
    project_dir: PathBuf,
    package_manager: P,
}

impl<P: PackageManager> Collector<P> {
    pub fn new(project_dir: impl Into<PathBuf>, package_manager: P) -> Self {
        Self {
            project_dir: project_dir.into(),
            package_manager,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Manifest, then `outdated`, then `audit`, merged into one report.
    pub fn collect(&self) -> Result<Report, CollectError> {
        let manifest = read_manifest(&self.project_dir)?;

        let outdated = self.payload(
            "outdated",
            self.package_manager.outdated(&self.project_dir),
        )?;
        let vulnerabilities = self.payload("audit", self.package_manager.audit(&self.project_dir))?;

        let report = Report {
            project: project_name(&self.project_dir),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            dependencies: manifest.dependencies,
            dev_dependencies: manifest.dev_dependencies,
            peer_dependencies: manifest.peer_dependencies,
            outdated,
            vulnerabilities,
        };

        info!(project = %report.project, "collected report");
        Ok(report)
    }

    /// Like [`collect`](Self::collect), with any failure turned into an
    /// [`ErrorReport`].
    pub fn collect_outcome(&self) -> Outcome {
        match self.collect() {
            Ok(report) => Outcome::Success(report),
            Err(err) => {
                warn!("collection failed: {err}");
                Outcome::Failure(self.error_report(&err))
            }
        }
    }

    fn error_report(&self, err: &CollectError) -> ErrorReport {
        ErrorReport {
            error: err.to_string(),
            stack: err.trace(),
            additional_info: Some(AdditionalInfo {
                project_path: self.project_dir.display().to_string(),
                node_version: self.package_manager.runtime_version(),
                npm_version: self.package_manager.version(),
            }),
        }
    }

    fn payload(&self, subcommand: &str, invocation: Invocation) -> Result<Value, CollectError> {
        let stdout = match invocation {
            Invocation::Success(stdout) => stdout,
            Invocation::NonZeroExit { code, stdout } => {
                debug!(subcommand, ?code, "non-zero exit, reading payload");
                stdout
            }
            Invocation::LaunchFailure(reason) => {
                warn!(subcommand, "skipping: {reason}");
                return Ok(empty_object());
            }
        };

        parse_payload(&stdout).map_err(|source| CollectError::OutputUnparseable {
            command: self.package_manager.describe(subcommand),
            source,
        })
    }
}

/// Blank output means "nothing to report".
fn parse_payload(stdout: &str) -> Result<Value, serde_json::Error> {
    if stdout.trim().is_empty() {
        return Ok(empty_object());
    }
    serde_json::from_str(stdout)
}

/// Final path segment of `dir`, resolving `.` and friends first.
pub fn project_name(dir: &Path) -> String {
    if let Some(name) = dir.file_name() {
        return name.to_string_lossy().into_owned();
    }
    dir.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| dir.display().to_string())
}
