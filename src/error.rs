use std::path::PathBuf;

use thiserror::Error;

/// Process exit codes.
///
/// Usage errors exit with `2`; clap reports those before any of these apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Report collected, nothing at or above the `--fail-on` threshold.
    Success = 0,
    /// Audit reported vulnerabilities at or above the `--fail-on` threshold.
    VulnerabilitiesFound = 1,
    /// Collection failed; an error report was written instead.
    CollectionFailed = 3,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Failures that abort a collection.
///
/// A package manager that cannot be launched is not one of these; it only
/// empties the affected section of the report.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("package.json not found at {}", .path.display())]
    ManifestMissing { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    ManifestInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{command}` produced output that is not valid JSON")]
    OutputUnparseable {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CollectError {
    /// Message followed by the chain of underlying causes.
    pub fn trace(&self) -> String {
        let mut out = format!("{}: {self}", self.kind());
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(&format!("\n    caused by: {cause}"));
            source = cause.source();
        }
        out
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CollectError::ManifestMissing { .. } => "ManifestMissing",
            CollectError::ManifestRead { .. } => "ManifestRead",
            CollectError::ManifestInvalid { .. } => "ManifestInvalid",
            CollectError::OutputUnparseable { .. } => "SubprocessOutputUnparseable",
        }
    }
}
