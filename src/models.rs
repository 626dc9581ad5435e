use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared dependency section: package name → version range, verbatim.
pub type DependencyMap = BTreeMap<String, String>;

/// Unified report for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub project: String,
    pub timestamp: String,
    pub dependencies: DependencyMap,
    pub dev_dependencies: DependencyMap,
    pub peer_dependencies: DependencyMap,
    /// Payload of `npm outdated --json`, relayed as-is.
    pub outdated: Value,
    /// Payload of `npm audit --json`, relayed as-is.
    pub vulnerabilities: Value,
}

/// Written in place of a [`Report`] when collection fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error: String,
    pub stack: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<AdditionalInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    pub project_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_version: Option<String>,
}

/// The single document printed per run.
///
/// Serialized untagged: consumers tell the two shapes apart by the presence
/// of the `error` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Failure(ErrorReport),
    Success(Report),
}

/// Empty JSON object used wherever a payload is absent.
pub fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Low,
        Severity::Moderate,
        Severity::High,
        Severity::Critical,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which manifest section a package was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Dependency,
    DevDependency,
    PeerDependency,
    Unknown,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyKind::Dependency => write!(f, "dependency"),
            DependencyKind::DevDependency => write!(f, "devDependency"),
            DependencyKind::PeerDependency => write!(f, "peerDependency"),
            DependencyKind::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTier {
    Security,
    Major,
    Minor,
    Patch,
    Unknown,
}

impl UpdateTier {
    /// 1 is most urgent.
    pub const fn priority(self) -> u8 {
        match self {
            UpdateTier::Security => 1,
            UpdateTier::Major => 2,
            UpdateTier::Minor | UpdateTier::Patch | UpdateTier::Unknown => 3,
        }
    }
}

impl std::fmt::Display for UpdateTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateTier::Security => write!(f, "security"),
            UpdateTier::Major => write!(f, "major"),
            UpdateTier::Minor => write!(f, "minor"),
            UpdateTier::Patch => write!(f, "patch"),
            UpdateTier::Unknown => write!(f, "unknown"),
        }
    }
}

/// Counts derived from a [`Report`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub dependencies: usize,
    pub dev_dependencies: usize,
    pub peer_dependencies: usize,
    pub outdated: usize,
    pub vulnerabilities: u64,
    pub by_severity: BTreeMap<Severity, u64>,
    /// Outdated packages that are also vulnerable (priority 1).
    pub security_updates: usize,
    /// Major version jumps (priority 2).
    pub major_updates: usize,
    /// Minor, patch and unclassified updates (priority 3).
    pub minor_updates: usize,
}

impl Summary {
    pub fn total_dependencies(&self) -> usize {
        self.dependencies + self.dev_dependencies + self.peer_dependencies
    }

    /// Number of vulnerabilities at `threshold` or above.
    pub fn at_or_above(&self, threshold: Severity) -> u64 {
        self.by_severity
            .iter()
            .filter(|(sev, _)| **sev >= threshold)
            .map(|(_, n)| *n)
            .sum()
    }
}

/// A suggested update for one outdated package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub package: String,
    pub kind: DependencyKind,
    pub current: Option<String>,
    pub available: String,
    pub update: UpdateTier,
    pub command: String,
}

impl Recommendation {
    pub fn priority(&self) -> u8 {
        self.update.priority()
    }
}
