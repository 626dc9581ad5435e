//! Summaries and update recommendations derived from a collected [`Report`].
//!
//! Everything here is a pure function of the report: no I/O, no network.

use semver::Version;
use serde_json::Value;

use crate::models::{DependencyKind, Recommendation, Report, Severity, Summary, UpdateTier};

/// Count declared, outdated and vulnerable packages, and outdated packages
/// per update priority.
///
/// Vulnerability counts come from the audit payload's
/// `metadata.vulnerabilities` block; without it, the total is the number of
/// entries under `vulnerabilities`.
pub fn summarize(report: &Report) -> Summary {
    let mut summary = Summary {
        dependencies: report.dependencies.len(),
        dev_dependencies: report.dev_dependencies.len(),
        peer_dependencies: report.peer_dependencies.len(),
        outdated: report.outdated.as_object().map_or(0, |m| m.len()),
        ..Summary::default()
    };

    let counts = report
        .vulnerabilities
        .get("metadata")
        .and_then(|m| m.get("vulnerabilities"));

    match counts {
        Some(counts) => {
            for severity in Severity::ALL {
                let n = counts.get(severity.as_str()).and_then(Value::as_u64).unwrap_or(0);
                if n > 0 {
                    summary.by_severity.insert(severity, n);
                }
            }
            summary.vulnerabilities = counts
                .get("total")
                .and_then(Value::as_u64)
                .unwrap_or_else(|| summary.by_severity.values().sum());
        }
        None => {
            if let Some(entries) = vulnerable_entries(report) {
                summary.vulnerabilities = entries.len() as u64;
                for entry in entries.values() {
                    let severity = entry
                        .get("severity")
                        .and_then(Value::as_str)
                        .and_then(parse_severity);
                    if let Some(severity) = severity {
                        *summary.by_severity.entry(severity).or_insert(0) += 1;
                    }
                }
            }
        }
    }

    for rec in recommend(report) {
        match rec.priority() {
            1 => summary.security_updates += 1,
            2 => summary.major_updates += 1,
            _ => summary.minor_updates += 1,
        }
    }

    summary
}

/// One recommendation per outdated package, most urgent first.
pub fn recommend(report: &Report) -> Vec<Recommendation> {
    let Some(outdated) = report.outdated.as_object() else {
        return Vec::new();
    };
    let vulnerable = vulnerable_entries(report);

    let mut recs: Vec<Recommendation> = outdated
        .iter()
        .filter_map(|(name, info)| {
            let current = info.get("current").and_then(Value::as_str).map(str::to_string);
            let available = info
                .get("latest")
                .and_then(Value::as_str)
                .or_else(|| info.get("wanted").and_then(Value::as_str))?
                .to_string();

            let kind = kind_of(report, name);
            let update = if vulnerable.is_some_and(|v| v.contains_key(name)) {
                UpdateTier::Security
            } else {
                tier(current.as_deref(), &available)
            };

            Some(Recommendation {
                command: install_command(name, &available, kind),
                package: name.clone(),
                kind,
                current,
                available,
                update,
            })
        })
        .collect();

    recs.sort_by(|a, b| {
        a.priority()
            .cmp(&b.priority())
            .then_with(|| a.package.cmp(&b.package))
    });
    recs
}

fn vulnerable_entries(report: &Report) -> Option<&serde_json::Map<String, Value>> {
    report
        .vulnerabilities
        .get("vulnerabilities")
        .and_then(Value::as_object)
}

fn parse_severity(s: &str) -> Option<Severity> {
    Severity::ALL.into_iter().find(|sev| sev.as_str() == s)
}

fn kind_of(report: &Report, name: &str) -> DependencyKind {
    if report.dependencies.contains_key(name) {
        DependencyKind::Dependency
    } else if report.dev_dependencies.contains_key(name) {
        DependencyKind::DevDependency
    } else if report.peer_dependencies.contains_key(name) {
        DependencyKind::PeerDependency
    } else {
        DependencyKind::Unknown
    }
}

/// Classify the jump from `current` to `available`.
fn tier(current: Option<&str>, available: &str) -> UpdateTier {
    let (Some(current), Ok(next)) = (current, Version::parse(available)) else {
        return UpdateTier::Unknown;
    };
    let Ok(current) = Version::parse(current) else {
        return UpdateTier::Unknown;
    };

    if current.major != next.major {
        UpdateTier::Major
    } else if current.minor != next.minor {
        UpdateTier::Minor
    } else {
        UpdateTier::Patch
    }
}

fn install_command(name: &str, version: &str, kind: DependencyKind) -> String {
    let mut cmd = format!("npm install {name}@{version}");
    if kind == DependencyKind::DevDependency {
        cmd.push_str(" --save-dev");
    }
    cmd
}
