use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::models::Severity;

/// Root configuration structure, deserialized from `.npm-advisor/config.toml`.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub package_manager: PackageManagerConfig,
    pub policy: PolicyConfig,
}

/// How the package manager is invoked.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackageManagerConfig {
    /// Executable name or path. Defaults to `npm`.
    pub program: String,
    /// Upper bound for each `outdated`/`audit` run. Unbounded when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            program: "npm".to_string(),
            timeout_secs: None,
        }
    }
}

impl PackageManagerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Exit with a failure code when the audit finds anything this severe.
    pub fail_on: Option<Severity>,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.npm-advisor/config.toml`
/// 3. `~/.config/npm-advisor/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".npm-advisor").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("npm-advisor").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    debug!("no config file found, using defaults");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.package_manager.program, "npm");
        assert_eq!(cfg.package_manager.timeout(), None);
        assert_eq!(cfg.policy.fail_on, None);
    }

    #[test]
    fn test_project_config_is_used() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".npm-advisor")).unwrap();
        std::fs::write(
            dir.path().join(".npm-advisor").join("config.toml"),
            r#"
[package_manager]
program = "/opt/node/bin/npm"
timeout_secs = 90

[policy]
fail_on = "high"
"#,
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.package_manager.program, "/opt/node/bin/npm");
        assert_eq!(cfg.package_manager.timeout(), Some(Duration::from_secs(90)));
        assert_eq!(cfg.policy.fail_on, Some(Severity::High));
    }

    #[test]
    fn test_override_wins_and_partial_tables_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[policy]\nfail_on = \"critical\"\n").unwrap();

        let cfg = load_config(dir.path(), Some(&path)).unwrap();
        assert_eq!(cfg.package_manager, PackageManagerConfig::default());
        assert_eq!(cfg.policy.fail_on, Some(Severity::Critical));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[package_manager]\nprogramme = \"npm\"\n").unwrap();
        let err = load_config(dir.path(), Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn test_missing_override_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(dir.path(), Some(&missing)).is_err());
    }
}
