use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::CollectError;
use crate::models::DependencyMap;

pub const MANIFEST_FILE: &str = "package.json";

/// The dependency sections of a `package.json`.
///
/// A section that is absent or `null` reads as empty; an empty object stays
/// empty.
#[derive(Debug, Default, PartialEq)]
pub struct Manifest {
    pub dependencies: DependencyMap,
    pub dev_dependencies: DependencyMap,
    pub peer_dependencies: DependencyMap,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    dependencies: Option<DependencyMap>,
    #[serde(default)]
    dev_dependencies: Option<DependencyMap>,
    #[serde(default)]
    peer_dependencies: Option<DependencyMap>,
}

impl From<RawManifest> for Manifest {
    fn from(raw: RawManifest) -> Self {
        Manifest {
            dependencies: raw.dependencies.unwrap_or_default(),
            dev_dependencies: raw.dev_dependencies.unwrap_or_default(),
            peer_dependencies: raw.peer_dependencies.unwrap_or_default(),
        }
    }
}

pub fn manifest_path(project_dir: &Path) -> PathBuf {
    project_dir.join(MANIFEST_FILE)
}

/// Read `<project_dir>/package.json`.
pub fn read_manifest(project_dir: &Path) -> Result<Manifest, CollectError> {
    let path = manifest_path(project_dir);
    if !path.is_file() {
        return Err(CollectError::ManifestMissing { path });
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(source) => return Err(CollectError::ManifestRead { path, source }),
    };

    let manifest = parse_manifest(&content)
        .map_err(|source| CollectError::ManifestInvalid { path: path.clone(), source })?;

    debug!(
        path = %path.display(),
        dependencies = manifest.dependencies.len(),
        dev_dependencies = manifest.dev_dependencies.len(),
        peer_dependencies = manifest.peer_dependencies.len(),
        "read manifest"
    );

    Ok(manifest)
}

fn parse_manifest(content: &str) -> Result<Manifest, serde_json::Error> {
    let raw: RawManifest = serde_json::from_str(content)?;
    Ok(raw.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_with(json: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), json).unwrap();
        dir
    }

    #[test]
    fn test_read_all_sections() {
        let dir = project_with(
            r#"{
  "name": "my-app",
  "dependencies": { "express": "^4.18.2", "lodash": "^4.17.21" },
  "devDependencies": { "jest": "^29.0.0" },
  "peerDependencies": { "react": ">=17" }
}"#,
        );
        let manifest = read_manifest(dir.path()).unwrap();
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.dependencies["express"], "^4.18.2");
        assert_eq!(manifest.dev_dependencies["jest"], "^29.0.0");
        assert_eq!(manifest.peer_dependencies["react"], ">=17");
    }

    #[test]
    fn test_absent_sections_are_empty() {
        let dir = project_with(r#"{ "name": "bare", "version": "1.0.0" }"#);
        let manifest = read_manifest(dir.path()).unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_null_section_is_empty() {
        let manifest = parse_manifest(r#"{ "devDependencies": null }"#).unwrap();
        assert!(manifest.dev_dependencies.is_empty());
    }

    #[test]
    fn test_ranges_kept_verbatim() {
        let manifest = parse_manifest(
            r#"{ "dependencies": { "a": "workspace:*", "b": "git+https://x/y.git#v1", "c": "" } }"#,
        )
        .unwrap();
        assert_eq!(manifest.dependencies["a"], "workspace:*");
        assert_eq!(manifest.dependencies["b"], "git+https://x/y.git#v1");
        assert_eq!(manifest.dependencies["c"], "");
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = read_manifest(dir.path()).unwrap_err();
        match err {
            CollectError::ManifestMissing { path } => {
                assert_eq!(path, dir.path().join(MANIFEST_FILE));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json() {
        let dir = project_with(r#"{ "dependencies": { "a": "1.0.0", } "#);
        let err = read_manifest(dir.path()).unwrap_err();
        assert!(matches!(err, CollectError::ManifestInvalid { .. }));
    }
}
