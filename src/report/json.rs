use std::path::Path;

use anyhow::{Context, Result};

use crate::models::Outcome;

/// Serialize the outcome as a single JSON document.
pub fn render(outcome: &Outcome, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(outcome)?
    } else {
        serde_json::to_string(outcome)?
    };
    Ok(text)
}

/// Write the document to `path`, creating parent directories as needed.
pub fn write_file(outcome: &Outcome, pretty: bool, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let text = render(outcome, pretty)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorReport;
    use tempfile::TempDir;

    fn failed() -> Outcome {
        Outcome::Failure(ErrorReport {
            error: "package.json not found at /x/package.json".to_string(),
            stack: "ManifestMissing: package.json not found at /x/package.json".to_string(),
            additional_info: None,
        })
    }

    #[test]
    fn test_compact_is_single_line() {
        let text = render(&failed(), false).unwrap();
        assert!(!text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("error").is_some());
    }

    #[test]
    fn test_pretty_parses_to_same_value() {
        let compact: serde_json::Value =
            serde_json::from_str(&render(&failed(), false).unwrap()).unwrap();
        let pretty: serde_json::Value =
            serde_json::from_str(&render(&failed(), true).unwrap()).unwrap();
        assert_eq!(compact, pretty);
    }

    #[test]
    fn test_write_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join("advisor.json");
        write_file(&failed(), false, &path).unwrap();
        let back: Outcome =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, failed());
    }
}
