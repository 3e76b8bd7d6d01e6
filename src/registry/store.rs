use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Library name -> release-note URLs, stored as one JSON object on disk.
pub type Registry = BTreeMap<String, Vec<String>>;

pub fn load(path: &Path) -> Result<Registry> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("registry not found: {}", path.display()))?;
    let reg = serde_json::from_str(&raw)
        .with_context(|| format!("invalid registry JSON: {}", path.display()))?;
    Ok(reg)
}

pub fn load_or_default(path: &Path) -> Result<Registry> {
    if !path.exists() {
        return Ok(Registry::new());
    }
    load(path)
}

pub fn save(path: &Path, registry: &Registry) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(path)
        .with_context(|| format!("cannot write registry: {}", path.display()))?;
    serde_json::to_writer_pretty(file, registry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        let mut reg = Registry::new();
        reg.insert(
            "requests".to_string(),
            vec!["https://example.com/requests/v2.31.0".to_string()],
        );
        save(&path, &reg).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, reg);
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let reg = load_or_default(&path).unwrap();
        assert!(reg.is_empty());
    }

    #[test]
    fn load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load(&path).is_err());
    }
}
