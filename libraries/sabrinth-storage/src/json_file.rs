/// Shared JSON document helpers
///
/// All persistent state is small JSON files, loaded leniently (a missing or
/// corrupt file yields the default rather than failing startup) and written
/// atomically via a temp file rename.
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// Load a document, falling back to the default when missing or unreadable
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to read, using defaults");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "corrupt document, using defaults");
            T::default()
        }
    }
}

/// Write a document atomically (temp file then rename)
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let raw = serde_json::to_string_pretty(value)?;
    std::fs::write(&tmp, raw)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: BTreeMap<String, u32> = load_or_default(&dir.path().join("absent.json"));
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, b"{{{{").unwrap();
        let loaded: BTreeMap<String, u32> = load_or_default(&path);
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let mut doc = BTreeMap::new();
        doc.insert("answer".to_string(), 42u32);
        save(&path, &doc).unwrap();

        let loaded: BTreeMap<String, u32> = load_or_default(&path);
        assert_eq!(loaded, doc);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
