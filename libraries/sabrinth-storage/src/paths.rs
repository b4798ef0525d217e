/// Application data directories
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Resolved application data layout
///
/// Everything the player persists lives under one root:
/// `saved_playlists.json`, `stats.json`, `settings.json`, plus the
/// `imports/` staging area for archive extraction and `downloads/` for
/// fetched audio.
#[derive(Debug, Clone)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    /// Use an explicit root directory (tests, portable installs)
    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Resolve the per-user data directory
    ///
    /// Follows `$XDG_DATA_HOME`, then `$HOME/.local/share`, then falls back
    /// to a dot directory under the working directory.
    pub fn resolve() -> Result<Self> {
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .or_else(|| {
                std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share"))
            });
        match base {
            Some(base) => Self::at(base.join("sabrinth-player")),
            None => Self::at(".sabrinth-player"),
        }
    }

    /// Root data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the saved playlists document
    pub fn playlists_path(&self) -> PathBuf {
        self.root.join("saved_playlists.json")
    }

    /// Location of the play statistics document
    pub fn stats_path(&self) -> PathBuf {
        self.root.join("stats.json")
    }

    /// Location of the settings document
    pub fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// Staging area for archive extraction, created on demand
    pub fn imports_dir(&self) -> Result<PathBuf> {
        let dir = self.root.join("imports");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Destination for downloaded audio, created on demand
    pub fn downloads_dir(&self) -> Result<PathBuf> {
        let dir = self.root.join("downloads");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = AppDirs::at(dir.path().join("data")).unwrap();
        assert!(dirs.root().is_dir());
        assert_eq!(dirs.playlists_path().file_name().unwrap(), "saved_playlists.json");
    }

    #[test]
    fn imports_dir_is_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = AppDirs::at(dir.path()).unwrap();
        let imports = dirs.imports_dir().unwrap();
        assert!(imports.is_dir());
    }
}
