//! Folder scanning for audio files

use crate::{IngestError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported audio file extensions
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "m4a", "aac"];

/// Result of scanning a folder
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Audio files, sorted case-insensitively by path
    pub files: Vec<PathBuf>,
    /// Entries the walker could not read
    pub entry_errors: Vec<(PathBuf, String)>,
}

/// Scanner for audio files in folders
pub struct FolderScanner {
    /// Descend into subdirectories
    recursive: bool,

    /// Whether to follow symbolic links
    follow_links: bool,
}

impl Default for FolderScanner {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_links: false,
        }
    }
}

impl FolderScanner {
    /// Create a new scanner
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to descend into subdirectories
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Scan a folder for audio files
    ///
    /// Files come back in the queue's natural order: sorted by
    /// case-insensitive path. Unreadable entries are collected rather than
    /// aborting the scan.
    pub fn scan(&self, path: &Path) -> Result<ScanOutcome> {
        if !path.exists() {
            return Err(IngestError::SourceNotFound(path.display().to_string()));
        }
        if !path.is_dir() {
            return Err(IngestError::InvalidSource(format!(
                "{} is not a directory",
                path.display()
            )));
        }

        let mut walker = WalkDir::new(path).follow_links(self.follow_links);
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let mut outcome = ScanOutcome::default();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let entry_path = entry.path();
                    if entry_path.is_file() && is_audio_file(entry_path) {
                        outcome.files.push(entry_path.to_path_buf());
                    }
                }
                Err(e) => {
                    let at = e
                        .path()
                        .map_or_else(|| path.to_path_buf(), Path::to_path_buf);
                    outcome.entry_errors.push((at, e.to_string()));
                }
            }
        }

        outcome
            .files
            .sort_by_key(|p| p.to_string_lossy().to_lowercase());
        Ok(outcome)
    }
}

/// Check if a file is a supported audio file
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("test.mp3")));
        assert!(is_audio_file(Path::new("test.MP3")));
        assert!(is_audio_file(Path::new("test.flac")));
        assert!(is_audio_file(Path::new("test.m4a")));
        assert!(!is_audio_file(Path::new("test.txt")));
        assert!(!is_audio_file(Path::new("test")));
    }

    #[test]
    fn scan_recursive_finds_nested_files() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("song1.mp3"), b"fake mp3").unwrap();
        fs::write(base.join("song2.flac"), b"fake flac").unwrap();
        fs::write(base.join("readme.txt"), b"not audio").unwrap();

        let subdir = base.join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("song3.ogg"), b"fake ogg").unwrap();

        let outcome = FolderScanner::new().scan(base).unwrap();
        assert_eq!(outcome.files.len(), 3);
        assert!(outcome.files.iter().any(|p| p.ends_with("song3.ogg")));
        assert!(!outcome.files.iter().any(|p| p.ends_with("readme.txt")));
    }

    #[test]
    fn scan_non_recursive_stays_at_top_level() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("song1.mp3"), b"fake mp3").unwrap();
        let subdir = base.join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("song2.mp3"), b"fake mp3").unwrap();

        let outcome = FolderScanner::new().recursive(false).scan(base).unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0].ends_with("song1.mp3"));
    }

    #[test]
    fn scan_sorts_case_insensitively() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();

        fs::write(base.join("Beta.mp3"), b"x").unwrap();
        fs::write(base.join("alpha.mp3"), b"x").unwrap();
        fs::write(base.join("Charlie.mp3"), b"x").unwrap();

        let outcome = FolderScanner::new().scan(base).unwrap();
        let names: Vec<_> = outcome
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha.mp3", "Beta.mp3", "Charlie.mp3"]);
    }

    #[test]
    fn scan_missing_folder_is_an_error() {
        let result = FolderScanner::new().scan(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(IngestError::SourceNotFound(_))));
    }

    #[test]
    fn scan_file_instead_of_folder_is_an_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("song.mp3");
        fs::write(&file, b"x").unwrap();
        let result = FolderScanner::new().scan(&file);
        assert!(matches!(result, Err(IngestError::InvalidSource(_))));
    }
}
