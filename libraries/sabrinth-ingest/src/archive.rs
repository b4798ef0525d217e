//! ZIP archive extraction
//!
//! Archives are extracted into a fresh staging directory under the imports
//! area and then scanned like any folder. Entry names are validated against
//! path traversal before anything touches the filesystem.

use crate::{IngestError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::ZipArchive;

/// How often extraction progress is reported, in entries
const PROGRESS_EVERY: usize = 25;

/// Result of extracting an archive
#[derive(Debug)]
pub struct ExtractOutcome {
    /// Staging directory the archive was extracted into
    pub staging_dir: PathBuf,
    /// Entries that were rejected or failed to extract
    pub entry_errors: Vec<(PathBuf, String)>,
}

/// Extract a ZIP archive into a timestamped staging directory
///
/// `on_progress` is called with `(entries_done, entries_total)` every few
/// entries. Unsafe entry names (absolute paths, `..` components) are skipped
/// and reported; a single bad entry never aborts the extraction.
pub fn extract_zip(
    archive_path: &Path,
    imports_dir: &Path,
    on_progress: &mut dyn FnMut(usize, usize),
) -> Result<ExtractOutcome> {
    if !archive_path.is_file() {
        return Err(IngestError::SourceNotFound(
            archive_path.display().to_string(),
        ));
    }

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let staging_dir = staging_dir_for(archive_path, imports_dir);
    std::fs::create_dir_all(&staging_dir)?;
    info!(
        archive = %archive_path.display(),
        staging = %staging_dir.display(),
        entries = archive.len(),
        "extracting archive"
    );

    match extract_entries(&mut archive, &staging_dir, on_progress) {
        Ok(entry_errors) => Ok(ExtractOutcome {
            staging_dir,
            entry_errors,
        }),
        Err(e) => {
            // An unreadable archive leaves nothing worth keeping
            let _ = std::fs::remove_dir_all(&staging_dir);
            Err(e)
        }
    }
}

fn extract_entries(
    archive: &mut ZipArchive<File>,
    staging_dir: &Path,
    on_progress: &mut dyn FnMut(usize, usize),
) -> Result<Vec<(PathBuf, String)>> {
    let total = archive.len();
    let mut entry_errors = Vec::new();
    for index in 0..total {
        let mut entry = archive.by_index(index)?;
        let raw_name = entry.name().to_string();

        // Reject path traversal before touching the filesystem
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!(entry = %raw_name, "skipping unsafe archive entry");
            entry_errors.push((PathBuf::from(&raw_name), "unsafe entry name".to_string()));
            continue;
        };

        let dest = staging_dir.join(&relative);
        let result = if entry.is_dir() {
            std::fs::create_dir_all(&dest).map_err(IngestError::Io)
        } else {
            extract_file(&mut entry, &dest)
        };
        if let Err(e) = result {
            warn!(entry = %raw_name, error = %e, "failed to extract entry");
            entry_errors.push((PathBuf::from(&raw_name), e.to_string()));
        }

        let done = index + 1;
        if done % PROGRESS_EVERY == 0 || done == total {
            on_progress(done, total);
        }
    }
    Ok(entry_errors)
}

fn extract_file(entry: &mut zip::read::ZipFile<'_>, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = File::create(dest)?;
    std::io::copy(entry, &mut out)?;
    Ok(())
}

/// Staging directory name: archive stem plus a timestamp, so repeated
/// imports of the same archive never collide
fn staging_dir_for(archive_path: &Path, imports_dir: &Path) -> PathBuf {
    let stem = archive_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S%3f");
    imports_dir.join(format!("{stem}-{stamp}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn build_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, data) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_into_staging_dir() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("album.zip");
        build_zip(
            &archive,
            &[
                ("one.mp3", b"audio one" as &[u8]),
                ("disc2/two.mp3", b"audio two"),
            ],
        );

        let imports = temp.path().join("imports");
        std::fs::create_dir_all(&imports).unwrap();
        let mut calls = 0;
        let outcome = extract_zip(&archive, &imports, &mut |_, _| calls += 1).unwrap();

        assert!(outcome.entry_errors.is_empty());
        assert!(outcome.staging_dir.starts_with(&imports));
        assert!(outcome
            .staging_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("album-"));
        assert_eq!(
            std::fs::read(outcome.staging_dir.join("one.mp3")).unwrap(),
            b"audio one"
        );
        assert_eq!(
            std::fs::read(outcome.staging_dir.join("disc2/two.mp3")).unwrap(),
            b"audio two"
        );
        assert!(calls >= 1);
    }

    #[test]
    fn traversal_entries_are_rejected() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        build_zip(
            &archive,
            &[
                ("ok.mp3", b"fine" as &[u8]),
                ("../escape.mp3", b"should not land outside"),
            ],
        );

        let imports = temp.path().join("imports");
        std::fs::create_dir_all(&imports).unwrap();
        let outcome = extract_zip(&archive, &imports, &mut |_, _| {}).unwrap();

        assert_eq!(outcome.entry_errors.len(), 1);
        assert!(outcome.staging_dir.join("ok.mp3").is_file());
        assert!(!imports.join("escape.mp3").exists());
        assert!(!temp.path().join("escape.mp3").exists());
    }

    #[test]
    fn missing_archive_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = extract_zip(
            &temp.path().join("nope.zip"),
            temp.path(),
            &mut |_, _| {},
        );
        assert!(matches!(result, Err(IngestError::SourceNotFound(_))));
    }
}
