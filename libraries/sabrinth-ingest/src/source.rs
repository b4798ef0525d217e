//! Track source adapters
//!
//! Each variant of [`TrackSource`] knows how to enumerate raw candidates for
//! the pipeline: plain files plus their origin and (for downloads) an
//! explicit sidecar document. Per-entry problems become `Err` items in the
//! enumeration so one unreadable file never sinks the batch.

use crate::archive::extract_zip;
use crate::scanner::FolderScanner;
use crate::{IngestError, Result};
use sabrinth_core::{DownloadedFile, SourceOrigin, TrackId};
use sabrinth_metadata::MetadataStore;
use std::path::PathBuf;

/// One file a source produced, before any metadata has been read
#[derive(Debug, Clone)]
pub struct RawCandidate {
    /// Audio file path
    pub path: PathBuf,
    /// Where the file came from
    pub origin: SourceOrigin,
    /// Explicit sidecar document, when the source knows about one
    pub sidecar: Option<PathBuf>,
}

/// Everything a source produced
#[derive(Debug)]
pub struct Enumeration {
    /// Candidates in source order; `Err` items are per-entry failures
    pub candidates: Vec<Result<RawCandidate>>,
    /// Staging directory created for archive extraction, if any
    pub staging_dir: Option<PathBuf>,
}

/// A place tracks can be ingested from
#[derive(Debug, Clone)]
pub enum TrackSource {
    /// A local folder of audio files
    Folder {
        /// Folder to scan
        path: PathBuf,
        /// Descend into subdirectories
        recursive: bool,
    },
    /// A ZIP archive, extracted into a staging directory first
    Zip {
        /// Archive file
        archive: PathBuf,
        /// Parent directory for the extraction staging area
        imports_dir: PathBuf,
    },
    /// Files a download provider just produced, in manifest order
    Download {
        /// Downloaded files with their optional sidecars
        files: Vec<DownloadedFile>,
    },
    /// A saved playlist, resolved against the metadata store
    SavedPlaylist {
        /// Stored track ids, in playlist order
        entries: Vec<TrackId>,
    },
}

impl TrackSource {
    /// Enumerate the candidates this source produces
    ///
    /// Runs on a blocking thread; archive extraction reports progress
    /// through `on_extract` as `(entries_done, entries_total)`.
    pub fn enumerate(
        &self,
        store: &MetadataStore,
        on_extract: &mut dyn FnMut(usize, usize),
    ) -> Result<Enumeration> {
        match self {
            Self::Folder { path, recursive } => {
                let outcome = FolderScanner::new().recursive(*recursive).scan(path)?;
                Ok(Enumeration {
                    candidates: candidates_from(outcome, SourceOrigin::Folder),
                    staging_dir: None,
                })
            }
            Self::Zip {
                archive,
                imports_dir,
            } => {
                if archive
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase)
                    .as_deref()
                    != Some("zip")
                {
                    return Err(IngestError::InvalidSource(format!(
                        "{} is not a ZIP archive",
                        archive.display()
                    )));
                }
                let extracted = extract_zip(archive, imports_dir, on_extract)?;
                let outcome = match FolderScanner::new().scan(&extracted.staging_dir) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        let _ = std::fs::remove_dir_all(&extracted.staging_dir);
                        return Err(e);
                    }
                };
                let mut candidates = candidates_from(outcome, SourceOrigin::Zip);
                for (path, reason) in extracted.entry_errors {
                    candidates.push(Err(IngestError::entry(path, reason)));
                }
                Ok(Enumeration {
                    candidates,
                    staging_dir: Some(extracted.staging_dir),
                })
            }
            Self::Download { files } => {
                let candidates = files
                    .iter()
                    .map(|file| {
                        if file.path.is_file() {
                            Ok(RawCandidate {
                                path: file.path.clone(),
                                origin: SourceOrigin::Download,
                                sidecar: file.sidecar.clone(),
                            })
                        } else {
                            Err(IngestError::entry(&file.path, "downloaded file missing"))
                        }
                    })
                    .collect();
                Ok(Enumeration {
                    candidates,
                    staging_dir: None,
                })
            }
            Self::SavedPlaylist { entries } => {
                let candidates = entries
                    .iter()
                    .map(|id| match store.resolve(id) {
                        Some(path) if path.is_file() => Ok(RawCandidate {
                            path,
                            origin: SourceOrigin::SavedPlaylist,
                            sidecar: None,
                        }),
                        Some(path) => {
                            Err(IngestError::entry(path, "file no longer exists"))
                        }
                        None => Err(IngestError::entry(
                            PathBuf::from(id.as_str()),
                            "track not in library",
                        )),
                    })
                    .collect();
                Ok(Enumeration {
                    candidates,
                    staging_dir: None,
                })
            }
        }
    }
}

fn candidates_from(
    outcome: crate::scanner::ScanOutcome,
    origin: SourceOrigin,
) -> Vec<Result<RawCandidate>> {
    let mut candidates: Vec<Result<RawCandidate>> = outcome
        .files
        .into_iter()
        .map(|path| {
            Ok(RawCandidate {
                path,
                origin,
                sidecar: None,
            })
        })
        .collect();
    for (path, reason) in outcome.entry_errors {
        candidates.push(Err(IngestError::entry(path, reason)));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use sabrinth_core::Track;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn folder_source_yields_sorted_candidates() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.mp3"), b"x").unwrap();
        fs::write(temp.path().join("a.mp3"), b"x").unwrap();

        let store = MetadataStore::new();
        let source = TrackSource::Folder {
            path: temp.path().to_path_buf(),
            recursive: true,
        };
        let enumeration = source.enumerate(&store, &mut |_, _| {}).unwrap();
        let paths: Vec<_> = enumeration
            .candidates
            .iter()
            .map(|c| c.as_ref().unwrap().path.clone())
            .collect();
        assert!(paths[0].ends_with("a.mp3"));
        assert!(paths[1].ends_with("b.mp3"));
        assert!(enumeration.staging_dir.is_none());
    }

    #[test]
    fn zip_source_requires_zip_extension() {
        let temp = TempDir::new().unwrap();
        let not_zip = temp.path().join("album.rar");
        fs::write(&not_zip, b"x").unwrap();

        let store = MetadataStore::new();
        let source = TrackSource::Zip {
            archive: not_zip,
            imports_dir: temp.path().to_path_buf(),
        };
        assert!(matches!(
            source.enumerate(&store, &mut |_, _| {}),
            Err(IngestError::InvalidSource(_))
        ));
    }

    #[test]
    fn download_source_reports_missing_files_per_entry() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("ok.mp3");
        fs::write(&present, b"x").unwrap();

        let store = MetadataStore::new();
        let source = TrackSource::Download {
            files: vec![
                DownloadedFile {
                    path: present.clone(),
                    sidecar: None,
                },
                DownloadedFile {
                    path: temp.path().join("gone.mp3"),
                    sidecar: None,
                },
            ],
        };
        let enumeration = source.enumerate(&store, &mut |_, _| {}).unwrap();
        assert_eq!(enumeration.candidates.len(), 2);
        assert!(enumeration.candidates[0].is_ok());
        assert!(enumeration.candidates[1].is_err());
    }

    #[test]
    fn saved_playlist_resolves_through_store() {
        let temp = TempDir::new().unwrap();
        let on_disk = temp.path().join("song.mp3");
        fs::write(&on_disk, b"x").unwrap();

        let store = MetadataStore::new();
        let known = store.insert_pending(Track::pending(&on_disk, SourceOrigin::Folder));
        let unknown = TrackId::from_path(std::path::Path::new("/never/registered.mp3"));

        let source = TrackSource::SavedPlaylist {
            entries: vec![known.id.clone(), unknown],
        };
        let enumeration = source.enumerate(&store, &mut |_, _| {}).unwrap();
        assert_eq!(enumeration.candidates.len(), 2);
        let first = enumeration.candidates[0].as_ref().unwrap();
        assert_eq!(first.path, on_disk);
        assert_eq!(first.origin, SourceOrigin::SavedPlaylist);
        assert!(enumeration.candidates[1].is_err());
    }
}
