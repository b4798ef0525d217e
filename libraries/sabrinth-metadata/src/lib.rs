//! Sabrinth Metadata
//!
//! Metadata extraction and the in-memory library store.
//!
//! This crate provides:
//! - Tag reading from audio files (MP3, FLAC, OGG, WAV, M4A, AAC)
//! - Sidecar document parsing (`.info.json` files written by downloaders)
//! - The `MetadataStore`: the single source of truth for track records,
//!   supporting partial, merge-only metadata updates
//!
//! # Example
//!
//! ```rust,no_run
//! use sabrinth_metadata::LoftyTagReader;
//! use sabrinth_core::TagReader;
//! use std::path::Path;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = LoftyTagReader::new();
//! let metadata = reader.read_tags(Path::new("/music/song.mp3"))?;
//! # Ok(())
//! # }
//! ```

mod error;
mod reader;
mod sidecar;
mod store;

pub use error::{MetadataError, Result};
pub use reader::LoftyTagReader;
pub use sidecar::InfoJsonSidecarReader;
pub use store::MetadataStore;
