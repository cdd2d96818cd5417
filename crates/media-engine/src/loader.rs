// FILE: crates/media-engine/src/loader.rs
//! Reads an audiobook folder from disk
//!
//! Layout:
//!
//! ```text
//! Some Book/
//!   Part 001.mp3
//!   Part 002.mp3
//!   metadata/metadata.json   (optional)
//! ```
//!
//! `metadata.json` may carry `title`, a `spine` list of `{duration}` entries
//! aligned with the files, and `chapters` as `{title, spine, offset}`.

use crate::error::{EngineError, EngineResult};
use crate::probe;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use taletiles_core::Chapter;

pub const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "m4a", "m4b", "ogg", "flac", "wav"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetadataDocument {
    title: Option<String>,
    spine: Vec<SpineEntry>,
    chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpineEntry {
    duration: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChapterEntry {
    title: Option<String>,
    spine: usize,
    offset: f64,
}

/// Everything needed to start a playback session for one folder
#[derive(Debug, Clone, PartialEq)]
pub struct Audiobook {
    pub folder: PathBuf,
    pub title: String,
    pub files: Vec<PathBuf>,
    /// Per-file durations, empty when unknown
    pub spine_durations: Vec<f64>,
    /// Raw chapter markers; ordering is checked when the session is created
    pub chapters: Vec<Chapter>,
}

impl Audiobook {
    /// Scans `folder` for audio files and reads its metadata.
    pub fn open(folder: impl AsRef<Path>, probe_durations: bool) -> EngineResult<Self> {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            return Err(EngineError::NotADirectory(folder.to_path_buf()));
        }

        let files = audio_files(folder)?;
        if files.is_empty() {
            return Err(EngineError::EmptyFileList(folder.to_path_buf()));
        }
        log::info!("Found {} audio files in {}", files.len(), folder.display());

        let metadata_path = folder.join("metadata").join("metadata.json");
        let metadata = if metadata_path.exists() {
            match read_metadata(&metadata_path) {
                Ok(doc) => doc,
                Err(e) => {
                    log::error!("{}", e);
                    MetadataDocument::default()
                }
            }
        } else {
            log::warn!("No metadata.json in {}, chapter navigation will be limited", folder.display());
            MetadataDocument::default()
        };

        let title = metadata
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| folder_title(folder));

        let chapters: Vec<Chapter> = metadata
            .chapters
            .iter()
            .enumerate()
            .map(|(i, ch)| {
                Chapter::new(
                    i,
                    ch.title.clone().unwrap_or_else(|| format!("Chapter {}", i + 1)),
                    ch.spine,
                    ch.offset,
                )
            })
            .collect();

        let spine_durations = if !metadata.spine.is_empty() && metadata.spine.len() == files.len() {
            metadata.spine.iter().map(|s| s.duration).collect()
        } else {
            if !metadata.spine.is_empty() {
                log::warn!(
                    "Metadata lists {} spine entries for {} files, ignoring",
                    metadata.spine.len(),
                    files.len()
                );
            }
            if probe_durations {
                probe::probe_all(&files).unwrap_or_default()
            } else {
                Vec::new()
            }
        };

        Ok(Self {
            folder: folder.to_path_buf(),
            title,
            files,
            spine_durations,
            chapters,
        })
    }
}

/// Non-hidden audio files directly inside `folder`, sorted by name
pub fn audio_files(folder: &Path) -> EngineResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_audio_file(path))
        .collect();
    files.sort();
    Ok(files)
}

pub fn is_audio_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_none_or(|n| n.starts_with('.'));
    let audio = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    !hidden && audio
}

/// Display title for a folder without opening it fully: metadata title or folder name
pub fn read_title(folder: &Path) -> String {
    read_metadata(&folder.join("metadata").join("metadata.json"))
        .ok()
        .and_then(|m| m.title)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| folder_title(folder))
}

fn read_metadata(path: &Path) -> EngineResult<MetadataDocument> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| EngineError::Metadata {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn folder_title(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
