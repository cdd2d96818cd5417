//! Crash-safe file replacement
//!
//! Content is written to a hidden temporary sibling, synced, and then renamed
//! over the target. A reader sees either the old file or the new one.

use crate::{ConfigError, ConfigResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A fully written temporary file waiting to replace `target`
pub(crate) struct StagedWrite {
    target: PathBuf,
    temp: NamedTempFile,
}

impl StagedWrite {
    /// Renames the staged file over the target
    pub(crate) fn commit(self) -> ConfigResult<()> {
        self.temp
            .persist(&self.target)
            .map_err(|e| ConfigError::WriteError {
                path: self.target.clone(),
                source: e.error,
            })?;
        Ok(())
    }
}

pub(crate) fn ensure_parent_dir(path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationError {
                path: parent.to_path_buf(),
                source: e,
            })?;
            log::info!("Created directory: {}", parent.display());
        }
    }
    Ok(())
}

/// Writes `content` into a temporary sibling of `target` without touching `target`
pub(crate) fn stage(target: &Path, content: &str) -> ConfigResult<StagedWrite> {
    ensure_parent_dir(target)?;

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = target
        .file_name()
        .ok_or_else(|| ConfigError::PathResolutionError {
            reason: format!("{} has no file name", target.display()),
        })?
        .to_string_lossy()
        .into_owned();

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| ConfigError::WriteError {
            path: target.to_path_buf(),
            source: e,
        })?;

    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    temp.as_file().sync_all()?;

    Ok(StagedWrite {
        target: target.to_path_buf(),
        temp,
    })
}

pub(crate) fn write_atomic(target: &Path, content: &str) -> ConfigResult<()> {
    stage(target, content)?.commit()
}

/// Copies `path` to `<path>.backup`, returning the backup location
pub(crate) fn backup_file(path: &Path) -> ConfigResult<PathBuf> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".backup");
    let backup = PathBuf::from(backup);

    fs::copy(path, &backup).map_err(|e| ConfigError::BackupError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parent_and_file() {
        let dir = TempDir::new().expect("Should create temp dir");
        let target = dir.path().join("nested").join("config.json");

        write_atomic(&target, "{}").expect("Should write");

        assert_eq!(fs::read_to_string(&target).expect("Should read"), "{}");
    }

    #[test]
    fn test_uncommitted_stage_leaves_target_intact() {
        let dir = TempDir::new().expect("Should create temp dir");
        let target = dir.path().join("config.json");
        fs::write(&target, "original").expect("Should seed file");

        let staged = stage(&target, "replacement").expect("Should stage");
        assert_eq!(fs::read_to_string(&target).expect("Should read"), "original");
        drop(staged);

        assert_eq!(fs::read_to_string(&target).expect("Should read"), "original");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("Should list dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_backup_file_appends_suffix() {
        let dir = TempDir::new().expect("Should create temp dir");
        let target = dir.path().join("config.json");
        fs::write(&target, "broken{").expect("Should seed file");

        let backup = backup_file(&target).expect("Should back up");

        assert_eq!(backup, dir.path().join("config.json.backup"));
        assert_eq!(fs::read_to_string(backup).expect("Should read"), "broken{");
    }
}
