//! Progress checkpoint for crash-safe runs
//!
//! The checkpoint is a snapshot, not a log: every save overwrites the previous
//! file. Writes go to a sibling temp file first and are renamed into place, so
//! a crash mid-write leaves the last good checkpoint intact.
//!
//! # Example
//!
//! ```no_run
//! use tubecomments::models::RunProgress;
//! use tubecomments::storage::checkpoint::CheckpointManager;
//! use std::path::Path;
//!
//! # fn example() -> tubecomments::error::Result<()> {
//! let manager = CheckpointManager::new(Path::new("progress.json"));
//!
//! let progress = RunProgress::new();
//! manager.save(&progress.snapshot())?;
//!
//! if let Some(restored) = manager.load()? {
//!     println!("{} videos processed", restored.processed_videos.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::ProgressSnapshot;

/// Owns the checkpoint file for one run
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    path: PathBuf,
}

impl CheckpointManager {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Overwrite the checkpoint with `snapshot`
    pub fn save(&self, snapshot: &ProgressSnapshot) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to temp file first, then rename (atomic)
        let temp_path = self.temp_path();

        let file = File::create(&temp_path).map_err(|e| {
            Error::with_source(
                format!("Failed to create checkpoint file: {}", temp_path.display()),
                e,
            )
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
        drop(writer);

        fs::rename(&temp_path, &self.path).map_err(|e| {
            Error::with_source(
                format!("Failed to rename checkpoint file: {}", self.path.display()),
                e,
            )
        })?;

        tracing::debug!(
            path = %self.path.display(),
            processed = snapshot.processed_videos.len(),
            failed = snapshot.failed_videos.len(),
            "Checkpoint saved"
        );
        Ok(self.path.clone())
    }

    /// Read the last checkpoint, if one exists
    pub fn load(&self) -> Result<Option<ProgressSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path).map_err(|e| {
            Error::with_source(
                format!("Failed to open checkpoint file: {}", self.path.display()),
                e,
            )
        })?;

        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %self.path.display(), "Checkpoint loaded");
        Ok(Some(snapshot))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
