//! File persistence: input video list, output comment dataset, checkpoint
//!
//! Both CSV files are UTF-8. The output starts with a byte-order mark so
//! spreadsheet tools pick the right encoding for non-ASCII comments.

pub mod checkpoint;

use chrono::{DateTime, TimeZone};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{CommentRecord, VideoMetadata};

pub use checkpoint::CheckpointManager;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ============================================================================
// Input
// ============================================================================

/// Read the input video list
///
/// Accepts the Korean export headers or their English aliases. Rows without a
/// URL are skipped with a warning; a missing file or malformed row is fatal.
pub fn load_videos(path: &Path) -> Result<Vec<VideoMetadata>> {
    if !path.is_file() {
        return Err(Error::input(format!("CSV file not found: {}", path.display())));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| Error::input(format!("Failed to read {}: {e}", path.display())))?;

    parse_videos(&raw)
}

/// Parse video rows from CSV text
pub fn parse_videos(raw: &str) -> Result<Vec<VideoMetadata>> {
    let content = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut videos = Vec::new();
    for (line, row) in reader.deserialize::<VideoMetadata>().enumerate() {
        let video = row?;
        if video.url.trim().is_empty() {
            tracing::warn!(row = line + 1, "Skipping video without URL");
            continue;
        }
        videos.push(video);
    }

    tracing::info!(count = videos.len(), "Loaded videos from CSV");
    Ok(videos)
}

// ============================================================================
// Output
// ============================================================================

/// Timestamped output path inside `dir`
pub fn output_path<Tz: TimeZone>(dir: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    dir.join(format!("youtube_comments_{}.csv", at.format("%Y%m%d_%H%M%S")))
}

/// Streaming writer for the comment dataset
pub struct CommentCsvWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: PathBuf,
    rows: usize,
}

impl CommentCsvWriter {
    /// Create the file (and its directory) and write the header row
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path).map_err(|e| {
            Error::with_source(format!("Failed to create output file: {}", path.display()), e)
        })?;
        let mut buffered = BufWriter::new(file);
        buffered.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(buffered);
        writer.write_record(CommentRecord::COLUMNS)?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    pub fn write(&mut self, record: &CommentRecord) -> Result<()> {
        self.writer.write_record(record.to_row())?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of data rows written
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        tracing::info!(path = %self.path.display(), rows = self.rows, "Comments saved");
        Ok(self.rows)
    }
}

/// Write every record to a fresh file at `path`
pub fn write_comments(path: &Path, records: &[CommentRecord]) -> Result<usize> {
    let mut writer = CommentCsvWriter::create(path)?;
    for record in records {
        writer.write(record)?;
    }
    writer.finish()
}
