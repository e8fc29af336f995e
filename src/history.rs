//! Append-only download history
//!
//! One line per produced file: `<timestamp> | <url> | <format> | <filename>`.
//! The log is never read back by the service.

use chrono::{Local, NaiveDateTime};
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub struct DownloadLog {
    path: PathBuf,
}

impl DownloadLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line per file in a single write
    pub async fn append(&self, url: &str, format: &str, files: &[String]) -> io::Result<()> {
        let now = Local::now().naive_local();
        let lines: String = files
            .iter()
            .map(|file| format_line(&now, url, format, file))
            .collect();

        let mut log = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        log.write_all(lines.as_bytes()).await?;
        log.flush().await
    }
}

/// `2025-01-31T14:03:07.123456 | <url> | mp4 | <file>\n`
pub fn format_line(timestamp: &NaiveDateTime, url: &str, format: &str, filename: &str) -> String {
    format!(
        "{} | {} | {} | {}\n",
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6f"),
        url,
        format,
        filename
    )
}
