//! Media extraction engine
//!
//! Retrieval, format negotiation and transcoding are delegated to an external
//! extractor (yt-dlp). This module only describes what to ask it for:
//! - `ExtractionOptions` - per-request engine configuration
//! - `ExtractionEngine` - the seam handlers call through
//! - `YtDlpEngine` - the production engine backed by the yt-dlp binary
//! - `MediaInfo` - metadata returned by a simulate-only probe

mod info;
mod options;
mod ytdlp;

pub use info::{FormatInfo, MediaInfo};
pub use options::{
    AudioExtraction, ExtractionOptions, ExtractionRequest, MediaKind, OutputFormat,
    SourceProfile, TrimRange,
};
pub use ytdlp::YtDlpEngine;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch {binary}: {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Failed(String),

    #[error("invalid metadata from engine: {0}")]
    InvalidMetadata(#[from] serde_json::Error),
}

/// External media extraction engine
///
/// Implementations:
/// - `YtDlpEngine`: spawns the yt-dlp binary per call
/// - test doubles that drop files into the session directory
#[async_trait::async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Download `request.url` into `request.output_dir`
    async fn download(&self, request: &ExtractionRequest) -> Result<(), EngineError>;

    /// Fetch metadata without downloading anything
    async fn probe(&self, url: &str, kind: MediaKind) -> Result<MediaInfo, EngineError>;

    /// Engine name for logging
    fn name(&self) -> &str;
}
