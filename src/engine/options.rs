use crate::error::DownloadError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of media the client asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Video with audio, merged into the requested container
    Video,
    /// Audio only, extracted to mp3
    Audio,
}

/// Requested output container (`mp4`, `webm`, `mp3`, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat(String);

impl OutputFormat {
    pub const AUDIO: &'static str = "mp3";

    pub fn parse(raw: &str) -> Result<Self, DownloadError> {
        let ext = raw.trim().to_ascii_lowercase();
        let valid = !ext.is_empty()
            && ext.len() <= 8
            && ext.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(DownloadError::InvalidFormat(raw.to_string()));
        }
        Ok(Self(ext))
    }

    pub fn kind(&self) -> MediaKind {
        if self.0 == Self::AUDIO {
            MediaKind::Audio
        } else {
            MediaKind::Video
        }
    }

    pub fn extension(&self) -> &str {
        &self.0
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self("mp4".to_string())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which flavour of source the request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceProfile {
    /// General video hosting: one file per request, trimming allowed
    General,
    /// Social photo/video posts: carousels may yield several files
    Social,
}

/// Start/end markers (`HH:MM:SS` or `MM:SS`) restricting the download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimRange {
    pub start: String,
    pub end: String,
}

impl TrimRange {
    /// Both markers must be present and non-empty, otherwise no trimming.
    pub fn from_markers(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        match (start.map(str::trim), end.map(str::trim)) {
            (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => Some(Self {
                start: start.to_string(),
                end: end.to_string(),
            }),
            _ => None,
        }
    }

    /// yt-dlp `--download-sections` spec
    pub fn download_section(&self) -> String {
        format!("*{}-{}", self.start, self.end)
    }
}

/// Audio extraction post-processing step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioExtraction {
    pub codec: String,
    /// Bitrate in kbps
    pub quality: String,
}

/// Per-request engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Output path template, relative names resolved by the engine
    pub output_template: String,
    pub format_selector: String,
    pub merge_output_format: Option<String>,
    pub extract_audio: Option<AudioExtraction>,
    pub download_sections: Option<String>,
    /// Follow playlists/carousels instead of only the single item
    pub playlist: bool,
}

impl ExtractionOptions {
    pub fn new(
        profile: SourceProfile,
        format: &OutputFormat,
        session_dir: &Path,
        session_id: &str,
        trim: Option<&TrimRange>,
        audio_quality: &str,
    ) -> Self {
        let kind = format.kind();

        let format_selector = match (profile, kind) {
            (_, MediaKind::Audio) => "bestaudio/best",
            (SourceProfile::General, MediaKind::Video) => "bestvideo+bestaudio/best",
            (SourceProfile::Social, MediaKind::Video) => "best",
        };

        let file_name = match profile {
            SourceProfile::General => format!("{}.%(ext)s", session_id),
            SourceProfile::Social => format!("{}_%(title).70s.%(ext)s", session_id),
        };

        let extract_audio = (kind == MediaKind::Audio).then(|| AudioExtraction {
            codec: OutputFormat::AUDIO.to_string(),
            quality: audio_quality.to_string(),
        });

        // Social posts are never trimmed
        let download_sections = match profile {
            SourceProfile::General => trim.map(TrimRange::download_section),
            SourceProfile::Social => None,
        };

        Self {
            output_template: session_dir.join(file_name).display().to_string(),
            format_selector: format_selector.to_string(),
            merge_output_format: (kind == MediaKind::Video).then(|| format.to_string()),
            extract_audio,
            download_sections,
            playlist: profile == SourceProfile::Social,
        }
    }
}

/// A single engine invocation
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub url: String,
    pub session_id: String,
    pub output_dir: PathBuf,
    pub options: ExtractionOptions,
}
