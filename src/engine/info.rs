use super::options::MediaKind;
use serde::Deserialize;

/// Metadata reported by a simulate-only probe (`yt-dlp -J`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub formats: Vec<FormatInfo>,
}

/// One downloadable format of the probed media
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatInfo {
    #[serde(default)]
    pub format_id: Option<String>,

    /// `"none"` for audio-only formats
    #[serde(default)]
    pub vcodec: Option<String>,

    #[serde(default)]
    pub acodec: Option<String>,

    /// Exact size in bytes, when the host reports it
    #[serde(default)]
    pub filesize: Option<f64>,

    /// Size estimated from bitrate and duration
    #[serde(default)]
    pub filesize_approx: Option<f64>,
}

impl FormatInfo {
    /// Exact size if known, else the estimate. Zero counts as unknown.
    pub fn size(&self) -> Option<u64> {
        [self.filesize, self.filesize_approx]
            .into_iter()
            .flatten()
            .find(|size| *size > 0.0)
            .map(|size| size.round() as u64)
    }

    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    /// Audio codec known and present; storyboards and images carry none
    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|codec| codec != "none")
    }

    pub fn is_audio_only(&self) -> bool {
        !self.has_video() && self.has_audio()
    }

    pub fn matches(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Audio => self.is_audio_only(),
            MediaKind::Video => self.has_video(),
        }
    }
}

impl MediaInfo {
    pub fn title_or_unknown(&self) -> String {
        self.title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Largest reported size among formats of `kind`, or 0 when none has one.
    pub fn largest_filesize(&self, kind: MediaKind) -> u64 {
        self.formats
            .iter()
            .filter(|f| f.matches(kind))
            .filter_map(FormatInfo::size)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_JSON: &str = r#"{
        "title": "Sample clip",
        "formats": [
            {"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "filesize": 3000000},
            {"format_id": "251", "vcodec": "none", "acodec": "opus", "filesize": null, "filesize_approx": 3500000},
            {"format_id": "137", "vcodec": "avc1.640028", "acodec": "none", "filesize": 52000000},
            {"format_id": "248", "vcodec": "vp9", "acodec": "none", "filesize_approx": 61000000.4},
            {"format_id": "sb0", "vcodec": "none", "acodec": "none"}
        ]
    }"#;

    #[test]
    fn test_largest_filesize_per_kind() {
        let info: MediaInfo = serde_json::from_str(PROBE_JSON).unwrap();
        assert_eq!(info.title_or_unknown(), "Sample clip");
        assert_eq!(info.largest_filesize(MediaKind::Video), 61_000_000);
        assert_eq!(info.largest_filesize(MediaKind::Audio), 3_500_000);
    }

    #[test]
    fn test_filesize_zero_without_sizes() {
        let info: MediaInfo = serde_json::from_str(
            r#"{"formats": [{"format_id": "hls-1", "vcodec": "avc1"}, {"format_id": "x", "filesize": 0}]}"#,
        )
        .unwrap();
        assert_eq!(info.largest_filesize(MediaKind::Video), 0);
        assert_eq!(info.largest_filesize(MediaKind::Audio), 0);
        assert_eq!(info.title_or_unknown(), "Unknown");
    }

    #[test]
    fn test_storyboards_are_not_audio_candidates() {
        let info: MediaInfo = serde_json::from_str(
            r#"{"formats": [
                {"format_id": "sb0", "vcodec": "none", "acodec": "none", "filesize_approx": 9000000},
                {"format_id": "img", "vcodec": "none", "filesize": 8000000},
                {"format_id": "140", "vcodec": "none", "acodec": "mp4a.40.2", "filesize": 3000000}
            ]}"#,
        )
        .unwrap();
        assert_eq!(info.largest_filesize(MediaKind::Audio), 3_000_000);
        assert_eq!(info.largest_filesize(MediaKind::Video), 0);
    }

    #[test]
    fn test_exact_size_preferred_over_estimate() {
        let format = FormatInfo {
            filesize: Some(10.0),
            filesize_approx: Some(99.0),
            ..Default::default()
        };
        assert_eq!(format.size(), Some(10));
    }
}
