use super::info::MediaInfo;
use super::options::{ExtractionOptions, ExtractionRequest, MediaKind};
use super::{EngineError, ExtractionEngine};
use crate::config::EngineConfig;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Extraction engine backed by the yt-dlp command line tool
pub struct YtDlpEngine {
    binary: String,
    ffmpeg_path: Option<PathBuf>,
    cookies_file: Option<PathBuf>,
    socket_timeout_secs: u64,
}

impl YtDlpEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let ffmpeg_path = config.resolve_ffmpeg();
        match &ffmpeg_path {
            Some(path) => info!("Using ffmpeg at {}", path.display()),
            None => info!("ffmpeg not found, letting {} locate it", config.binary),
        }

        Self {
            binary: config.binary.clone(),
            ffmpeg_path,
            cookies_file: config.cookies_file.clone(),
            socket_timeout_secs: config.socket_timeout_secs,
        }
    }

    /// Arguments shared by downloads and probes
    fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--socket-timeout".to_string(),
            self.socket_timeout_secs.to_string(),
        ];

        // Cookie file may appear or disappear while the service runs
        if let Some(cookies) = self.cookies_file.as_ref().filter(|p| p.is_file()) {
            args.push("--cookies".to_string());
            args.push(cookies.display().to_string());
        }

        args
    }

    pub fn download_args(&self, url: &str, options: &ExtractionOptions) -> Vec<String> {
        let mut args = self.common_args();

        args.extend([
            "--no-progress".to_string(),
            "-o".to_string(),
            options.output_template.clone(),
            "-f".to_string(),
            options.format_selector.clone(),
        ]);

        if let Some(ffmpeg) = &self.ffmpeg_path {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.display().to_string());
        }

        if let Some(container) = &options.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }

        if let Some(audio) = &options.extract_audio {
            args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                audio.codec.clone(),
                "--audio-quality".to_string(),
                format!("{}K", audio.quality),
            ]);
        }

        if let Some(sections) = &options.download_sections {
            args.push("--download-sections".to_string());
            args.push(sections.clone());
        }

        args.push(if options.playlist {
            "--yes-playlist".to_string()
        } else {
            "--no-playlist".to_string()
        });

        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    pub fn probe_args(&self, url: &str, kind: MediaKind) -> Vec<String> {
        let selector = match kind {
            MediaKind::Audio => "bestaudio/best",
            MediaKind::Video => "bestvideo+bestaudio/best",
        };

        let mut args = self.common_args();
        args.extend([
            "-J".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "-f".to_string(),
            selector.to_string(),
            "--".to_string(),
            url.to_string(),
        ]);
        args
    }

    /// Run yt-dlp to completion, returning stdout on success
    async fn run(&self, args: &[String]) -> Result<Vec<u8>, EngineError> {
        debug!("Running {} {:?}", self.binary, args);

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} exited with {}", self.binary, output.status));
            return Err(EngineError::Failed(message));
        }

        Ok(output.stdout)
    }
}

#[async_trait::async_trait]
impl ExtractionEngine for YtDlpEngine {
    async fn download(&self, request: &ExtractionRequest) -> Result<(), EngineError> {
        info!(
            "Extracting {} into {}",
            request.url,
            request.output_dir.display()
        );
        let args = self.download_args(&request.url, &request.options);
        self.run(&args).await?;
        Ok(())
    }

    async fn probe(&self, url: &str, kind: MediaKind) -> Result<MediaInfo, EngineError> {
        info!("Probing {}", url);
        let stdout = self.run(&self.probe_args(url, kind)).await?;
        Ok(serde_json::from_slice(&stdout)?)
    }

    fn name(&self) -> &str {
        "yt-dlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{OutputFormat, SourceProfile, TrimRange};
    use std::path::Path;

    fn engine() -> YtDlpEngine {
        YtDlpEngine {
            binary: "yt-dlp".to_string(),
            ffmpeg_path: Some(PathBuf::from("/usr/bin/ffmpeg")),
            cookies_file: None,
            socket_timeout_secs: 3600,
        }
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_trimmed_video_args() {
        let trim = TrimRange::from_markers(Some("00:30"), Some("01:30"));
        let options = ExtractionOptions::new(
            SourceProfile::General,
            &OutputFormat::parse("mp4").unwrap(),
            Path::new("downloads/s1"),
            "s1",
            trim.as_ref(),
            "192",
        );
        let args = engine().download_args("https://example.com/watch?v=1", &options);

        assert!(has_pair(&args, "-f", "bestvideo+bestaudio/best"));
        assert!(has_pair(&args, "--merge-output-format", "mp4"));
        assert!(has_pair(&args, "--download-sections", "*00:30-01:30"));
        assert!(has_pair(&args, "--ffmpeg-location", "/usr/bin/ffmpeg"));
        assert!(has_pair(&args, "--socket-timeout", "3600"));
        assert!(args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"-x".to_string()));
        assert!(!args.contains(&"--cookies".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/watch?v=1");
    }

    #[test]
    fn test_audio_args() {
        let options = ExtractionOptions::new(
            SourceProfile::Social,
            &OutputFormat::parse("mp3").unwrap(),
            Path::new("downloads/s2"),
            "s2",
            None,
            "192",
        );
        let args = engine().download_args("https://example.com/p/1", &options);

        assert!(args.contains(&"-x".to_string()));
        assert!(has_pair(&args, "--audio-format", "mp3"));
        assert!(has_pair(&args, "--audio-quality", "192K"));
        assert!(args.contains(&"--yes-playlist".to_string()));
        assert!(!args.contains(&"--merge-output-format".to_string()));
        assert!(!args.contains(&"--download-sections".to_string()));
    }

    #[test]
    fn test_probe_args_skip_download() {
        let args = engine().probe_args("https://example.com/v", MediaKind::Audio);
        assert!(args.contains(&"-J".to_string()));
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(has_pair(&args, "-f", "bestaudio/best"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let engine = YtDlpEngine {
            binary: "/nonexistent/yt-dlp".to_string(),
            ..engine()
        };
        let err = engine
            .probe("https://example.com/v", MediaKind::Video)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Launch { .. }));
    }
}
