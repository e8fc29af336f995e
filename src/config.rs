use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const ENV_PREFIX: &str = "CLIPFETCH";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub downloads: DownloadsConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadsConfig {
    /// Parent of every per-request session directory
    pub base_dir: PathBuf,
    /// Append-only download history
    pub log_file: PathBuf,
    /// How long multi-file results stay reachable under /static
    pub static_retention_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// yt-dlp executable (name on PATH or absolute path)
    pub binary: String,
    /// ffmpeg location handed to the engine; looked up on PATH when unset
    pub ffmpeg_path: Option<PathBuf>,
    /// Netscape cookie jar for authenticated retrieval
    pub cookies_file: Option<PathBuf>,
    pub socket_timeout_secs: u64,
    /// Audio bitrate in kbps for mp3 extraction
    pub audio_quality: String,
}

impl Config {
    /// Load configuration from defaults, an optional file, and `CLIPFETCH__*` env vars.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "clipfetch")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 8000_i64)?
            .set_default("downloads.base_dir", "downloads")?
            .set_default("downloads.log_file", "download_logs.txt")?
            .set_default("downloads.static_retention_secs", 600_i64)?
            .set_default("engine.binary", "yt-dlp")?
            .set_default("engine.socket_timeout_secs", 3600_i64)?
            .set_default("engine.audio_quality", "192")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Configuration rooted at `base_dir`, with every other field at its default.
    /// The log file sits next to `base_dir` so `/static` never exposes it.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            service: ServiceConfig {
                name: "clipfetch".to_string(),
                http: HttpConfig {
                    bind: "127.0.0.1".to_string(),
                    port: 8000,
                },
            },
            downloads: DownloadsConfig {
                log_file: base_dir.with_file_name("download_logs.txt"),
                base_dir,
                static_retention_secs: 600,
            },
            engine: EngineConfig {
                binary: "yt-dlp".to_string(),
                ffmpeg_path: None,
                cookies_file: None,
                socket_timeout_secs: 3600,
                audio_quality: "192".to_string(),
            },
        }
    }
}

impl DownloadsConfig {
    pub fn static_retention(&self) -> Duration {
        Duration::from_secs(self.static_retention_secs)
    }
}

impl EngineConfig {
    /// Configured ffmpeg path, falling back to a PATH lookup.
    pub fn resolve_ffmpeg(&self) -> Option<PathBuf> {
        self.ffmpeg_path
            .clone()
            .or_else(|| which::which("ffmpeg").ok())
    }

    /// Cookie file, only when it actually exists on disk.
    pub fn existing_cookies(&self) -> Option<PathBuf> {
        self.cookies_file.clone().filter(|p| p.is_file())
    }
}
