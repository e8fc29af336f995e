pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod http;
pub mod session;

pub use config::Config;
pub use engine::{
    EngineError, ExtractionEngine, ExtractionOptions, ExtractionRequest, MediaInfo, MediaKind,
    OutputFormat, SourceProfile, TrimRange, YtDlpEngine,
};
pub use error::DownloadError;
pub use history::DownloadLog;
pub use http::{create_router, AppState};
pub use session::{CleanupGuard, DownloadSession};
