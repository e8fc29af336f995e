use crate::config::Config;
use crate::engine::ExtractionEngine;
use crate::history::DownloadLog;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup
    pub config: Arc<Config>,

    /// Engine every download and probe goes through
    pub engine: Arc<dyn ExtractionEngine>,

    /// Append-only download history
    pub log: Arc<DownloadLog>,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<dyn ExtractionEngine>) -> Self {
        let log = Arc::new(DownloadLog::new(config.downloads.log_file.clone()));
        Self {
            config: Arc::new(config),
            engine,
            log,
        }
    }
}
