use anyhow::{Context, Result};
use clap::Parser;
use clipfetch::session::sweep_stale_sessions;
use clipfetch::{create_router, AppState, Config, YtDlpEngine};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "clipfetch", about = "HTTP API for downloading media via yt-dlp")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/clipfetch")]
    config: String,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Downloads directory: {}", cfg.downloads.base_dir.display());
    info!("Download log: {}", cfg.downloads.log_file.display());

    tokio::fs::create_dir_all(&cfg.downloads.base_dir)
        .await
        .with_context(|| format!("Failed to create {}", cfg.downloads.base_dir.display()))?;

    let swept = sweep_stale_sessions(&cfg.downloads.base_dir)
        .await
        .with_context(|| format!("Failed to sweep {}", cfg.downloads.base_dir.display()))?;
    if swept > 0 {
        info!("Removed {} leftover session directories", swept);
    }

    let engine = Arc::new(YtDlpEngine::new(&cfg.engine));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let router = create_router(AppState::new(cfg, engine));

    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
