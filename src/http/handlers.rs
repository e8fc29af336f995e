use super::body::file_response;
use super::routes::API_ROUTES;
use super::state::AppState;
use crate::engine::{
    ExtractionOptions, ExtractionRequest, MediaKind, OutputFormat, SourceProfile, TrimRange,
};
use crate::error::DownloadError;
use crate::session::{find_output, DownloadSession};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Source page URL
    pub url: String,

    /// Output container; `mp3` means audio only
    #[serde(default = "default_format")]
    pub format: String,

    /// Trim start, `HH:MM:SS` or `MM:SS`
    pub start: Option<String>,

    /// Trim end, `HH:MM:SS` or `MM:SS`
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub url: String,

    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "mp4".to_string()
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MultiFileResponse {
    pub message: String,
    /// `/static/<session>/<file>` URLs, one per downloaded file
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub title: String,
    pub filesize: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Media downloader API is running".to_string(),
    })
}

/// GET /routes-debug
pub async fn routes_debug() -> Json<Vec<&'static str>> {
    Json(API_ROUTES.to_vec())
}

/// GET /download
/// Download a single (optionally trimmed) file from a video host
pub async fn download(State(state): State<AppState>, Query(query): Query<DownloadQuery>) -> Response {
    match download_single(&state, query).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Download via {} failed: {}", state.engine.name(), e);
            e.into_response()
        }
    }
}

/// GET /download/instagram
/// Download a social post; carousels yield several files
pub async fn download_social(
    State(state): State<AppState>,
    Query(query): Query<MediaQuery>,
) -> Response {
    match download_post(&state, query).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Social download via {} failed: {}", state.engine.name(), e);
            e.into_response()
        }
    }
}

/// GET /info
/// Title and largest known file size, without downloading
pub async fn info(State(state): State<AppState>, Query(query): Query<MediaQuery>) -> Response {
    let result = async {
        let format = OutputFormat::parse(&query.format)?;
        let info = state
            .engine
            .probe(&query.url, format.kind())
            .await
            .map_err(|e| DownloadError::ProbeFailure(e.to_string()))?;

        Ok::<_, DownloadError>(InfoResponse {
            title: info.title_or_unknown(),
            filesize: info.largest_filesize(format.kind()),
        })
    }
    .await;

    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            warn!(
                "Info probe via {} failed for {}: {}",
                state.engine.name(),
                query.url,
                e
            );
            e.into_response()
        }
    }
}

// ============================================================================
// Download flows
// ============================================================================

async fn download_single(state: &AppState, query: DownloadQuery) -> Result<Response, DownloadError> {
    let format = OutputFormat::parse(&query.format)?;
    let trim = TrimRange::from_markers(query.start.as_deref(), query.end.as_deref());

    let session = DownloadSession::create(&state.config.downloads.base_dir).await?;
    info!(
        "Session {}: downloading {} as {} (trim: {:?})",
        session.id(),
        query.url,
        format,
        trim
    );

    let options = ExtractionOptions::new(
        SourceProfile::General,
        &format,
        session.dir(),
        session.id(),
        trim.as_ref(),
        &state.config.engine.audio_quality,
    );

    let output = extract(state, &session, &query.url, options)
        .await
        .and_then(|files| {
            find_output(&files, session.id(), format.extension())
                .cloned()
                .ok_or_else(|| DownloadError::NotFound(format.to_string()))
        });

    let path = match output {
        Ok(path) => path,
        Err(e) => {
            session.discard().await;
            return Err(e);
        }
    };

    info!("Session {}: sending {}", session.id(), path.display());
    let response = file_response(&path, "application/octet-stream", session.into_guard()).await?;
    record(state, &query.url, &format, std::slice::from_ref(&path)).await;

    Ok(response)
}

async fn download_post(state: &AppState, query: MediaQuery) -> Result<Response, DownloadError> {
    let format = OutputFormat::parse(&query.format)?;

    let session = DownloadSession::create(&state.config.downloads.base_dir).await?;
    info!(
        "Session {}: downloading post {} as {}",
        session.id(),
        query.url,
        format
    );

    let options = ExtractionOptions::new(
        SourceProfile::Social,
        &format,
        session.dir(),
        session.id(),
        None,
        &state.config.engine.audio_quality,
    );

    let files = match extract(state, &session, &query.url, options).await {
        Ok(files) if !files.is_empty() => files,
        Ok(_) => {
            session.discard().await;
            return Err(DownloadError::EmptyResult);
        }
        Err(e) => {
            session.discard().await;
            return Err(e);
        }
    };

    if let [path] = files.as_slice() {
        let media_type = match format.kind() {
            MediaKind::Video => "video/mp4",
            MediaKind::Audio => "audio/mpeg",
        };
        info!("Session {}: sending {}", session.id(), path.display());
        let response = file_response(path, media_type, session.into_guard()).await?;
        record(state, &query.url, &format, &files).await;
        return Ok(response);
    }

    let urls: Vec<String> = files
        .iter()
        .map(|path| static_url(session.id(), &file_name(path)))
        .collect();

    info!(
        "Session {}: {} files available under /static",
        session.id(),
        urls.len()
    );
    session.retain_for(state.config.downloads.static_retention());
    record(state, &query.url, &format, &files).await;

    Ok(Json(MultiFileResponse {
        message: "Multiple files downloaded successfully".to_string(),
        files: urls,
    })
    .into_response())
}

/// Run the engine for `session` and list what it produced
async fn extract(
    state: &AppState,
    session: &DownloadSession,
    url: &str,
    options: ExtractionOptions,
) -> Result<Vec<PathBuf>, DownloadError> {
    let request = ExtractionRequest {
        url: url.to_string(),
        session_id: session.id().to_string(),
        output_dir: session.dir().to_path_buf(),
        options,
    };

    state
        .engine
        .download(&request)
        .await
        .map_err(|e| DownloadError::EngineFailure(e.to_string()))?;

    Ok(session.files().await?)
}

/// Append to the download log; failures never reach the client
async fn record(state: &AppState, url: &str, format: &OutputFormat, files: &[PathBuf]) {
    let names: Vec<String> = files.iter().map(|path| file_name(path)).collect();
    if let Err(e) = state.log.append(url, format.extension(), &names).await {
        warn!(
            "Failed to write download log {}: {}",
            state.log.path().display(),
            e
        );
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn static_url(session_id: &str, file_name: &str) -> String {
    format!("/static/{}/{}", session_id, urlencoding::encode(file_name))
}
