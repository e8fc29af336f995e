use super::artifacts;
use super::cleanup::{remove_path, schedule_removal, CleanupGuard};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// One request's isolated working directory
pub struct DownloadSession {
    /// Random UUID v4, also the directory name
    id: String,

    /// `<base_dir>/<id>`
    dir: PathBuf,

    /// Removes `dir` unless ownership of the cleanup is handed elsewhere
    guard: CleanupGuard,
}

impl DownloadSession {
    /// Create a fresh session directory under `base_dir`
    pub async fn create(base_dir: &Path) -> io::Result<Self> {
        let id = uuid::Uuid::new_v4().to_string();
        let dir = base_dir.join(&id);

        tokio::fs::create_dir_all(&dir).await?;
        debug!("Created session directory {}", dir.display());

        Ok(Self {
            guard: CleanupGuard::new(dir.clone()),
            id,
            dir,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Regular files the engine left in the session directory
    pub async fn files(&self) -> io::Result<Vec<PathBuf>> {
        artifacts::list_files(&self.dir).await
    }

    /// Remove the directory now, before answering (failure path)
    pub async fn discard(self) {
        info!("Discarding session {}", self.id);
        if let Some(dir) = self.guard.disarm() {
            remove_path(dir).await;
        }
    }

    /// Hand the cleanup over to whoever outlives the handler (the response body)
    pub fn into_guard(self) -> CleanupGuard {
        self.guard
    }

    /// Keep the directory around for `delay`, then remove it
    pub fn retain_for(self, delay: Duration) {
        if let Some(dir) = self.guard.disarm() {
            debug!("Session {} retained for {:?}", self.id, delay);
            schedule_removal(dir, delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sessions_get_distinct_directories() {
        let base = TempDir::new().unwrap();
        let a = DownloadSession::create(base.path()).await.unwrap();
        let b = DownloadSession::create(base.path()).await.unwrap();

        assert_ne!(a.id(), b.id());
        assert!(a.dir().is_dir());
        assert!(b.dir().is_dir());
        assert_eq!(a.dir(), base.path().join(a.id()));
    }

    #[tokio::test]
    async fn test_discard_removes_directory_immediately() {
        let base = TempDir::new().unwrap();
        let session = DownloadSession::create(base.path()).await.unwrap();
        let dir = session.dir().to_path_buf();
        tokio::fs::write(dir.join("partial.mp4.part"), b"xx").await.unwrap();

        session.discard().await;

        assert!(!dir.exists());
    }

    #[test]
    fn test_retained_session_swept_after_restart() {
        let base = TempDir::new().unwrap();

        // Runtime shuts down while the retention timer is pending
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = runtime.block_on(async {
            let session = DownloadSession::create(base.path()).await.unwrap();
            let dir = session.dir().to_path_buf();
            session.retain_for(Duration::from_secs(600));
            dir
        });
        drop(runtime);
        assert!(dir.exists());

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let removed = runtime
            .block_on(crate::session::sweep_stale_sessions(base.path()))
            .unwrap();

        assert_eq!(removed, 1);
        assert!(!dir.exists());
    }
}
