use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Removes a path when dropped, unless disarmed
///
/// Attached to a response body, the drop happens once hyper has finished
/// sending the body (or the client went away).
pub struct CleanupGuard {
    path: Option<PathBuf>,
}

impl CleanupGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Take over responsibility for the path
    pub fn disarm(mut self) -> Option<PathBuf> {
        self.path.take()
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(remove_path(path));
            }
            Err(_) => {
                // Outside the runtime (shutdown, sync tests)
                if let Err(e) = remove_sync(&path) {
                    warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }
    }
}

/// Best-effort removal of a directory tree or file. Never fails.
pub async fn remove_path(path: PathBuf) {
    let result = match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&path).await,
        Ok(_) => tokio::fs::remove_file(&path).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => debug!("Already gone: {}", path.display()),
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

/// Remove `path` after `delay` on a background task
pub fn schedule_removal(path: PathBuf, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        remove_path(path).await;
    });
}

/// Remove session directories a previous run left behind
///
/// Retention timers and guards dropped during shutdown never fire, so the
/// service sweeps UUID-named directories under `base_dir` before serving.
pub async fn sweep_stale_sessions(base_dir: &Path) -> std::io::Result<usize> {
    let mut entries = tokio::fs::read_dir(base_dir).await?;
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let is_session = entry
            .file_name()
            .to_str()
            .is_some_and(|name| uuid::Uuid::parse_str(name).is_ok());
        if is_session && entry.file_type().await?.is_dir() {
            remove_path(entry.path()).await;
            removed += 1;
        }
    }

    Ok(removed)
}

fn remove_sync(path: &Path) -> std::io::Result<()> {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn wait_until_gone(path: &Path) -> bool {
        for _ in 0..100 {
            if !path.exists() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[test]
    fn test_drop_outside_runtime_removes_synchronously() {
        let base = TempDir::new().unwrap();
        let dir = base.path().join("session");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("file.mp4"), b"data").unwrap();

        drop(CleanupGuard::new(dir.clone()));

        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_drop_inside_runtime_removes_in_background() {
        let base = TempDir::new().unwrap();
        let dir = base.path().join("session");
        std::fs::create_dir(&dir).unwrap();

        drop(CleanupGuard::new(dir.clone()));

        assert!(wait_until_gone(&dir).await);
    }

    #[tokio::test]
    async fn test_disarmed_guard_leaves_path() {
        let base = TempDir::new().unwrap();
        let dir = base.path().join("session");
        std::fs::create_dir(&dir).unwrap();

        let guard = CleanupGuard::new(dir.clone());
        assert_eq!(guard.path(), Some(dir.as_path()));
        assert_eq!(guard.disarm(), Some(dir.clone()));
        tokio::task::yield_now().await;

        assert!(dir.exists());
    }

    #[tokio::test]
    async fn test_remove_missing_path_is_silent() {
        let base = TempDir::new().unwrap();
        remove_path(base.path().join("never-created")).await;
    }

    #[tokio::test]
    async fn test_sweep_removes_only_session_directories() {
        let base = TempDir::new().unwrap();
        let session = base.path().join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir(&session).unwrap();
        std::fs::write(session.join("clip.mp4"), b"data").unwrap();
        let other_dir = base.path().join("keep-me");
        std::fs::create_dir(&other_dir).unwrap();
        let uuid_file = base.path().join(uuid::Uuid::new_v4().to_string());
        std::fs::write(&uuid_file, b"not a session").unwrap();

        let removed = sweep_stale_sessions(base.path()).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!session.exists());
        assert!(other_dir.exists());
        assert!(uuid_file.exists());
    }

    #[tokio::test]
    async fn test_scheduled_removal_waits_for_delay() {
        let base = TempDir::new().unwrap();
        let dir = base.path().join("session");
        std::fs::create_dir(&dir).unwrap();

        schedule_removal(dir.clone(), Duration::from_millis(200));
        assert!(dir.exists());

        assert!(wait_until_gone(&dir).await);
    }
}
