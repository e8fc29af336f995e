//! Per-request download sessions
//!
//! Every download request gets its own `DownloadSession`: a random id mapped
//! to a private directory under the configured base directory. The session
//! owns a `CleanupGuard`, so the directory is removed exactly once:
//! - immediately on the failure path (`discard`)
//! - after the response body is dropped (`into_guard`)
//! - after a retention delay for multi-file results (`retain_for`)
//! - at the next startup, for anything a shutdown cut short (`sweep_stale_sessions`)

mod artifacts;
mod cleanup;
mod session;

pub use artifacts::{find_output, list_files};
pub use cleanup::{remove_path, schedule_removal, sweep_stale_sessions, CleanupGuard};
pub use session::DownloadSession;
