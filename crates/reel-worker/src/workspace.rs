//! Per-job scratch directory.

use reel_models::JobId;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::WorkerResult;

/// Private temporary directory for one job, named after its job ID.
///
/// Removed by [`JobWorkspace::cleanup`] or, failing that, on drop. Removal
/// happens at most once either way.
#[derive(Debug)]
pub struct JobWorkspace {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl JobWorkspace {
    /// Create `<work_dir>/<job_id>-XXXXXX`.
    pub fn create(work_dir: &Path, job_id: &JobId) -> WorkerResult<Self> {
        std::fs::create_dir_all(work_dir)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("{job_id}-"))
            .tempdir_in(work_dir)?;
        let path = dir.path().to_path_buf();
        debug!(job_id = %job_id, path = %path.display(), "workspace created");
        Ok(Self { path, dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn narration_path(&self) -> PathBuf {
        self.path.join("narration.mp3")
    }

    pub fn background_path(&self) -> PathBuf {
        self.path.join("background.mp4")
    }

    pub fn render_path(&self) -> PathBuf {
        self.path.join("render.mp4")
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.dir.is_none()
    }

    /// Remove the directory and everything in it. Later calls are no-ops.
    pub fn cleanup(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!(path = %self.path.display(), error = %e, "workspace cleanup failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_is_named_after_job() {
        let root = tempfile::tempdir().unwrap();
        let job_id = JobId::from_string("job-42");
        let ws = JobWorkspace::create(root.path(), &job_id).unwrap();

        let name = ws.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("job-42-"));
        assert_eq!(ws.render_path(), ws.path().join("render.mp4"));
        assert!(ws.path().is_dir());
    }

    #[test]
    fn test_cleanup_runs_once() {
        let root = tempfile::tempdir().unwrap();
        let mut ws = JobWorkspace::create(root.path(), &JobId::new()).unwrap();
        std::fs::write(ws.background_path(), b"x").unwrap();
        let path = ws.path().to_path_buf();

        ws.cleanup();
        assert!(!path.exists());
        assert!(ws.is_cleaned_up());
        ws.cleanup();
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let ws = JobWorkspace::create(root.path(), &JobId::new()).unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
