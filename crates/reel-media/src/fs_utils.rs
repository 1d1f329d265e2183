//! Filesystem helpers for workspace artifacts.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// EXDEV on Linux and macOS.
const CROSS_DEVICE_ERRNO: i32 = 18;

/// Move a finished artifact out of a job workspace.
///
/// Tries a rename first. Work and output directories may sit on different
/// mounts, in which case the file is copied next to `dst` under a `.partial`
/// name and renamed into place, so readers of `dst` never see half a file.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(CROSS_DEVICE_ERRNO) => {
            debug!(src = %src.display(), dst = %dst.display(), "cross-device move, copying");
            let staging = dst.with_extension("partial");
            if let Err(e) = fs::copy(src, &staging).await {
                remove_if_exists(&staging).await;
                return Err(e.into());
            }
            if let Err(e) = fs::rename(&staging, dst).await {
                remove_if_exists(&staging).await;
                return Err(e.into());
            }
            if let Err(e) = fs::remove_file(src).await {
                warn!(src = %src.display(), "could not remove moved source: {}", e);
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Size of a file that must exist and be non-empty.
pub async fn non_empty_file_size(path: impl AsRef<Path>) -> MediaResult<u64> {
    let path = path.as_ref();
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        Ok(_) => Err(MediaError::invalid_media(format!(
            "{} is empty or not a regular file",
            path.display()
        ))),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(MediaError::FileNotFound(path.to_path_buf())),
        Err(e) => Err(e.into()),
    }
}

/// Delete a file, ignoring a missing one.
pub async fn remove_if_exists(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "failed to remove file: {}", e),
    }
}
