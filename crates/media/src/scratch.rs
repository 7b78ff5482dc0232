//! Per-request scratch files.
//!
//! Each media message gets its own uniquely named file under a scratch
//! directory (the OS temp dir in production), so concurrent requests never
//! collide. Files live only between download and model upload; cleanup is
//! tolerant of paths that are already gone.

use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;

/// A directory that staging files are written into.
#[derive(Clone, Debug)]
pub struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    /// Scratch area in the OS temp dir.
    #[must_use]
    pub fn system() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    /// Scratch area rooted at an explicit directory.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `bytes` to a fresh uniquely named file and return its path.
    pub async fn write(&self, bytes: &[u8], extension: &str) -> Result<PathBuf> {
        let path = self
            .dir
            .join(format!("gembot-{}.{extension}", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "scratch file written");
        Ok(path)
    }
}

/// Delete each path that still exists; missing files and failed deletes are
/// ignored, no error is signaled either way.
pub async fn remove_quietly(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "scratch file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => debug!(path = %path.display(), error = %e, "scratch cleanup skipped"),
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scratch_files_are_unique_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = Scratch::in_dir(dir.path());

        let a = scratch.write(b"one", "jpg").await.unwrap();
        let b = scratch.write(b"two", "jpg").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(tokio::fs::read(&a).await.unwrap(), b"one");

        remove_quietly(&[a.clone(), b.clone()]).await;
        assert!(!a.exists());
        assert!(!b.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn remove_quietly_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let ghost = dir.path().join("gembot-never-written.jpg");
        // Must not panic or error.
        remove_quietly(&[ghost.clone(), ghost]).await;
    }
}
