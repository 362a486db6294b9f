//! Local filesystem collaborator

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::FileSystem;
use crate::error::{BuildError, Result};

fn io_error(action: &str, path: &Path, e: std::io::Error) -> BuildError {
    BuildError::io(format!("Failed to {} {}: {}", action, path.display(), e)).with_source(e)
}

/// Copy directory recursively, overwriting files that already exist
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| io_error("create directory", dst, e))?;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| {
            BuildError::io(format!("Failed to read {}: {}", src.display(), e)).with_source(e)
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BuildError::io(e.to_string()))?;
        let dest_path = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path).map_err(|e| io_error("create directory", &dest_path, e))?;
        } else {
            fs::copy(entry.path(), &dest_path).map_err(|e| io_error("copy", entry.path(), e))?;
        }
    }
    Ok(())
}

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn mkdir_all(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "fs.mkdir_all");
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| io_error("create directory", path, e))
    }

    async fn copy_tree(&self, src: &Path, dst: &Path) -> Result<()> {
        debug!(src = %src.display(), dst = %dst.display(), "fs.copy_tree");
        let (src, dst): (PathBuf, PathBuf) = (src.to_path_buf(), dst.to_path_buf());
        tokio::task::spawn_blocking(move || {
            if !src.is_dir() {
                return Err(BuildError::io(format!(
                    "Source directory does not exist: {}",
                    src.display()
                )));
            }
            copy_dir_recursive(&src, &dst)
        })
        .await
        .map_err(|e| BuildError::io(format!("Copy task failed: {}", e)).with_source(e))?
    }

    async fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        debug!(src = %src.display(), dst = %dst.display(), "fs.copy_file");
        tokio::fs::copy(src, dst)
            .await
            .map(|_| ())
            .map_err(|e| io_error("copy", src, e))
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read_to_string(&self, path: &Path) -> Result<String> {
        debug!(path = %path.display(), "fs.read_to_string");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| io_error("read", path, e))
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        debug!(path = %path.display(), bytes = contents.len(), "fs.write");
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| io_error("write", path, e))
    }
}
