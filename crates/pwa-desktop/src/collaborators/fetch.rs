//! Icon fetch collaborator
//!
//! Resolves icon `src` values against the manifest `start_url` and stores
//! the bytes in the images directory. Remote icons are downloaded over
//! HTTP(S); `file:` URLs are copied from disk.

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

use super::IconFetcher;
use crate::error::{BuildError, Result};
use crate::icons::IconSelection;

/// Resolve `src` relative to `base_url`; an absolute `src` is used as is
pub fn resolve_icon_url(base_url: &str, src: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(src) {
        return Ok(url);
    }
    let base = Url::parse(base_url).map_err(|e| {
        BuildError::io(format!(
            "Cannot resolve icon '{}': start_url '{}' is not an absolute URL ({})",
            src, base_url, e
        ))
    })?;
    base.join(src).map_err(|e| {
        BuildError::io(format!(
            "Cannot resolve icon '{}' against '{}': {}",
            src, base_url, e
        ))
    })
}

/// [`IconFetcher`] for `http`, `https` and `file` URLs
#[derive(Debug, Clone, Default)]
pub struct UrlIconFetcher {
    client: reqwest::Client,
}

impl UrlIconFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        match url.scheme() {
            "http" | "https" => {
                let response = self.client.get(url.clone()).send().await.map_err(|e| {
                    BuildError::io(format!("Failed to download {}: {}", url, e)).with_source(e)
                })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(BuildError::io(format!(
                        "Failed to download {}: HTTP {}",
                        url, status
                    )));
                }
                let bytes = response.bytes().await.map_err(|e| {
                    BuildError::io(format!("Failed to read body of {}: {}", url, e)).with_source(e)
                })?;
                Ok(bytes.to_vec())
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| BuildError::io(format!("Invalid file URL: {}", url)))?;
                tokio::fs::read(&path).await.map_err(|e| {
                    BuildError::io(format!("Failed to read icon {}: {}", path.display(), e))
                        .with_source(e)
                })
            }
            other => Err(BuildError::io(format!(
                "Unsupported icon URL scheme '{}': {}",
                other, url
            ))),
        }
    }
}

#[async_trait]
impl IconFetcher for UrlIconFetcher {
    async fn fetch(&self, base_url: &str, icons: &[IconSelection], images_dir: &Path) -> Result<()> {
        info!(count = icons.len(), "Downloading icons...");
        for icon in icons {
            let url = resolve_icon_url(base_url, &icon.url)?;
            debug!(url = %url, file = %icon.file_name, "fetch.icon");
            let bytes = self.fetch_bytes(&url).await?;
            let dest = images_dir.join(&icon.file_name);
            tokio::fs::write(&dest, &bytes).await.map_err(|e| {
                BuildError::io(format!("Failed to write {}: {}", dest.display(), e)).with_source(e)
            })?;
        }
        Ok(())
    }
}
