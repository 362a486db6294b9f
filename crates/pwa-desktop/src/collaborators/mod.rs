//! External services the pipeline drives
//!
//! Each stage calls at most one of these. The default implementations use
//! the local filesystem, HTTP(S), the `image` crate, npm and
//! electron-packager; tests swap in recording doubles.

pub mod fetch;
pub mod fs;
pub mod icns;
pub mod npm;
pub mod packager;
mod process;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PlatformConfig;
use crate::error::Result;
use crate::icons::IconSelection;

pub use fetch::UrlIconFetcher;
pub use fs::LocalFileSystem;
pub use icns::IcnsTranscoder;
pub use npm::NpmInstaller;
pub use packager::ElectronPackager;

#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Create `path` and its parents; an existing directory is not an error
    async fn mkdir_all(&self, path: &Path) -> Result<()>;
    /// Recursively copy `src` into `dst`, overwriting existing files
    async fn copy_tree(&self, src: &Path, dst: &Path) -> Result<()>;
    async fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;
    async fn exists(&self, path: &Path) -> bool;
    async fn read_to_string(&self, path: &Path) -> Result<String>;
    async fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

#[async_trait]
pub trait IconFetcher: Send + Sync {
    /// Resolve each selection's url against `base_url` and store it as
    /// `images_dir/<file_name>`
    async fn fetch(&self, base_url: &str, icons: &[IconSelection], images_dir: &Path) -> Result<()>;
}

#[async_trait]
pub trait IconTranscoder: Send + Sync {
    /// Compose the staged icons in `images_dir` into one native icon named
    /// `<artifact_name>.icns` inside `output_dir`, returning its path
    async fn transcode(&self, images_dir: &Path, output_dir: &Path, artifact_name: &str)
        -> Result<PathBuf>;
}

#[async_trait]
pub trait DependencyInstaller: Send + Sync {
    /// Install `name@range` packages into `target_dir`
    async fn install(&self, target_dir: &Path, dependencies: &[String]) -> Result<()>;
}

/// Everything the native packager needs for one bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub name: String,
    pub source_dir: PathBuf,
    pub platform: String,
    pub arch: String,
    pub output_dir: PathBuf,
    pub icon_path: PathBuf,
    pub bundle_extension: String,
}

impl PackageRequest {
    /// `output_dir/<name>-<platform>-<arch>/<name>.<bundle_extension>`
    pub fn bundle_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}-{}", self.name, self.platform, self.arch))
            .join(format!("{}.{}", self.name, self.bundle_extension))
    }
}

#[async_trait]
pub trait NativePackager: Send + Sync {
    /// Produce the bundle and return its path
    async fn package(&self, request: &PackageRequest) -> Result<PathBuf>;
}

/// Collaborator set handed to the pipeline
#[derive(Clone)]
pub struct Collaborators {
    pub fs: Arc<dyn FileSystem>,
    pub fetcher: Arc<dyn IconFetcher>,
    pub transcoder: Arc<dyn IconTranscoder>,
    pub installer: Arc<dyn DependencyInstaller>,
    pub packager: Arc<dyn NativePackager>,
}

impl Collaborators {
    /// Default local implementations configured from `config`
    pub fn local(config: &PlatformConfig) -> Self {
        Self {
            fs: Arc::new(LocalFileSystem),
            fetcher: Arc::new(UrlIconFetcher::new()),
            transcoder: Arc::new(IcnsTranscoder),
            installer: Arc::new(NpmInstaller::new(&config.npm_program)),
            packager: Arc::new(ElectronPackager::new(&config.npx_program)),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
