//! Platform capability
//!
//! A platform turns a recognized manifest into a native app under
//! `<root_dir>/<platform id>/`. [`ElectronPlatform`] is the macOS Electron
//! target; its behavior is driven entirely by [`PlatformConfig`] and the
//! [`Collaborators`] it was built with.

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::collaborators::Collaborators;
use crate::config::{BuildOptions, PlatformConfig};
use crate::context::ContextBuilder;
use crate::manifest::ManifestInfo;
use crate::pipeline::{BuildSummary, Pipeline, StageFailure};

#[async_trait]
pub trait Platform: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Generate the app for `manifest` inside `root_dir`
    async fn create(
        &self,
        manifest: &ManifestInfo,
        root_dir: &Path,
        options: &BuildOptions,
    ) -> Result<BuildSummary, StageFailure>;
}

#[derive(Debug, Clone)]
pub struct ElectronPlatform {
    config: PlatformConfig,
    collaborators: Collaborators,
}

impl ElectronPlatform {
    pub fn new(config: PlatformConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Platform wired to the local filesystem, network and npm toolchain
    pub fn with_defaults(config: PlatformConfig) -> Self {
        let collaborators = Collaborators::local(&config);
        Self::new(config, collaborators)
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

#[async_trait]
impl Platform for ElectronPlatform {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn create(
        &self,
        manifest: &ManifestInfo,
        root_dir: &Path,
        options: &BuildOptions,
    ) -> Result<BuildSummary, StageFailure> {
        info!(platform = %self.config.id, root = %root_dir.display(), "platform.create");
        let ctx = ContextBuilder::new(root_dir, self.config.id.as_str())
            .resources_dir(options.resources_dir_or_default())
            .build();
        Pipeline::new(&self.config, &self.collaborators)
            .run(manifest, &ctx)
            .await
    }
}
