//! Build pipeline orchestration
//!
//! Stages run one after another in [`Stage::ALL`] order. Each stage reads
//! the [`GenerationContext`] and calls at most one collaborator; the first
//! failure stops the build and is reported with the stage that raised it.

use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::collaborators::{Collaborators, PackageRequest};
use crate::config::PlatformConfig;
use crate::context::{GenerationContext, MANIFEST_FILE_NAME};
use crate::error::{BuildError, BuildErrorCode, Result};
use crate::icons::collect_icons_for_sizes;
use crate::manifest::{ManifestFormat, ManifestInfo};

/// Message attached to every template copy failure
pub const TEMPLATE_COPY_FAILED: &str = "failed to copy project template";

pub const GENERATION_INFO_FILE_NAME: &str = "generationInfo.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ValidateManifest,
    CreatePlatformDir,
    FetchIcons,
    TranscodeIcons,
    MaterializeTemplate,
    CopyDocumentation,
    WriteGenerationInfo,
    PersistManifest,
    FinalizePackage,
    InstallDependencies,
    Package,
    InjectManifest,
}

impl Stage {
    pub const ALL: [Stage; 12] = [
        Stage::ValidateManifest,
        Stage::CreatePlatformDir,
        Stage::FetchIcons,
        Stage::TranscodeIcons,
        Stage::MaterializeTemplate,
        Stage::CopyDocumentation,
        Stage::WriteGenerationInfo,
        Stage::PersistManifest,
        Stage::FinalizePackage,
        Stage::InstallDependencies,
        Stage::Package,
        Stage::InjectManifest,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::ValidateManifest => "validate-manifest",
            Stage::CreatePlatformDir => "create-platform-dir",
            Stage::FetchIcons => "fetch-icons",
            Stage::TranscodeIcons => "transcode-icons",
            Stage::MaterializeTemplate => "materialize-template",
            Stage::CopyDocumentation => "copy-documentation",
            Stage::WriteGenerationInfo => "write-generation-info",
            Stage::PersistManifest => "persist-manifest",
            Stage::FinalizePackage => "finalize-package",
            Stage::InstallDependencies => "install-dependencies",
            Stage::Package => "package",
            Stage::InjectManifest => "inject-manifest",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal failure of a build
#[derive(Debug, thiserror::Error)]
#[error("Stage '{stage}' failed: {source}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub source: BuildError,
}

impl StageFailure {
    pub fn code(&self) -> BuildErrorCode {
        self.source.code()
    }

    pub fn message(&self) -> &str {
        self.source.message()
    }
}

/// What a successful build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub platform_dir: PathBuf,
    pub app_name: String,
    pub bundle_path: PathBuf,
}

#[derive(Serialize)]
struct GenerationInfo<'a> {
    generator: &'static str,
    generator_version: &'static str,
    platform_id: &'a str,
    platform_name: &'a str,
    manifest_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_url: Option<&'a str>,
    generated_at: String,
}

/// Runs the fixed stage sequence for one platform
pub struct Pipeline<'a> {
    config: &'a PlatformConfig,
    collaborators: &'a Collaborators,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PlatformConfig, collaborators: &'a Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Execute every stage in order, stopping at the first failure
    pub async fn run(
        &self,
        manifest: &ManifestInfo,
        ctx: &GenerationContext,
    ) -> std::result::Result<BuildSummary, StageFailure> {
        let start = Instant::now();
        info!("Generating the {} app...", self.config.name);

        for stage in Stage::ALL {
            let span = info_span!("stage", name = stage.name());
            let stage_start = Instant::now();
            info!(parent: &span, "Starting stage");
            self.run_stage(stage, manifest, ctx)
                .instrument(span)
                .await
                .map_err(|source| {
                    warn!(stage = stage.name(), error = %source, "Build stage failed");
                    StageFailure { stage, source }
                })?;
            debug!(stage = stage.name(), elapsed = ?stage_start.elapsed(), "Stage complete");
        }

        let summary = self
            .summary(ctx)
            .map_err(|source| StageFailure {
                stage: Stage::InjectManifest,
                source,
            })?;
        info!(
            bundle = %summary.bundle_path.display(),
            elapsed = ?start.elapsed(),
            "{} app generated",
            self.config.name
        );
        Ok(summary)
    }

    async fn run_stage(
        &self,
        stage: Stage,
        manifest: &ManifestInfo,
        ctx: &GenerationContext,
    ) -> Result<()> {
        match stage {
            Stage::ValidateManifest => self.validate_manifest(manifest),
            Stage::CreatePlatformDir => self.create_platform_dir(ctx).await,
            Stage::FetchIcons => self.fetch_icons(manifest, ctx).await,
            Stage::TranscodeIcons => self.transcode_icons(ctx).await,
            Stage::MaterializeTemplate => self.materialize_template(ctx).await,
            Stage::CopyDocumentation => self.copy_documentation(ctx).await,
            Stage::WriteGenerationInfo => self.write_generation_info(manifest, ctx).await,
            Stage::PersistManifest => self.persist_manifest(manifest, ctx).await,
            Stage::FinalizePackage => self.finalize_package(manifest, ctx).await,
            Stage::InstallDependencies => self.install_dependencies(ctx).await,
            Stage::Package => self.package(ctx).await,
            Stage::InjectManifest => self.inject_manifest(ctx).await,
        }
    }

    fn validate_manifest(&self, manifest: &ManifestInfo) -> Result<()> {
        if manifest.format != ManifestFormat::W3c {
            return Err(BuildError::validation(format!(
                "The '{}' manifest format is not valid for this platform.",
                manifest.format
            )));
        }
        Ok(())
    }

    async fn create_platform_dir(&self, ctx: &GenerationContext) -> Result<()> {
        info!("Creating the {} app folder...", self.config.name);
        self.collaborators.fs.mkdir_all(ctx.platform_dir()).await
    }

    async fn fetch_icons(&self, manifest: &ManifestInfo, ctx: &GenerationContext) -> Result<()> {
        self.collaborators.fs.mkdir_all(ctx.images_dir()).await?;
        let selections = collect_icons_for_sizes(
            &manifest.content,
            &self.config.supported_icon_sizes,
            &self.config.icon_rules(),
        );
        debug!(selected = selections.len(), "Icons selected");
        self.collaborators
            .fetcher
            .fetch(&manifest.content.start_url, &selections, ctx.images_dir())
            .await
    }

    async fn transcode_icons(&self, ctx: &GenerationContext) -> Result<()> {
        let artifact = self
            .collaborators
            .transcoder
            .transcode(ctx.images_dir(), ctx.images_dir(), &self.config.icon_artifact_name)
            .await?;
        debug!(artifact = %artifact.display(), "App icon created");
        Ok(())
    }

    async fn materialize_template(&self, ctx: &GenerationContext) -> Result<()> {
        self.collaborators
            .fs
            .copy_tree(ctx.source_template_dir(), ctx.target_template_dir())
            .await
            .map_err(|e| BuildError::template(TEMPLATE_COPY_FAILED).with_source(e))
    }

    async fn copy_documentation(&self, ctx: &GenerationContext) -> Result<()> {
        let fs = &self.collaborators.fs;
        if !fs.exists(ctx.docs_source_dir()).await {
            warn!(dir = %ctx.docs_source_dir().display(), "No documentation to copy");
            return Ok(());
        }
        fs.copy_tree(ctx.docs_source_dir(), ctx.docs_target_dir()).await
    }

    async fn write_generation_info(
        &self,
        manifest: &ManifestInfo,
        ctx: &GenerationContext,
    ) -> Result<()> {
        let info = GenerationInfo {
            generator: env!("CARGO_PKG_NAME"),
            generator_version: env!("CARGO_PKG_VERSION"),
            platform_id: &self.config.id,
            platform_name: &self.config.name,
            manifest_format: manifest.format.as_str(),
            generated_from: manifest.generated_from.as_deref(),
            generated_url: manifest.generated_url.as_deref(),
            generated_at: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_vec_pretty(&info).map_err(|e| {
            BuildError::io(format!("Failed to serialize generation info: {}", e)).with_source(e)
        })?;
        self.collaborators
            .fs
            .write(&ctx.platform_dir().join(GENERATION_INFO_FILE_NAME), &json)
            .await
    }

    async fn persist_manifest(&self, manifest: &ManifestInfo, ctx: &GenerationContext) -> Result<()> {
        info!("Copying the {} manifest to the app folder...", self.config.name);
        let json = manifest.content.to_json_pretty()?;
        self.collaborators
            .fs
            .write(ctx.manifest_file_path(), json.as_bytes())
            .await
    }

    async fn finalize_package(&self, manifest: &ManifestInfo, ctx: &GenerationContext) -> Result<()> {
        let package_file = ctx.package_file_path();
        let fs = &self.collaborators.fs;
        let descriptor = fs.read_to_string(&package_file).await?;
        let app_name = ctx.finalize_app_name(&manifest.content.short_name);
        let filled = descriptor.replace(&self.config.name_placeholder, app_name);
        fs.write(&package_file, filled.as_bytes()).await
    }

    async fn install_dependencies(&self, ctx: &GenerationContext) -> Result<()> {
        info!("Generating {} package", self.config.name);
        self.collaborators
            .installer
            .install(ctx.target_template_dir(), &self.config.dependencies)
            .await
    }

    async fn package(&self, ctx: &GenerationContext) -> Result<()> {
        let request = PackageRequest {
            name: app_name(ctx)?.to_string(),
            source_dir: ctx.target_template_dir().to_path_buf(),
            platform: self.config.package_type.clone(),
            arch: self.config.arch.clone(),
            output_dir: ctx.output_dir().to_path_buf(),
            icon_path: ctx.images_dir().join(self.config.icon_artifact_file()),
            bundle_extension: self.config.bundle_extension.clone(),
        };
        let produced = self.collaborators.packager.package(&request).await?;
        debug!(bundle = %produced.display(), "Bundle produced");
        Ok(())
    }

    async fn inject_manifest(&self, ctx: &GenerationContext) -> Result<()> {
        let target = self
            .bundle_path(ctx)?
            .join(&self.config.bundle_resources_path)
            .join(MANIFEST_FILE_NAME);
        self.collaborators
            .fs
            .copy_file(ctx.manifest_file_path(), &target)
            .await
    }

    fn bundle_path(&self, ctx: &GenerationContext) -> Result<PathBuf> {
        ctx.bundle_path(
            &self.config.package_type,
            &self.config.arch,
            &self.config.bundle_extension,
        )
        .ok_or_else(|| BuildError::packaging("App name is not known before packaging"))
    }

    fn summary(&self, ctx: &GenerationContext) -> Result<BuildSummary> {
        Ok(BuildSummary {
            platform_dir: ctx.platform_dir().to_path_buf(),
            app_name: app_name(ctx)?.to_string(),
            bundle_path: self.bundle_path(ctx)?,
        })
    }
}

fn app_name(ctx: &GenerationContext) -> Result<&str> {
    ctx.app_name()
        .ok_or_else(|| BuildError::packaging("App name is not known before packaging"))
}
