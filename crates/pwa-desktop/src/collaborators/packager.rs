//! Native packager collaborator backed by electron-packager

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

use super::process;
use super::{NativePackager, PackageRequest};
use crate::error::{BuildError, Result};

/// Runs `npx electron-packager` against the prepared template
#[derive(Debug, Clone)]
pub struct ElectronPackager {
    program: String,
}

impl ElectronPackager {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn packager_args(request: &PackageRequest) -> Vec<String> {
        vec![
            "electron-packager".to_string(),
            request.source_dir.display().to_string(),
            request.name.clone(),
            format!("--platform={}", request.platform),
            format!("--arch={}", request.arch),
            format!("--out={}", request.output_dir.display()),
            format!("--icon={}", request.icon_path.display()),
            "--overwrite".to_string(),
            "--prune=true".to_string(),
        ]
    }
}

impl Default for ElectronPackager {
    fn default() -> Self {
        Self::new("npx")
    }
}

#[async_trait]
impl NativePackager for ElectronPackager {
    async fn package(&self, request: &PackageRequest) -> Result<PathBuf> {
        info!(name = %request.name, platform = %request.platform, arch = %request.arch, "Packaging app...");

        let npx = process::locate(&self.program).map_err(|e| {
            BuildError::packaging(format!("'{}' was not found: {}", self.program, e)).with_source(e)
        })?;
        let args = Self::packager_args(request);
        let output = process::run(&npx, &args, &request.source_dir)
            .await
            .map_err(|e| {
                BuildError::packaging(format!("Failed to run {}: {}", npx.display(), e))
                    .with_source(e)
            })?;

        if !output.success {
            return Err(BuildError::packaging(output.diagnostics().to_string()));
        }

        let bundle = request.bundle_path();
        if !bundle.exists() {
            warn!(bundle = %bundle.display(), status = %output.status, "Packager finished but bundle is missing");
        }
        Ok(bundle)
    }
}
