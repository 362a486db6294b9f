//! Dependency installer collaborator backed by npm

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use super::process;
use super::DependencyInstaller;
use crate::error::{BuildError, Result};

/// Runs `npm install --prefix <dir> <deps..>`
#[derive(Debug, Clone)]
pub struct NpmInstaller {
    program: String,
}

impl NpmInstaller {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn install_args(target_dir: &Path, dependencies: &[String]) -> Vec<String> {
        let mut args = vec![
            "install".to_string(),
            "--prefix".to_string(),
            target_dir.display().to_string(),
        ];
        args.extend(dependencies.iter().cloned());
        args
    }
}

impl Default for NpmInstaller {
    fn default() -> Self {
        Self::new("npm")
    }
}

#[async_trait]
impl DependencyInstaller for NpmInstaller {
    async fn install(&self, target_dir: &Path, dependencies: &[String]) -> Result<()> {
        info!(count = dependencies.len(), dir = %target_dir.display(), "Installing dependencies...");

        let npm = process::locate(&self.program).map_err(|e| {
            BuildError::install(format!("'{}' was not found: {}", self.program, e)).with_source(e)
        })?;
        let args = Self::install_args(target_dir, dependencies);
        let output = process::run(&npm, &args, target_dir).await.map_err(|e| {
            BuildError::install(format!("Failed to run {}: {}", npm.display(), e)).with_source(e)
        })?;

        if !output.success {
            return Err(BuildError::install(output.diagnostics().to_string()));
        }
        Ok(())
    }
}
