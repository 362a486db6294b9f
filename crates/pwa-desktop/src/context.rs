//! Per-build generation context
//!
//! Built in two phases: [`ContextBuilder`] lays out every path from the
//! build root and platform id before any stage runs, then the app name is
//! fixed once the manifest's `short_name` has been read.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

use crate::config::default_resources_dir;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Phase one: deterministic path skeleton
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    root_dir: PathBuf,
    platform_id: String,
    resources_dir: PathBuf,
}

impl ContextBuilder {
    pub fn new(root_dir: impl Into<PathBuf>, platform_id: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            platform_id: platform_id.into(),
            resources_dir: default_resources_dir(),
        }
    }

    /// Directory holding the `template/` and `docs/` trees to copy from
    pub fn resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = dir.into();
        self
    }

    pub fn build(self) -> GenerationContext {
        let platform_dir = self.root_dir.join(&self.platform_id);
        debug!(platform_dir = %platform_dir.display(), "context.build");
        GenerationContext {
            source_template_dir: self.resources_dir.join("template"),
            docs_source_dir: self.resources_dir.join("docs"),
            target_template_dir: platform_dir.join("template"),
            images_dir: platform_dir.join("images"),
            manifest_file_path: platform_dir.join(MANIFEST_FILE_NAME),
            docs_target_dir: platform_dir.join("docs"),
            output_dir: platform_dir.join("out"),
            platform_dir,
            root_dir: self.root_dir,
            platform_id: self.platform_id,
            app_name: OnceLock::new(),
        }
    }
}

/// Paths and names shared by every stage of one build
#[derive(Debug)]
pub struct GenerationContext {
    root_dir: PathBuf,
    platform_id: String,
    platform_dir: PathBuf,
    source_template_dir: PathBuf,
    target_template_dir: PathBuf,
    images_dir: PathBuf,
    manifest_file_path: PathBuf,
    docs_source_dir: PathBuf,
    docs_target_dir: PathBuf,
    output_dir: PathBuf,
    app_name: OnceLock<String>,
}

impl GenerationContext {
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn platform_id(&self) -> &str {
        &self.platform_id
    }

    pub fn platform_dir(&self) -> &Path {
        &self.platform_dir
    }

    pub fn source_template_dir(&self) -> &Path {
        &self.source_template_dir
    }

    pub fn target_template_dir(&self) -> &Path {
        &self.target_template_dir
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn manifest_file_path(&self) -> &Path {
        &self.manifest_file_path
    }

    pub fn docs_source_dir(&self) -> &Path {
        &self.docs_source_dir
    }

    pub fn docs_target_dir(&self) -> &Path {
        &self.docs_target_dir
    }

    /// Where the packager writes its output
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Template `package.json` inside the copied template
    pub fn package_file_path(&self) -> PathBuf {
        self.target_template_dir.join("package.json")
    }

    /// Phase two: derive the app name from `short_name` with all whitespace
    /// removed. The first value sticks; later calls return it unchanged.
    pub fn finalize_app_name(&self, short_name: &str) -> &str {
        self.app_name.get_or_init(|| {
            let name: String = short_name.chars().filter(|c| !c.is_whitespace()).collect();
            debug!(app_name = %name, "context.finalize_app_name");
            name
        })
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.get().map(String::as_str)
    }

    /// `out/<name>-<platform>-<arch>/<name>.<ext>`, once the name is known
    pub fn bundle_path(&self, platform: &str, arch: &str, bundle_extension: &str) -> Option<PathBuf> {
        self.app_name().map(|name| {
            self.output_dir
                .join(format!("{}-{}-{}", name, platform, arch))
                .join(format!("{}.{}", name, bundle_extension))
        })
    }
}
