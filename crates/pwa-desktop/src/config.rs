//! Platform configuration
//!
//! Defaults describe the Electron/macOS target. Any field can be overridden
//! from a TOML file:
//!
//! ```toml
//! arch = "arm64"
//! dependencies = ["electron@^30.0.0", "electron-window-state@^5.0.3"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{BuildError, Result};
use crate::icons::IconRules;

/// Static description of the packaging target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Directory name under the build root, e.g. `electron`
    pub id: String,
    /// Human readable platform name used in log output
    pub name: String,
    /// Packager target platform (`darwin`, `linux`, `win32`)
    pub package_type: String,
    /// Packager target architecture
    pub arch: String,
    /// Square icon sizes fetched from the manifest, in order
    pub supported_icon_sizes: Vec<String>,
    pub supported_icon_extension: String,
    pub supported_icon_type: String,
    /// Extension of the produced application bundle
    pub bundle_extension: String,
    /// Resource directory inside the bundle that receives `manifest.json`
    pub bundle_resources_path: String,
    /// File stem of the composed icon artifact (`app` -> `app.icns`)
    pub icon_artifact_name: String,
    /// Token in the template `package.json` that is replaced by the app name
    pub name_placeholder: String,
    /// Runtime dependencies installed into the copied template
    pub dependencies: Vec<String>,
    pub npm_program: String,
    pub npx_program: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            id: "electron".to_string(),
            name: "Electron".to_string(),
            package_type: "darwin".to_string(),
            arch: "x64".to_string(),
            supported_icon_sizes: ["16", "32", "64", "128", "256", "512", "1024"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            supported_icon_extension: "png".to_string(),
            supported_icon_type: "image/png".to_string(),
            bundle_extension: "app".to_string(),
            bundle_resources_path: "Contents/Resources".to_string(),
            icon_artifact_name: "app".to_string(),
            name_placeholder: "replace".to_string(),
            dependencies: vec![
                "electron-prebuilt@^1.2.0".to_string(),
                "electron-window-state@^3.0.3".to_string(),
                "color@^0.11.3".to_string(),
            ],
            npm_program: "npm".to_string(),
            npx_program: "npx".to_string(),
        }
    }
}

impl PlatformConfig {
    /// Parse configuration from a TOML file; missing keys keep their defaults
    pub async fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "config.from_file");
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            BuildError::io(format!("Failed to read config at {}", path.display())).with_source(e)
        })?;
        Self::from_toml(&content)
            .map_err(|e| BuildError::validation(format!("{} ({})", e.message(), path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BuildError::validation(format!("Failed to parse config: {}", e)))
    }

    pub fn icon_rules(&self) -> IconRules {
        IconRules::new(&self.supported_icon_extension, &self.supported_icon_type)
    }

    /// File name of the composed icon, e.g. `app.icns`
    pub fn icon_artifact_file(&self) -> String {
        format!("{}.icns", self.icon_artifact_name)
    }
}

/// Per-invocation build options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Directory holding `template/` and `docs/`; defaults to the resources
    /// shipped with this crate
    pub resources_dir: Option<PathBuf>,
}

impl BuildOptions {
    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    pub fn resources_dir_or_default(&self) -> PathBuf {
        self.resources_dir
            .clone()
            .unwrap_or_else(default_resources_dir)
    }
}

/// Resources bundled alongside the crate sources
pub fn default_resources_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlatformConfig::default();
        assert_eq!(config.id, "electron");
        assert_eq!(config.package_type, "darwin");
        assert_eq!(config.arch, "x64");
        assert_eq!(config.icon_artifact_file(), "app.icns");
        assert_eq!(config.dependencies.len(), 3);
        assert!(config.dependencies[0].starts_with("electron-prebuilt@"));
    }

    #[test]
    fn test_toml_overrides_keep_other_defaults() {
        let config = PlatformConfig::from_toml(
            r#"
            arch = "arm64"
            supported_icon_sizes = ["512"]
            "#,
        )
        .unwrap();
        assert_eq!(config.arch, "arm64");
        assert_eq!(config.supported_icon_sizes, vec!["512".to_string()]);
        assert_eq!(config.package_type, "darwin");
        assert_eq!(config.name_placeholder, "replace");
    }

    #[test]
    fn test_invalid_toml() {
        let err = PlatformConfig::from_toml("arch = [").unwrap_err();
        assert!(err.message().starts_with("Failed to parse config"));
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electron.toml");
        std::fs::write(&path, "id = \"desktop\"\n").unwrap();
        let config = PlatformConfig::from_file(&path).await.unwrap();
        assert_eq!(config.id, "desktop");
    }

    #[tokio::test]
    async fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = PlatformConfig::from_file(&dir.path().join("missing.toml"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::error::BuildErrorCode::Io);
    }

    #[tokio::test]
    async fn test_from_file_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "arch = [").unwrap();
        let err = PlatformConfig::from_file(&path).await.unwrap_err();
        assert!(err.message().contains("bad.toml"));
    }

    #[test]
    fn test_default_resources_dir_has_template() {
        let options = BuildOptions::default();
        let dir = options.resources_dir_or_default();
        assert!(dir.join("template").join("package.json").exists());
    }
}
