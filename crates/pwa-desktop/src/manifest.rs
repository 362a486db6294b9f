//! Web app manifest model
//!
//! Only the members the packaging pipeline reads are typed. Everything else
//! is kept in a flattened map so persisting the manifest reproduces the
//! document it was loaded from.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{BuildError, Result};

/// Format identifier of manifests this platform accepts
pub const BASE_MANIFEST_FORMAT: &str = "w3c";

/// Web app manifest content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub short_name: String,
    pub start_url: String,
    /// `None` when the member is absent, `Some(None)` for an explicit `null`
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub icons: Option<Option<Vec<IconDescriptor>>>,
    /// Members the pipeline does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Distinguish a `null` member from an absent one
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One entry of the manifest `icons` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconDescriptor {
    pub src: String,
    /// Whitespace separated `WxH` tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IconDescriptor {
    pub fn new(src: impl Into<String>, sizes: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            sizes: Some(sizes.into()),
            mime_type: None,
            extra: Map::new(),
        }
    }

    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Manifest format tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    #[default]
    W3c,
    ChromeOs,
    EdgeExtension,
    Windows10,
    #[serde(untagged)]
    Other(String),
}

impl ManifestFormat {
    pub fn as_str(&self) -> &str {
        match self {
            Self::W3c => BASE_MANIFEST_FORMAT,
            Self::ChromeOs => "chromeos",
            Self::EdgeExtension => "edgeextension",
            Self::Windows10 => "windows10",
            Self::Other(other) => other,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            BASE_MANIFEST_FORMAT => Self::W3c,
            "chromeos" => Self::ChromeOs,
            "edgeextension" => Self::EdgeExtension,
            "windows10" => Self::Windows10,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A manifest together with the format it was recognized as
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestInfo {
    #[serde(default)]
    pub format: ManifestFormat,
    pub content: Manifest,
    /// Where the manifest came from (file path or tool name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_from: Option<String>,
    /// URL the manifest was retrieved from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_url: Option<String>,
}

impl ManifestInfo {
    pub fn new(format: ManifestFormat, content: Manifest) -> Self {
        Self {
            format,
            content,
            generated_from: None,
            generated_url: None,
        }
    }

    /// Parse a bare manifest JSON document
    pub fn from_json(format: ManifestFormat, json: &str) -> Result<Self> {
        let content = Manifest::from_json(json)?;
        Ok(Self::new(format, content))
    }

    /// Read a manifest JSON file, recording its path as provenance
    pub async fn from_file(format: ManifestFormat, path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "manifest.from_file");
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            BuildError::io(format!("Failed to read manifest at {}", path.display())).with_source(e)
        })?;
        let mut info = Self::from_json(format, &json)?;
        info.generated_from = Some(path.display().to_string());
        Ok(info)
    }
}

impl Manifest {
    pub fn new(short_name: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            start_url: start_url.into(),
            icons: None,
            extra: Map::new(),
        }
    }

    pub fn with_icons(mut self, icons: Vec<IconDescriptor>) -> Self {
        self.icons = Some(Some(icons));
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BuildError::validation(format!("Failed to parse manifest: {}", e)))
    }

    /// Serialize in the on-disk encoding written to `manifest.json`
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::io(format!("Failed to serialize manifest: {}", e)).with_source(e))
    }

    pub fn icons(&self) -> &[IconDescriptor] {
        self.icons
            .as_ref()
            .and_then(|icons| icons.as_deref())
            .unwrap_or_default()
    }
}
