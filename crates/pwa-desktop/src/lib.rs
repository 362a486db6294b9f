//! pwa-desktop: package a web app manifest as an Electron desktop app
//!
//! Given a W3C web app manifest, the Electron platform lays out a build
//! folder, downloads the icons the manifest declares, composes them into a
//! macOS `.icns`, materializes an Electron project template, installs its
//! npm dependencies and runs electron-packager to produce a `.app` bundle
//! with the manifest embedded in its resources.
//!
//! # Architecture
//!
//! - `icons`: picks manifest icons by size and type
//! - `context`: per-build paths and the derived app name
//! - `pipeline`: the ordered build stages and their failure reporting
//! - `platform`: the [`Platform`] capability and [`ElectronPlatform`]
//! - `collaborators`: filesystem, fetch, icon, npm and packager services
//!
//! # Usage
//!
//! ```rust,ignore
//! use pwa_desktop::{BuildOptions, ElectronPlatform, ManifestFormat, ManifestInfo, Platform, PlatformConfig};
//!
//! let manifest = ManifestInfo::from_file(ManifestFormat::W3c, "manifest.json".as_ref()).await?;
//! let platform = ElectronPlatform::with_defaults(PlatformConfig::default());
//! let summary = platform.create(&manifest, "build".as_ref(), &BuildOptions::default()).await?;
//! println!("{}", summary.bundle_path.display());
//! ```

pub mod collaborators;
pub mod config;
pub mod context;
pub mod error;
pub mod icons;
pub mod manifest;
pub mod pipeline;
pub mod platform;

#[cfg(test)]
pub(crate) mod test_support;

pub use collaborators::{Collaborators, PackageRequest};
pub use config::{BuildOptions, PlatformConfig};
pub use context::{ContextBuilder, GenerationContext};
pub use error::{BuildError, BuildErrorCode, Result};
pub use icons::{collect_icons_for_sizes, register_icon, select_icon, IconRules, IconSelection};
pub use manifest::{IconDescriptor, Manifest, ManifestFormat, ManifestInfo};
pub use pipeline::{BuildSummary, Pipeline, Stage, StageFailure};
pub use platform::{ElectronPlatform, Platform};
