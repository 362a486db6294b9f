use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pwa_desktop::{
    select_icon, BuildOptions, ElectronPlatform, ManifestFormat, ManifestInfo,
    Platform, PlatformConfig,
};

/// Package a web app manifest as an Electron desktop app
#[derive(Debug, Parser)]
#[command(name = "pwa-desktop", version, about)]
struct Cli {
    /// Log at debug level unless PWA_DESKTOP_LOG is set
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the app folder and the packaged bundle
    Build {
        /// Path to the manifest JSON file
        manifest: PathBuf,

        /// Build root; the app folder is created as <out>/<platform id>
        #[arg(long, short, default_value = ".")]
        out: PathBuf,

        /// TOML file overriding the platform configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Format the manifest was recognized as
        #[arg(long, default_value = "w3c")]
        format: String,

        /// Directory holding the template/ and docs/ trees
        #[arg(long)]
        resources: Option<PathBuf>,
    },
    /// Show which manifest icon is chosen for each supported size
    Icons {
        manifest: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("PWA_DESKTOP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn load_config(path: Option<&Path>) -> Result<PlatformConfig> {
    debug!(config = ?path, "cli.load_config");
    match path {
        Some(path) => PlatformConfig::from_file(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(PlatformConfig::default()),
    }
}

async fn cmd_build(
    manifest: &Path,
    out: &Path,
    config: Option<&Path>,
    format: &str,
    resources: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config).await?;
    let manifest = ManifestInfo::from_file(ManifestFormat::parse(format), manifest)
        .await
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;

    let mut options = BuildOptions::default();
    if let Some(dir) = resources {
        options = options.with_resources_dir(dir);
    }

    let platform = ElectronPlatform::with_defaults(config);
    let summary = platform
        .create(&manifest, out, &options)
        .await
        .with_context(|| format!("{} build failed", platform.name()))?;

    println!("{} app: {}", platform.name(), summary.app_name);
    println!("  folder: {}", summary.platform_dir.display());
    println!("  bundle: {}", summary.bundle_path.display());
    Ok(())
}

async fn cmd_icons(manifest: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config).await?;
    let manifest = ManifestInfo::from_file(ManifestFormat::W3c, manifest)
        .await
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;

    let rules = config.icon_rules();
    for size in &config.supported_icon_sizes {
        match select_icon(&manifest.content, size, &rules) {
            Some(icon) => println!("{:>5}  {}", size, icon.src),
            None => println!("{:>5}  -", size),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            manifest,
            out,
            config,
            format,
            resources,
        } => cmd_build(&manifest, &out, config.as_deref(), &format, resources).await,
        Command::Icons { manifest, config } => cmd_icons(&manifest, config.as_deref()).await,
    }
}
