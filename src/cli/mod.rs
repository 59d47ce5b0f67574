//! Command-line interface definition

pub mod orchestration;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::bake::{DEFAULT_BAKE_FILE, DEFAULT_METADATA_FILE};

/// Derive container image tags from git history and publish release manifests
#[derive(Debug, Parser)]
#[command(name = "releaser", version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Read the release strategy from this file instead of detecting it
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a release manifest from the current repository
    CreateManifest(CreateManifestArgs),

    /// Analyze a release manifest
    AnalyzeManifest(AnalyzeManifestArgs),

    /// Upload a release manifest to a webhook
    UploadManifest(UploadManifestArgs),

    /// Build the images of a release manifest with docker buildx bake
    BakeManifest(BakeManifestArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct CreateManifestArgs {
    /// Output file where the manifest is written (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct AnalyzeManifestArgs {
    /// Input file where the manifest is read (generated on the fly when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Filter by application
    #[arg(long = "app", visible_alias = "application", value_name = "APP", num_args = 1.., action = ArgAction::Append)]
    pub app: Vec<String>,

    /// Filter by image repository
    #[arg(short, long, value_name = "IMAGE", num_args = 1.., action = ArgAction::Append)]
    pub repository: Vec<String>,

    /// Filter by platform
    #[arg(short, long, value_name = "PLATFORM", num_args = 1.., action = ArgAction::Append)]
    pub platform: Vec<String>,

    /// Skip platform images
    #[arg(long)]
    pub no_platform: bool,

    /// Filter by manifest tag
    #[arg(long, value_name = "TAG", num_args = 1.., action = ArgAction::Append)]
    pub manifest_tag: Vec<String>,

    /// List tags
    #[arg(long)]
    pub list_tags: bool,

    /// List images
    #[arg(long)]
    pub list_images: bool,

    /// List platforms
    #[arg(long)]
    pub list_platforms: bool,

    /// List repositories
    #[arg(long)]
    pub list_repositories: bool,

    /// List applications
    #[arg(long)]
    pub list_applications: bool,
}

#[derive(Debug, Clone, Args)]
pub struct UploadManifestArgs {
    /// Input file where the manifest is read (generated on the fly when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Webhook URL receiving the manifest
    #[arg(short, long, value_name = "URL", env = "RELEASER_WEBHOOK_URL")]
    pub webhook_url: String,
}

#[derive(Debug, Clone, Args)]
pub struct BakeManifestArgs {
    /// Input file where the manifest is read (generated on the fly when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Push images after build
    #[arg(long)]
    pub push: bool,

    /// File where build metadata is written
    #[arg(long, value_name = "FILE", default_value = DEFAULT_METADATA_FILE)]
    pub metadata_file: PathBuf,

    /// File where the bake spec is written
    #[arg(long, value_name = "FILE", default_value = DEFAULT_BAKE_FILE)]
    pub bake_file: PathBuf,

    /// Only build this target or group
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

impl Default for BakeManifestArgs {
    fn default() -> Self {
        BakeManifestArgs {
            input: None,
            push: false,
            metadata_file: PathBuf::from(DEFAULT_METADATA_FILE),
            bake_file: PathBuf::from(DEFAULT_BAKE_FILE),
            name: None,
        }
    }
}
