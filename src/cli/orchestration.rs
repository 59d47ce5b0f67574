//! Command workflows
//!
//! Each subcommand is a plain function taking its arguments and a
//! [Dependencies] bundle, so the workflows can be driven programmatically
//! and in tests with scripted collaborators.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::analyzer::{Filters, ManifestAnalyzer, Query};
use crate::bake::{BakeSpec, BuildxBaker, ImageBaker, ManifestBaker};
use crate::boundary::BoundaryWarning;
use crate::cli::{
    AnalyzeManifestArgs, BakeManifestArgs, Cli, Commands, CreateManifestArgs, UploadManifestArgs,
};
use crate::config::{AutoStrategyReader, FileStrategyReader, StrategyReader};
use crate::domain::Manifest;
use crate::error::{ReleaserError, Result};
use crate::generator::{GeneratedManifest, ManifestGenerator};
use crate::git::{Git2Reader, GitReader};
use crate::store::{JsonFileWriter, ManifestWriter, MemoryWriter, StdoutWriter};
use crate::ui;
use crate::version::{AutoVersionReader, VersionReader};
use crate::webhook::{HttpWebhookClient, ManifestNotifier, WebhookClient};

/// Collaborators used by the command workflows
pub struct Dependencies {
    pub project_root: PathBuf,
    /// Opened from `project_root` on first use when not provided
    pub git: Option<Box<dyn GitReader>>,
    pub strategies: Box<dyn StrategyReader>,
    pub versions: Box<dyn VersionReader>,
    pub webhook: Box<dyn WebhookClient>,
    /// Built from the bake arguments when not provided
    pub baker: Option<Box<dyn ImageBaker>>,
}

impl Dependencies {
    /// Production collaborators for a project directory
    pub fn for_project(project_root: impl Into<PathBuf>, config: Option<&Path>) -> Self {
        let project_root = project_root.into();
        let strategies: Box<dyn StrategyReader> = match config {
            Some(path) => Box::new(FileStrategyReader::new(path)),
            None => Box::new(AutoStrategyReader::new(&project_root)),
        };
        Dependencies {
            git: None,
            strategies,
            versions: Box::new(AutoVersionReader::new(&project_root)),
            webhook: Box::new(HttpWebhookClient::new()),
            baker: None,
            project_root,
        }
    }

    pub fn with_git(mut self, git: impl GitReader + 'static) -> Self {
        self.git = Some(Box::new(git));
        self
    }

    pub fn with_strategies(mut self, strategies: impl StrategyReader + 'static) -> Self {
        self.strategies = Box::new(strategies);
        self
    }

    pub fn with_versions(mut self, versions: impl VersionReader + 'static) -> Self {
        self.versions = Box::new(versions);
        self
    }

    pub fn with_webhook(mut self, webhook: impl WebhookClient + 'static) -> Self {
        self.webhook = Box::new(webhook);
        self
    }

    pub fn with_baker(mut self, baker: impl ImageBaker + 'static) -> Self {
        self.baker = Some(Box::new(baker));
        self
    }

    fn generate(&self, writer: &dyn ManifestWriter) -> Result<GeneratedManifest> {
        let opened;
        let git: &dyn GitReader = match &self.git {
            Some(git) => git.as_ref(),
            None => {
                opened = Git2Reader::open(&self.project_root)?;
                &opened
            }
        };

        if git.is_dirty()? {
            let branch = git.current_branch().ok();
            ui::display_boundary_warning(&BoundaryWarning::DirtyWorkingTree { branch });
        }

        let generated = ManifestGenerator::new(git, self.strategies.as_ref(), self.versions.as_ref())
            .execute(writer)?;
        for warning in &generated.warnings {
            ui::display_boundary_warning(warning);
        }
        Ok(generated)
    }

    /// Read the manifest from `input`, or generate it in memory
    fn load_manifest(&self, input: Option<&Path>) -> Result<Manifest> {
        match input {
            Some(path) => {
                debug!("reading manifest from {}", path.display());
                JsonFileWriter::new(path)
                    .read_manifest()?
                    .ok_or_else(|| ReleaserError::ManifestNotFound(path.to_path_buf()))
            }
            None => {
                debug!("no input manifest, generating one from the working tree");
                let writer = MemoryWriter::new();
                let generated = self.generate(&writer)?;
                Ok(writer.take().unwrap_or(generated.manifest))
            }
        }
    }
}

/// Generate a manifest and write it to the output file or stdout
pub fn create_manifest(deps: &Dependencies, args: &CreateManifestArgs) -> Result<Manifest> {
    let generated = match &args.output {
        Some(path) => {
            let generated = deps.generate(&JsonFileWriter::new(path))?;
            ui::display_success(&format!("Manifest written to {}", path.display()));
            generated
        }
        None => deps.generate(&StdoutWriter)?,
    };
    Ok(generated.manifest)
}

/// List flags of `analyze-manifest`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListMode {
    Tags,
    Images,
    Repositories,
    Platforms,
    Applications,
}

impl ListMode {
    fn flag(self) -> &'static str {
        match self {
            ListMode::Tags => "--list-tags",
            ListMode::Images => "--list-images",
            ListMode::Repositories => "--list-repositories",
            ListMode::Platforms => "--list-platforms",
            ListMode::Applications => "--list-applications",
        }
    }
}

/// Turn the list flags of `analyze-manifest` into a query.
///
/// Returns `None` when no list flag is given.
pub fn build_query(args: &AnalyzeManifestArgs) -> Result<Option<Query>> {
    let flags = [
        (ListMode::Tags, args.list_tags),
        (ListMode::Images, args.list_images),
        (ListMode::Repositories, args.list_repositories),
        (ListMode::Platforms, args.list_platforms),
        (ListMode::Applications, args.list_applications),
    ];
    let selected: Vec<ListMode> = flags
        .iter()
        .filter(|(_, set)| *set)
        .map(|(mode, _)| *mode)
        .collect();

    if let [first, rest @ ..] = selected.as_slice() {
        if !rest.is_empty() {
            let rest: Vec<&str> = rest.iter().map(|mode| mode.flag()).collect();
            return Err(ReleaserError::usage(format!(
                "Cannot combine {} with {}.",
                first.flag(),
                rest.join(" or ")
            )));
        }
    }

    if args.list_platforms {
        if !args.platform.is_empty() {
            return Err(ReleaserError::usage(
                "Cannot combine --list-platforms with --platform.",
            ));
        }
        if args.no_platform {
            return Err(ReleaserError::usage(
                "Cannot combine --list-platforms with --no-platform.",
            ));
        }
    }

    let filters = Filters {
        application: args.app.clone(),
        repository: args.repository.clone(),
        platform: args.platform.clone(),
        manifest_tag: args.manifest_tag.clone(),
    };
    let no_platform = args.no_platform;

    let query = match selected.first() {
        Some(ListMode::Tags) => Query::Tag {
            filters,
            no_platform,
        },
        Some(ListMode::Images) => Query::Image {
            filters,
            no_platform,
        },
        Some(ListMode::Repositories) => Query::Repository(filters),
        Some(ListMode::Platforms) => Query::Platform(filters),
        Some(ListMode::Applications) => Query::Application(filters),
        None => return Ok(None),
    };
    Ok(Some(query))
}

/// Run `analyze-manifest` and return what should be printed on stdout
pub fn analyze_manifest(deps: &Dependencies, args: &AnalyzeManifestArgs) -> Result<String> {
    // Validate flags before doing any work
    let query = build_query(args)?;
    let analyzer = ManifestAnalyzer::new(deps.load_manifest(args.input.as_deref())?);
    match query {
        Some(query) => Ok(serde_json::to_string(&analyzer.execute(&query))?),
        None => analyzer.manifest().to_json(),
    }
}

/// Post the manifest to the webhook
pub fn upload_manifest(deps: &Dependencies, args: &UploadManifestArgs) -> Result<()> {
    let manifest = deps.load_manifest(args.input.as_deref())?;
    ui::display_status(&format!("Uploading manifest to {}", args.webhook_url));
    let result = ManifestNotifier::new(&args.webhook_url, &manifest, deps.webhook.as_ref()).execute();
    if let Err(ReleaserError::WebhookStatus { body, .. }) = &result {
        ui::display_webhook_body(body);
    }
    result?;
    ui::display_success(&format!("Manifest uploaded to {}", args.webhook_url));
    Ok(())
}

/// Build the images of the manifest
pub fn bake_manifest(deps: &Dependencies, args: &BakeManifestArgs) -> Result<BakeSpec> {
    let manifest = deps.load_manifest(args.input.as_deref())?;
    let strategy = deps
        .strategies
        .detect()?
        .ok_or(ReleaserError::StrategyNotFound)?;
    let analyzer = ManifestAnalyzer::new(manifest);

    let buildx;
    let baker: &dyn ImageBaker = match &deps.baker {
        Some(baker) => baker.as_ref(),
        None => {
            buildx = BuildxBaker::new(&args.bake_file, &args.metadata_file)
                .with_push(args.push)
                .with_target(args.name.clone());
            &buildx
        }
    };

    let spec = ManifestBaker::new(&analyzer, &strategy, baker).execute()?;
    ui::display_success(&format!("Baked {} target(s)", spec.target.len()));
    Ok(spec)
}

/// Dispatch a parsed command line
pub fn run(cli: &Cli, deps: &Dependencies) -> Result<()> {
    match &cli.command {
        Commands::CreateManifest(args) => create_manifest(deps, args).map(|_| ()),
        Commands::AnalyzeManifest(args) => {
            println!("{}", analyze_manifest(deps, args)?);
            Ok(())
        }
        Commands::UploadManifest(args) => upload_manifest(deps, args),
        Commands::BakeManifest(args) => bake_manifest(deps, args).map(|_| ()),
    }
}
