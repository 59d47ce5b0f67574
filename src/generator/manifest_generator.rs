use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::config::StrategyReader;
use crate::domain::manifest::{Application, Image, Manifest};
use crate::domain::rule::Rule;
use crate::domain::strategy::{ApplicationStrategy, ReleaseStrategy};
use crate::error::{ReleaserError, Result};
use crate::generator::tag_resolver::TagResolver;
use crate::git::GitReader;
use crate::store::ManifestWriter;
use crate::version::VersionReader;

/// A generated manifest together with the warnings raised while building it
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedManifest {
    pub manifest: Manifest,
    pub warnings: Vec<BoundaryWarning>,
}

/// Builds release manifests from a strategy and the repository state
pub struct ManifestGenerator<'a> {
    git: &'a dyn GitReader,
    strategies: &'a dyn StrategyReader,
    versions: &'a dyn VersionReader,
}

impl<'a> ManifestGenerator<'a> {
    pub fn new(
        git: &'a dyn GitReader,
        strategies: &'a dyn StrategyReader,
        versions: &'a dyn VersionReader,
    ) -> Self {
        ManifestGenerator {
            git,
            strategies,
            versions,
        }
    }

    /// Detect the strategy, generate the manifest and hand it to `writer`
    pub fn execute(&self, writer: &dyn ManifestWriter) -> Result<GeneratedManifest> {
        let generated = self.generate()?;
        writer.write_manifest(&generated.manifest)?;
        Ok(generated)
    }

    /// Detect the strategy and generate the manifest without writing it
    pub fn generate(&self) -> Result<GeneratedManifest> {
        let strategy = self
            .strategies
            .detect()?
            .ok_or(ReleaserError::StrategyNotFound)?;
        self.generate_for(&strategy)
    }

    /// Generate the manifest for an already loaded strategy.
    ///
    /// Applications that produce no tag are left out of the manifest.
    pub fn generate_for(&self, strategy: &ReleaseStrategy) -> Result<GeneratedManifest> {
        let mut warnings = Vec::new();
        let mut manifest = Manifest::new();

        for (name, app) in &strategy.applications {
            if app.images.is_empty() {
                warnings.push(BoundaryWarning::NoImagesDeclared {
                    application: name.clone(),
                });
                continue;
            }

            let rules = strategy.effective_rules(name)?;
            if rules.is_empty() {
                warnings.push(BoundaryWarning::NoRulesDeclared {
                    application: name.clone(),
                });
                continue;
            }

            let tags = self.application_tags(rules, &mut warnings)?;
            if tags.is_empty() {
                debug!("application '{}' produced no tag, omitted", name);
                continue;
            }

            let images = build_images(app, &tags)?;
            info!(
                "application '{}': {} image(s) with tags {:?}",
                name,
                images.len(),
                tags
            );
            manifest
                .applications
                .insert(name.clone(), Application::new(images));
        }

        for warning in &warnings {
            debug!("{}", warning);
        }
        Ok(GeneratedManifest { manifest, warnings })
    }

    /// Evaluate rules in order and collect the tags of every matching rule
    fn application_tags(
        &self,
        rules: &[Rule],
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Vec<String>> {
        let resolver = TagResolver::new(self.git, self.versions);
        let mut tags = Vec::new();

        for rule in rules {
            let filter = rule.filter_regex()?;
            let subject = self.git.last_commit_message(rule.depth, filter.as_ref())?;
            let subject = match subject {
                Some(subject) if subject.is_empty() => {
                    warnings.push(BoundaryWarning::EmptyCommitSubject { depth: rule.depth });
                    continue;
                }
                Some(subject) => subject,
                None => {
                    warnings.push(match &rule.filter {
                        Some(filter) => BoundaryWarning::FilterMatchedNothing {
                            filter: filter.clone(),
                            depth: rule.depth,
                        },
                        None => BoundaryWarning::EmptyCommitHistory { depth: rule.depth },
                    });
                    continue;
                }
            };

            if !rule.matches(&subject)? {
                debug!("'{}' does not match {:?}", subject, rule.patterns);
                continue;
            }

            debug!("'{}' matches {:?}", subject, rule.patterns);
            for tag in &rule.tags {
                tags.push(resolver.resolve(tag)?);
            }
        }
        Ok(tags)
    }
}

/// Cartesian product of declared images and tags, image-major
fn build_images(app: &ApplicationStrategy, tags: &[String]) -> Result<Vec<Image>> {
    let mut images = Vec::with_capacity(app.images.len() * tags.len());
    for declared in &app.images {
        for tag in tags {
            let mut image = Image::new(declared.repository.as_str(), tag.as_str());
            for platform in &declared.platforms {
                image.add_platform(platform)?;
            }
            images.push(image);
        }
    }
    Ok(images)
}
