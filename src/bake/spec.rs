use indexmap::IndexMap;
use serde::Serialize;

use crate::analyzer::{Filters, ManifestAnalyzer, Query};
use crate::domain::platform::platform_suffix;
use crate::domain::strategy::{ReleaseStrategy, StrategyImage};
use crate::error::{ReleaserError, Result};

/// Name of the group referencing every generated target
pub const DEFAULT_GROUP: &str = "default";

/// Build specification handed to an image builder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BakeSpec {
    pub group: Vec<BakeGroup>,
    pub target: Vec<BakeTarget>,
}

/// A named set of targets built together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeGroup {
    pub name: String,
    pub targets: Vec<String>,
}

/// One image build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeTarget {
    pub name: String,
    pub context: String,
    pub dockerfile: String,
    pub tags: Vec<String>,
    pub args: IndexMap<String, String>,
    pub labels: IndexMap<String, String>,
    pub pull: bool,
    pub platforms: Vec<String>,
}

#[derive(Serialize)]
struct BakeFile<'a> {
    target: IndexMap<&'a str, BakeFileTarget<'a>>,
    group: IndexMap<&'a str, BakeFileGroup<'a>>,
}

#[derive(Serialize)]
struct BakeFileTarget<'a> {
    context: &'a str,
    dockerfile: &'a str,
    args: &'a IndexMap<String, String>,
    labels: &'a IndexMap<String, String>,
    tags: &'a [String],
    pull: bool,
    platforms: &'a [String],
}

#[derive(Serialize)]
struct BakeFileGroup<'a> {
    targets: &'a [String],
}

impl BakeSpec {
    /// Target names in declaration order
    pub fn target_names(&self) -> Vec<&str> {
        self.target.iter().map(|t| t.name.as_str()).collect()
    }

    /// Render the compact JSON bake file understood by `docker buildx bake`
    pub fn to_bake_file(&self) -> Result<String> {
        let file = BakeFile {
            target: self
                .target
                .iter()
                .map(|t| {
                    (
                        t.name.as_str(),
                        BakeFileTarget {
                            context: &t.context,
                            dockerfile: &t.dockerfile,
                            args: &t.args,
                            labels: &t.labels,
                            tags: &t.tags,
                            pull: t.pull,
                            platforms: &t.platforms,
                        },
                    )
                })
                .collect(),
            group: self
                .group
                .iter()
                .map(|g| (g.name.as_str(), BakeFileGroup { targets: &g.targets }))
                .collect(),
        };
        Ok(serde_json::to_string(&file)?)
    }
}

/// Translates a manifest and its strategy into build targets
pub struct BakeSpecBuilder<'a> {
    analyzer: &'a ManifestAnalyzer,
    strategy: &'a ReleaseStrategy,
}

impl<'a> BakeSpecBuilder<'a> {
    pub fn new(analyzer: &'a ManifestAnalyzer, strategy: &'a ReleaseStrategy) -> Self {
        BakeSpecBuilder { analyzer, strategy }
    }

    /// Build one target per platform-less image and one per declared platform.
    ///
    /// Every application of the manifest must exist in the strategy; strategy
    /// images that do not appear in the manifest are skipped. Two images
    /// producing the same target name are rejected.
    pub fn build(&self) -> Result<BakeSpec> {
        let mut spec = BakeSpec::default();
        // target name -> repository producing it
        let mut producers: IndexMap<String, &str> = IndexMap::new();

        for name in self.analyzer.manifest().applications.keys() {
            let app = self.strategy.application(name)?;
            for image in &app.images {
                let in_manifest = self.analyzer.manifest().applications[name]
                    .images
                    .iter()
                    .any(|i| i.repository == image.repository);
                if !in_manifest {
                    continue;
                }

                let filters = Filters::new()
                    .application([name.as_str()])
                    .repository([image.repository.as_str()]);

                if image.platforms.is_empty() {
                    let tags = self.analyzer.execute(&Query::Image {
                        filters,
                        no_platform: true,
                    });
                    claim(&mut producers, image.basename(), &image.repository)?;
                    spec.target.push(target(image.basename(), image, tags, Vec::new()));
                    continue;
                }

                for platform in &image.platforms {
                    let tags = self.analyzer.execute(&Query::Image {
                        filters: filters.clone().platform([platform.as_str()]),
                        no_platform: false,
                    });
                    let target_name =
                        format!("{}{}", image.basename(), platform_suffix(platform)?);
                    claim(&mut producers, &target_name, &image.repository)?;
                    spec.target
                        .push(target(&target_name, image, tags, vec![platform.clone()]));
                }
            }
        }

        spec.group.push(BakeGroup {
            name: DEFAULT_GROUP.to_string(),
            targets: spec.target.iter().map(|t| t.name.clone()).collect(),
        });
        Ok(spec)
    }
}

fn claim<'r>(
    producers: &mut IndexMap<String, &'r str>,
    name: &str,
    repository: &'r str,
) -> Result<()> {
    if let Some(first) = producers.get(name) {
        return Err(ReleaserError::config(format!(
            "bake target '{}' is produced by both {} and {}",
            name, first, repository
        )));
    }
    producers.insert(name.to_string(), repository);
    Ok(())
}

fn target(
    name: &str,
    image: &StrategyImage,
    tags: Vec<String>,
    platforms: Vec<String>,
) -> BakeTarget {
    BakeTarget {
        name: name.to_string(),
        context: image.context().to_string(),
        dockerfile: image.dockerfile().to_string(),
        tags,
        args: IndexMap::new(),
        labels: IndexMap::new(),
        pull: true,
        platforms,
    }
}
