use indexmap::IndexSet;
use tracing::debug;

use crate::analyzer::query::{Filters, Query};
use crate::domain::manifest::{Image, Manifest};

/// Answers queries over an already generated manifest
#[derive(Debug, Clone)]
pub struct ManifestAnalyzer {
    manifest: Manifest,
}

impl ManifestAnalyzer {
    pub fn new(manifest: Manifest) -> Self {
        ManifestAnalyzer { manifest }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Evaluate a query; results are deduplicated in first-seen order
    pub fn execute(&self, query: &Query) -> Vec<String> {
        debug!("executing {:?}", query);
        let results = match query {
            Query::Application(filters) => self.applications(filters),
            Query::Repository(filters) => self.repositories(filters),
            Query::Image {
                filters,
                no_platform,
            } => self.images(filters, *no_platform),
            Query::Tag {
                filters,
                no_platform,
            } => self.tags(filters, *no_platform),
            Query::Platform(filters) => self.platforms(filters),
        };
        results.into_iter().collect()
    }

    fn applications(&self, filters: &Filters) -> IndexSet<String> {
        self.manifest
            .applications(&filters.application)
            .filter(|(_, app)| {
                (filters.repository.is_empty()
                    || app.contains_image_for_any_repository(&filters.repository))
                    && (filters.platform.is_empty()
                        || app.contains_image_for_any_platform(&filters.platform))
                    && (filters.manifest_tag.is_empty()
                        || app.contains_image_for_any_manifest_tag(&filters.manifest_tag))
            })
            .map(|(name, _)| name.to_string())
            .collect()
    }

    fn repositories(&self, filters: &Filters) -> IndexSet<String> {
        self.matching_images(filters)
            .filter(|image| {
                filters.platform.is_empty() || image.contains_image_for_any_platform(&filters.platform)
            })
            .map(|image| image.repository.clone())
            .collect()
    }

    fn images(&self, filters: &Filters, no_platform: bool) -> IndexSet<String> {
        let mut images = IndexSet::new();
        for image in self.matching_images(filters) {
            if no_platform || wants_top_level(filters, image) {
                images.insert(image.image.clone());
            } else {
                images.extend(
                    image
                        .platform_images(&filters.platform)
                        .map(|p| p.image.clone()),
                );
            }
        }
        images
    }

    /// Top-level tags, plus platform tags unless `no_platform` is set
    fn tags(&self, filters: &Filters, no_platform: bool) -> IndexSet<String> {
        let mut tags = IndexSet::new();
        for image in self.matching_images(filters) {
            if no_platform || wants_top_level(filters, image) {
                tags.insert(image.tag.clone());
            }
            if !no_platform {
                tags.extend(image.platform_images(&filters.platform).map(|p| p.tag.clone()));
            }
        }
        tags
    }

    fn platforms(&self, filters: &Filters) -> IndexSet<String> {
        self.matching_images(filters)
            .flat_map(|image| image.platform_names(&filters.platform))
            .map(str::to_string)
            .collect()
    }

    fn matching_images<'a>(&'a self, filters: &'a Filters) -> impl Iterator<Item = &'a Image> + 'a {
        self.manifest.images(
            &filters.application,
            &filters.repository,
            &filters.manifest_tag,
        )
    }
}

/// Whether an image is reported by its top-level reference.
///
/// This is the case when nothing narrows the selection to platform
/// variants, or when a manifest-tag filter selected an image that has no
/// platform variant to report instead.
fn wants_top_level(filters: &Filters, image: &Image) -> bool {
    filters.platform.is_empty() && (filters.manifest_tag.is_empty() || image.platforms.is_empty())
}
