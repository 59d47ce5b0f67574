use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::platform::platform_tag;
use crate::error::Result;

/// The generated record of all applications, images and tags to release
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub applications: IndexMap<String, Application>,
}

/// Images produced by one application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Application {
    pub images: Vec<Image>,
}

/// An image produced by a release.
///
/// Without platform variants the tag applies repository-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub repository: String,
    pub image: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub platforms: IndexMap<String, PlatformImage>,
}

/// A platform-specific variant of an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformImage {
    pub image: String,
    pub tag: String,
}

/// True when the filter is empty or contains the value
pub(crate) fn selected(filter: &[String], value: &str) -> bool {
    filter.is_empty() || filter.iter().any(|f| f == value)
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a manifest from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize using compact separators
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Applications whose name passes the filter, in manifest order
    pub fn applications<'a>(
        &'a self,
        names: &'a [String],
    ) -> impl Iterator<Item = (&'a str, &'a Application)> + 'a {
        self.applications
            .iter()
            .filter(move |(name, _)| selected(names, name))
            .map(|(name, app)| (name.as_str(), app))
    }

    /// Images of the selected applications, restricted by repository and manifest tag
    pub fn images<'a>(
        &'a self,
        applications: &'a [String],
        repositories: &'a [String],
        manifest_tags: &'a [String],
    ) -> impl Iterator<Item = &'a Image> + 'a {
        self.applications(applications)
            .flat_map(move |(_, app)| app.images(repositories, manifest_tags))
    }
}

impl Application {
    pub fn new(images: Vec<Image>) -> Self {
        Application { images }
    }

    /// Images restricted by repository and manifest tag
    pub fn images<'a>(
        &'a self,
        repositories: &'a [String],
        manifest_tags: &'a [String],
    ) -> impl Iterator<Item = &'a Image> + 'a {
        self.images.iter().filter(move |image| {
            selected(repositories, &image.repository)
                && (manifest_tags.is_empty()
                    || manifest_tags.iter().any(|t| image.contains_manifest_tag(t)))
        })
    }

    pub fn contains_image_for_any_repository(&self, repositories: &[String]) -> bool {
        self.images
            .iter()
            .any(|image| repositories.iter().any(|r| *r == image.repository))
    }

    pub fn contains_image_for_any_platform(&self, platforms: &[String]) -> bool {
        self.images
            .iter()
            .any(|image| image.contains_image_for_any_platform(platforms))
    }

    pub fn contains_image_for_any_manifest_tag(&self, manifest_tags: &[String]) -> bool {
        self.images
            .iter()
            .any(|image| manifest_tags.iter().any(|t| image.contains_manifest_tag(t)))
    }
}

impl Image {
    /// Build an image for `repository:tag` without platform variants
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        let repository = repository.into();
        let tag = tag.into();
        Image {
            image: format!("{}:{}", repository, tag),
            repository,
            tag,
            platforms: IndexMap::new(),
        }
    }

    /// Register the variant for `platform`, deriving its suffixed tag
    pub fn add_platform(&mut self, platform: &str) -> Result<()> {
        let tag = platform_tag(&self.tag, platform)?;
        self.platforms.insert(
            platform.to_string(),
            PlatformImage {
                image: format!("{}:{}", self.repository, tag),
                tag,
            },
        );
        Ok(())
    }

    pub fn contains_image_for_any_platform(&self, platforms: &[String]) -> bool {
        platforms.iter().any(|p| self.platforms.contains_key(p))
    }

    /// Whether the top-level tag equals `manifest_tag`, regardless of platform variants
    pub fn contains_manifest_tag(&self, manifest_tag: &str) -> bool {
        self.tag == manifest_tag
    }

    /// Platform variants passing the filter, in the image's platform order
    pub fn platform_images<'a>(
        &'a self,
        platforms: &'a [String],
    ) -> impl Iterator<Item = &'a PlatformImage> + 'a {
        self.platforms
            .iter()
            .filter(move |(platform, _)| selected(platforms, platform))
            .map(|(_, image)| image)
    }

    /// Platform identifiers passing the filter
    pub fn platform_names<'a>(
        &'a self,
        platforms: &'a [String],
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.platforms
            .keys()
            .filter(move |platform| selected(platforms, platform))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn multiarch(repository: &str, tag: &str) -> Image {
        let mut image = Image::new(repository, tag);
        image.add_platform("linux/amd64").unwrap();
        image.add_platform("linux/arm64").unwrap();
        image
    }

    #[test]
    fn test_image_reference() {
        let image = Image::new("ghcr.io/org/api", "1.2.3");
        assert_eq!(image.image, "ghcr.io/org/api:1.2.3");
        assert!(image.platforms.is_empty());
    }

    #[test]
    fn test_add_platform() {
        let image = multiarch("api", "edge");
        let arm = &image.platforms["linux/arm64"];
        assert_eq!(arm.tag, "edge-arm64");
        assert_eq!(arm.image, "api:edge-arm64");
    }

    #[test]
    fn test_add_unsupported_platform() {
        let mut image = Image::new("api", "edge");
        assert!(image.add_platform("darwin/arm64").is_err());
    }

    #[test]
    fn test_serialize_compact_without_empty_platforms() {
        let mut manifest = Manifest::new();
        manifest.applications.insert(
            "test-app".to_string(),
            Application::new(vec![Image::new("test-image", "head")]),
        );
        assert_eq!(
            manifest.to_json().unwrap(),
            r#"{"applications":{"test-app":{"images":[{"repository":"test-image","image":"test-image:head","tag":"head"}]}}}"#
        );
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let json = r#"{"applications":{"zeta":{"images":[{"repository":"z","image":"z:1","tag":"1","platforms":{"linux/arm64":{"image":"z:1-arm64","tag":"1-arm64"},"linux/amd64":{"image":"z:1-amd64","tag":"1-amd64"}}}]},"alpha":{"images":[]}}}"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest.to_json().unwrap(), json);
    }

    #[test]
    fn test_manifest_tag_matches_top_level_tag() {
        assert!(Image::new("api", "1.0").contains_manifest_tag("1.0"));
        assert!(multiarch("api", "1.0").contains_manifest_tag("1.0"));
        assert!(!multiarch("api", "1.0").contains_manifest_tag("1.0-amd64"));
    }

    #[test]
    fn test_images_filters() {
        let mut manifest = Manifest::new();
        manifest.applications.insert(
            "api".to_string(),
            Application::new(vec![multiarch("api", "1.0"), multiarch("api", "latest")]),
        );
        manifest.applications.insert(
            "worker".to_string(),
            Application::new(vec![Image::new("worker", "1.0")]),
        );

        let none: Vec<String> = Vec::new();
        assert_eq!(manifest.images(&none, &none, &none).count(), 3);

        let apps = strings(&["api"]);
        let tags = strings(&["latest"]);
        let selected: Vec<&str> = manifest
            .images(&apps, &none, &tags)
            .map(|i| i.image.as_str())
            .collect();
        assert_eq!(selected, vec!["api:latest"]);
    }

    #[test]
    fn test_platform_images_follow_image_order() {
        let image = multiarch("api", "1.0");
        let filter = strings(&["linux/arm64", "linux/amd64"]);
        let tags: Vec<&str> = image.platform_images(&filter).map(|p| p.tag.as_str()).collect();
        assert_eq!(tags, vec!["1.0-amd64", "1.0-arm64"]);
    }
}
