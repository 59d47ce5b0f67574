//! Image baking: bake spec construction and the buildx backend

pub mod buildx;
pub mod spec;

pub use buildx::{BuildxBaker, DEFAULT_BAKE_FILE, DEFAULT_METADATA_FILE};
pub use spec::{BakeGroup, BakeSpec, BakeSpecBuilder, BakeTarget};

use crate::analyzer::ManifestAnalyzer;
use crate::domain::strategy::ReleaseStrategy;
use crate::error::Result;

/// Runs an external image builder on a bake spec
pub trait ImageBaker {
    fn bake(&self, spec: &BakeSpec) -> Result<()>;
}

/// Builds the images of a manifest
pub struct ManifestBaker<'a> {
    analyzer: &'a ManifestAnalyzer,
    strategy: &'a ReleaseStrategy,
    baker: &'a dyn ImageBaker,
}

impl<'a> ManifestBaker<'a> {
    pub fn new(
        analyzer: &'a ManifestAnalyzer,
        strategy: &'a ReleaseStrategy,
        baker: &'a dyn ImageBaker,
    ) -> Self {
        ManifestBaker {
            analyzer,
            strategy,
            baker,
        }
    }

    /// Build the bake spec and hand it to the image builder
    pub fn execute(&self) -> Result<BakeSpec> {
        let spec = BakeSpecBuilder::new(self.analyzer, self.strategy).build()?;
        self.baker.bake(&spec)?;
        Ok(spec)
    }
}
