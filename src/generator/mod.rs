//! Manifest generation: rule evaluation and tag resolution

pub mod manifest_generator;
pub mod tag_resolver;

pub use manifest_generator::{GeneratedManifest, ManifestGenerator};
pub use tag_resolver::TagResolver;
