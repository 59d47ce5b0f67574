//! Query engine over generated manifests

pub mod manifest_analyzer;
pub mod query;

pub use manifest_analyzer::ManifestAnalyzer;
pub use query::{Filters, Query};
