use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::domain::strategy::ReleaseStrategy;
use crate::error::{ReleaserError, Result};

/// Dedicated strategy file, the whole document is the strategy
pub const RELEASER_TOML: &str = "releaser.toml";

const PYPROJECT: &str = "pyproject.toml";
const PACKAGE_JSON: &str = "package.json";
const CARGO_TOML: &str = "Cargo.toml";

/// Key paths of the strategy section embedded in project manifests
const PYPROJECT_SECTION: &[&str] = &["tool", "quara", "releaser"];
const PACKAGE_JSON_SECTION: &[&str] = &["quara", "releaser"];
const CARGO_SECTION: &[&str] = &["package", "metadata", "releaser"];

/// Source of the release strategy
pub trait StrategyReader {
    /// Load the strategy, `None` when the source declares none
    fn detect(&self) -> Result<Option<ReleaseStrategy>>;
}

/// Reads the strategy from an explicitly given file.
///
/// JSON files hold the strategy as their whole document. TOML files may
/// either be a dedicated strategy file or a project manifest embedding the
/// strategy in one of the known sections.
pub struct FileStrategyReader {
    path: PathBuf,
}

impl FileStrategyReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStrategyReader { path: path.into() }
    }
}

impl StrategyReader for FileStrategyReader {
    fn detect(&self) -> Result<Option<ReleaseStrategy>> {
        if !self.path.is_file() {
            return Err(ReleaserError::config(format!(
                "strategy file {} does not exist",
                self.path.display()
            )));
        }

        let document = load_document(&self.path)?;
        let is_toml = self.path.extension().is_some_and(|ext| ext == "toml");
        let section = if is_toml {
            [PYPROJECT_SECTION, CARGO_SECTION]
                .iter()
                .find_map(|keys| section(&document, keys))
                .unwrap_or(document)
        } else {
            document
        };
        parse_section(Some(section), &self.path)
    }
}

/// Probes the project root for a strategy, first hit wins:
/// `releaser.toml`, `pyproject.toml`, `package.json`, `Cargo.toml`.
pub struct AutoStrategyReader {
    project_root: PathBuf,
}

impl AutoStrategyReader {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        AutoStrategyReader {
            project_root: project_root.into(),
        }
    }
}

impl StrategyReader for AutoStrategyReader {
    fn detect(&self) -> Result<Option<ReleaseStrategy>> {
        let candidates: [(&str, Option<&[&str]>); 4] = [
            (RELEASER_TOML, None),
            (PYPROJECT, Some(PYPROJECT_SECTION)),
            (PACKAGE_JSON, Some(PACKAGE_JSON_SECTION)),
            (CARGO_TOML, Some(CARGO_SECTION)),
        ];

        for (name, keys) in candidates {
            let path = self.project_root.join(name);
            if !path.is_file() {
                continue;
            }
            debug!("looking for release strategy in {}", path.display());
            let document = load_document(&path)?;
            let found = match keys {
                Some(keys) => section(&document, keys),
                None => Some(document),
            };
            if let Some(strategy) = parse_section(found, &path)? {
                return Ok(Some(strategy));
            }
        }
        Ok(None)
    }
}

/// Strategy reader returning a fixed strategy
#[derive(Debug, Clone, Default)]
pub struct StaticStrategyReader {
    strategy: Option<ReleaseStrategy>,
}

impl StaticStrategyReader {
    pub fn new(strategy: Option<ReleaseStrategy>) -> Self {
        StaticStrategyReader { strategy }
    }
}

impl StrategyReader for StaticStrategyReader {
    fn detect(&self) -> Result<Option<ReleaseStrategy>> {
        Ok(self.strategy.clone())
    }
}

/// Load a JSON or TOML file as a JSON value
fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&content)?)
    } else {
        let table: toml::Table = toml::from_str(&content)?;
        Ok(serde_json::to_value(table)?)
    }
}

fn section(document: &Value, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .try_fold(document, |current, key| current.get(*key))
        .cloned()
}

/// Parse a strategy section; missing or empty sections declare nothing
fn parse_section(section: Option<Value>, path: &Path) -> Result<Option<ReleaseStrategy>> {
    let section = match section {
        Some(Value::Null) | None => return Ok(None),
        Some(Value::Object(map)) if map.is_empty() => return Ok(None),
        Some(section) => section,
    };
    let strategy = ReleaseStrategy::from_value(section).map_err(|e| match e {
        ReleaserError::Config(msg) => {
            ReleaserError::config(format!("{} ({})", msg, path.display()))
        }
        other => other,
    })?;
    debug!(
        "loaded release strategy with {} application(s) from {}",
        strategy.applications.len(),
        path.display()
    );
    Ok(Some(strategy))
}
