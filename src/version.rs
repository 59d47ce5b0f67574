use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{ReleaserError, Result};

const PYPROJECT: &str = "pyproject.toml";
const PACKAGE_JSON: &str = "package.json";
const CARGO_TOML: &str = "Cargo.toml";

/// Source of project version strings
pub trait VersionReader {
    /// Read the version from `source_hint`, or from the project default
    /// sources when no hint is given. A missing source yields `None`.
    fn read(&self, source_hint: Option<&str>) -> Result<Option<String>>;
}

/// Reads versions from the usual project manifests under a root directory.
///
/// Supported sources:
/// - `*.json` files: top-level `"version"` key
/// - `pyproject.toml`: `tool.poetry.version`, then `project.version`
/// - `Cargo.toml`: `package.version`
/// - any other file: first non-empty line
pub struct AutoVersionReader {
    project_root: PathBuf,
}

impl AutoVersionReader {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        AutoVersionReader {
            project_root: project_root.into(),
        }
    }

    /// Absolute hints (after `~` expansion) are used as is, relative ones
    /// are resolved against the project root
    fn resolve_hint(&self, hint: &str) -> PathBuf {
        let expanded = expand_home(hint);
        if expanded.is_absolute() {
            expanded
        } else {
            self.project_root.join(expanded)
        }
    }
}

impl VersionReader for AutoVersionReader {
    fn read(&self, source_hint: Option<&str>) -> Result<Option<String>> {
        if let Some(hint) = source_hint {
            let path = self.resolve_hint(hint);
            if !path.is_file() {
                debug!("version source {} does not exist", path.display());
                return Ok(None);
            }
            return read_version_file(&path);
        }

        for name in [PYPROJECT, PACKAGE_JSON, CARGO_TOML] {
            let path = self.project_root.join(name);
            if path.is_file() {
                return read_version_file(&path);
            }
        }
        Ok(None)
    }
}

/// Replace a leading `~` with the user's home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}

fn read_version_file(path: &Path) -> Result<Option<String>> {
    debug!("reading version from {}", path.display());
    let content = fs::read_to_string(path)?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    if path.extension().is_some_and(|ext| ext == "json") {
        let document: Value = serde_json::from_str(&content)?;
        return Ok(document
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string));
    }

    match file_name {
        PYPROJECT => {
            let document: toml::Table = toml::from_str(&content)?;
            let poetry = toml_str(&document, &["tool", "poetry", "version"]);
            Ok(poetry.or_else(|| toml_str(&document, &["project", "version"])))
        }
        CARGO_TOML => {
            let document: toml::Table = toml::from_str(&content)?;
            match toml_str(&document, &["package", "version"]) {
                Some(version) => {
                    semver::Version::parse(&version).map_err(|e| {
                        ReleaserError::config(format!(
                            "invalid version '{}' in {}: {}",
                            version,
                            path.display(),
                            e
                        ))
                    })?;
                    Ok(Some(version))
                }
                None => Ok(None),
            }
        }
        _ => Ok(content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)),
    }
}

/// Follow a dotted key path through a TOML table
fn toml_str(table: &toml::Table, keys: &[&str]) -> Option<String> {
    let (last, parents) = keys.split_last()?;
    let mut current = table;
    for key in parents {
        current = current.get(*key)?.as_table()?;
    }
    current.get(*last)?.as_str().map(str::to_string)
}

/// Version reader returning a fixed value and recording the hints it was given
#[derive(Debug, Default)]
pub struct StaticVersionReader {
    version: Option<String>,
    hints: RefCell<Vec<Option<String>>>,
}

impl StaticVersionReader {
    pub fn new(version: Option<&str>) -> Self {
        StaticVersionReader {
            version: version.map(str::to_string),
            hints: RefCell::new(Vec::new()),
        }
    }

    /// Whether `read` was called with this hint
    pub fn did_read(&self, hint: Option<&str>) -> bool {
        self.hints
            .borrow()
            .iter()
            .any(|h| h.as_deref() == hint)
    }
}

impl VersionReader for StaticVersionReader {
    fn read(&self, source_hint: Option<&str>) -> Result<Option<String>> {
        self.hints
            .borrow_mut()
            .push(source_hint.map(str::to_string));
        Ok(self.version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_read_package_json_hint() {
        let dir = project(&[("package.json", r#"{"name":"web","version":"2.1.0"}"#)]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(
            reader.read(Some("package.json")).unwrap(),
            Some("2.1.0".to_string())
        );
    }

    #[test]
    fn test_read_poetry_version() {
        let dir = project(&[(
            "pyproject.toml",
            "[tool.poetry]\nname = \"api\"\nversion = \"0.4.2\"\n",
        )]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(reader.read(None).unwrap(), Some("0.4.2".to_string()));
    }

    #[test]
    fn test_read_pep621_version() {
        let dir = project(&[("pyproject.toml", "[project]\nversion = \"1.0.0\"\n")]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(reader.read(None).unwrap(), Some("1.0.0".to_string()));
    }

    #[test]
    fn test_read_cargo_version() {
        let dir = project(&[(
            "Cargo.toml",
            "[package]\nname = \"svc\"\nversion = \"3.2.1\"\n",
        )]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(reader.read(None).unwrap(), Some("3.2.1".to_string()));
    }

    #[test]
    fn test_invalid_cargo_version_rejected() {
        let dir = project(&[("Cargo.toml", "[package]\nversion = \"banana\"\n")]);
        let reader = AutoVersionReader::new(dir.path());
        assert!(reader.read(Some("Cargo.toml")).is_err());
    }

    #[test]
    fn test_plain_version_file() {
        let dir = project(&[("VERSION", "\n  5.0.1  \n")]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(reader.read(Some("VERSION")).unwrap(), Some("5.0.1".to_string()));
    }

    #[test]
    fn test_pyproject_takes_precedence_over_package_json() {
        let dir = project(&[
            ("pyproject.toml", "[tool.poetry]\nversion = \"1.0.0\"\n"),
            ("package.json", r#"{"version":"9.9.9"}"#),
        ]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(reader.read(None).unwrap(), Some("1.0.0".to_string()));
    }

    #[test]
    fn test_missing_sources_are_absent() {
        let dir = project(&[]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(reader.read(None).unwrap(), None);
        assert_eq!(reader.read(Some("missing.json")).unwrap(), None);
    }

    #[test]
    fn test_json_without_version_is_absent() {
        let dir = project(&[("package.json", r#"{"name":"web"}"#)]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(reader.read(None).unwrap(), None);
    }

    #[test]
    fn test_absolute_hint_outside_project() {
        let versions = project(&[("release.json", r#"{"version":"7.0.0"}"#)]);
        let root = project(&[]);
        let reader = AutoVersionReader::new(root.path());
        let hint = versions.path().join("release.json");
        assert_eq!(
            reader.read(hint.to_str()).unwrap(),
            Some("7.0.0".to_string())
        );
    }

    #[test]
    fn test_relative_hint_ignores_current_directory() {
        // The crate's own Cargo.toml sits in the test process directory
        let dir = project(&[(
            "Cargo.toml",
            "[package]\nname = \"svc\"\nversion = \"42.0.7\"\n",
        )]);
        let reader = AutoVersionReader::new(dir.path());
        assert_eq!(
            reader.read(Some("Cargo.toml")).unwrap(),
            Some("42.0.7".to_string())
        );

        let empty = project(&[]);
        let reader = AutoVersionReader::new(empty.path());
        assert_eq!(reader.read(Some("Cargo.toml")).unwrap(), None);
    }

    #[test]
    fn test_static_reader_records_hints() {
        let reader = StaticVersionReader::new(Some("1.2.3"));
        assert_eq!(reader.read(Some("package.json")).unwrap(), Some("1.2.3".to_string()));
        assert!(reader.did_read(Some("package.json")));
        assert!(!reader.did_read(None));
    }
}
