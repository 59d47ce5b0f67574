use serde::Deserialize;

use crate::domain::version::VersionPrecision;
use crate::error::ReleaserError;

/// Default number of SHA characters kept by a git commit SHA tag
pub const DEFAULT_SHA_SIZE: usize = 7;

/// One directive describing how to compute a single tag value
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTagSpec")]
pub enum TagSpec {
    /// A constant tag value
    Literal { value: String },
    /// The HEAD commit SHA truncated to `size` characters
    GitCommitSha { size: usize },
    /// A version read from the project, optionally truncated and wrapped
    Version(VersionTag),
}

/// A tag computed from the project version
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionTag {
    /// Where to read the version from; the project default when absent
    pub file: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub precision: VersionPrecision,
}

impl TagSpec {
    /// Create a literal tag
    pub fn literal(value: impl Into<String>) -> Self {
        TagSpec::Literal {
            value: value.into(),
        }
    }

    /// Create a git commit SHA tag of the given size
    pub fn git_commit_sha(size: usize) -> Self {
        TagSpec::GitCommitSha { size }
    }

    /// Create a version tag
    pub fn version(tag: VersionTag) -> Self {
        TagSpec::Version(tag)
    }

    /// Name of the tag kind as written in strategy files
    pub fn kind(&self) -> &'static str {
        match self {
            TagSpec::Literal { .. } => "literal",
            TagSpec::GitCommitSha { .. } => "git_commit_sha",
            TagSpec::Version(_) => "version",
        }
    }
}

impl VersionTag {
    /// Truncate a version to the configured precision, then add prefix and suffix
    pub fn decorate(&self, version: &str) -> String {
        let truncated = self.precision.apply(version);
        format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or_default(),
            truncated,
            self.suffix.as_deref().unwrap_or_default()
        )
    }
}

/// Tag entry as it appears in a strategy file, before validation
#[derive(Debug, Deserialize)]
struct RawTagSpec {
    #[serde(rename = "type")]
    kind: Option<String>,
    value: Option<String>,
    size: Option<usize>,
    file: Option<String>,
    prefix: Option<String>,
    suffix: Option<String>,
    #[serde(default)]
    major: bool,
    #[serde(default)]
    minor: bool,
}

impl TryFrom<RawTagSpec> for TagSpec {
    type Error = ReleaserError;

    fn try_from(raw: RawTagSpec) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            Some("version") => {
                let precision = VersionPrecision::from_flags(raw.major, raw.minor).ok_or_else(
                    || ReleaserError::config("version tag cannot set both 'major' and 'minor'"),
                )?;
                Ok(TagSpec::Version(VersionTag {
                    file: raw.file,
                    prefix: raw.prefix,
                    suffix: raw.suffix,
                    precision,
                }))
            }
            Some("git_commit_sha") => Ok(TagSpec::GitCommitSha {
                size: raw.size.unwrap_or(DEFAULT_SHA_SIZE),
            }),
            Some("literal") | None => raw
                .value
                .map(|value| TagSpec::Literal { value })
                .ok_or_else(|| ReleaserError::config("literal tag requires a 'value'")),
            Some(other) => Err(ReleaserError::config(format!(
                "unknown tag type '{}'",
                other
            ))),
        }
    }
}
