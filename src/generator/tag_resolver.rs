use tracing::debug;

use crate::domain::tag::{TagSpec, VersionTag};
use crate::error::{ReleaserError, Result};
use crate::git::GitReader;
use crate::version::VersionReader;

/// Turns tag directives into concrete tag strings
pub struct TagResolver<'a> {
    git: &'a dyn GitReader,
    versions: &'a dyn VersionReader,
}

impl<'a> TagResolver<'a> {
    pub fn new(git: &'a dyn GitReader, versions: &'a dyn VersionReader) -> Self {
        TagResolver { git, versions }
    }

    /// Compute the value of a single tag directive
    pub fn resolve(&self, tag: &TagSpec) -> Result<String> {
        let value = match tag {
            TagSpec::Literal { value } => value.clone(),
            TagSpec::GitCommitSha { size } => {
                let sha = self.git.most_recent_commit_sha()?;
                sha.chars().take(*size).collect()
            }
            TagSpec::Version(version_tag) => self.resolve_version(version_tag)?,
        };
        debug!("resolved {} tag to '{}'", tag.kind(), value);
        Ok(value)
    }

    fn resolve_version(&self, tag: &VersionTag) -> Result<String> {
        let hint = tag.file.as_deref();
        match self.versions.read(hint)? {
            Some(version) if !version.trim().is_empty() => Ok(tag.decorate(version.trim())),
            _ => Err(ReleaserError::version_not_found(hint)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::VersionPrecision;
    use crate::git::MockGitReader;
    use crate::version::StaticVersionReader;

    fn version_tag(precision: VersionPrecision) -> TagSpec {
        TagSpec::version(VersionTag {
            precision,
            ..VersionTag::default()
        })
    }

    #[test]
    fn test_literal() {
        let git = MockGitReader::new();
        let versions = StaticVersionReader::new(None);
        let resolver = TagResolver::new(&git, &versions);
        assert_eq!(resolver.resolve(&TagSpec::literal("head")).unwrap(), "head");
    }

    #[test]
    fn test_git_sha_truncated() {
        let git = MockGitReader::new().with_sha("1234567890abcdef");
        let versions = StaticVersionReader::new(None);
        let resolver = TagResolver::new(&git, &versions);
        assert_eq!(
            resolver.resolve(&TagSpec::git_commit_sha(7)).unwrap(),
            "1234567"
        );
    }

    #[test]
    fn test_version_precisions() {
        let git = MockGitReader::new();
        let versions = StaticVersionReader::new(Some("1.2.3"));
        let resolver = TagResolver::new(&git, &versions);
        assert_eq!(resolver.resolve(&version_tag(VersionPrecision::Full)).unwrap(), "1.2.3");
        assert_eq!(resolver.resolve(&version_tag(VersionPrecision::Minor)).unwrap(), "1.2");
        assert_eq!(resolver.resolve(&version_tag(VersionPrecision::Major)).unwrap(), "1");
    }

    #[test]
    fn test_version_prefix_suffix_after_truncation() {
        let git = MockGitReader::new();
        let versions = StaticVersionReader::new(Some("1.2.3"));
        let resolver = TagResolver::new(&git, &versions);
        let tag = TagSpec::version(VersionTag {
            prefix: Some("v".to_string()),
            suffix: Some("-rc".to_string()),
            precision: VersionPrecision::Minor,
            ..VersionTag::default()
        });
        assert_eq!(resolver.resolve(&tag).unwrap(), "v1.2-rc");
    }

    #[test]
    fn test_version_file_hint_forwarded() {
        let git = MockGitReader::new();
        let versions = StaticVersionReader::new(Some("0.1.0"));
        let resolver = TagResolver::new(&git, &versions);
        let tag = TagSpec::version(VersionTag {
            file: Some("web/package.json".to_string()),
            ..VersionTag::default()
        });
        resolver.resolve(&tag).unwrap();
        assert!(versions.did_read(Some("web/package.json")));
    }

    #[test]
    fn test_missing_version_fails() {
        let git = MockGitReader::new();
        let versions = StaticVersionReader::new(None);
        let resolver = TagResolver::new(&git, &versions);
        let err = resolver
            .resolve(&version_tag(VersionPrecision::Full))
            .unwrap_err();
        assert!(matches!(err, ReleaserError::VersionNotFound { source_hint: None }));
    }

    #[test]
    fn test_empty_version_fails() {
        let git = MockGitReader::new();
        let versions = StaticVersionReader::new(Some(""));
        let resolver = TagResolver::new(&git, &versions);
        assert!(resolver.resolve(&version_tag(VersionPrecision::Full)).is_err());
    }
}
