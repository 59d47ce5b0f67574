use std::fmt;

/// How much of a version string a version tag keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPrecision {
    /// Keep the version as read
    #[default]
    Full,
    /// Keep only the first dot-delimited segment ("1.2.3" -> "1")
    Major,
    /// Keep the first two dot-delimited segments ("1.2.3" -> "1.2")
    Minor,
}

impl VersionPrecision {
    /// Build a precision from the `major` / `minor` flags of a version tag.
    ///
    /// Returns `None` when both flags are set, since the two are exclusive.
    pub fn from_flags(major: bool, minor: bool) -> Option<Self> {
        match (major, minor) {
            (true, true) => None,
            (true, false) => Some(VersionPrecision::Major),
            (false, true) => Some(VersionPrecision::Minor),
            (false, false) => Some(VersionPrecision::Full),
        }
    }

    /// Truncate a version string to this precision.
    ///
    /// Versions are split on '.' without further validation, so
    /// non-semver strings such as "2024.05" or "1.2.3rc1" are accepted.
    pub fn apply(&self, version: &str) -> String {
        let parts: Vec<&str> = version.split('.').collect();
        match self {
            VersionPrecision::Full => version.to_string(),
            VersionPrecision::Major => parts[0].to_string(),
            VersionPrecision::Minor => parts.iter().take(2).copied().collect::<Vec<_>>().join("."),
        }
    }
}

impl fmt::Display for VersionPrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionPrecision::Full => write!(f, "full"),
            VersionPrecision::Major => write!(f, "major"),
            VersionPrecision::Minor => write!(f, "minor"),
        }
    }
}
