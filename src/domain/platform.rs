use crate::error::{ReleaserError, Result};

/// Platforms that can receive a per-platform image variant, with their tag suffix
const SUPPORTED_PLATFORMS: [(&str, &str); 4] = [
    ("linux/amd64", "-amd64"),
    ("linux/arm64", "-arm64"),
    ("linux/arm/v7", "-armv7"),
    ("linux/arm/v6", "-armv6"),
];

/// Return the tag suffix used for a platform identifier (e.g. "linux/arm/v7" -> "-armv7")
pub fn platform_suffix(platform: &str) -> Result<&'static str> {
    SUPPORTED_PLATFORMS
        .iter()
        .find(|(name, _)| *name == platform)
        .map(|(_, suffix)| *suffix)
        .ok_or_else(|| ReleaserError::UnsupportedPlatform(platform.to_string()))
}

/// Append the platform suffix to a manifest tag
pub fn platform_tag(tag: &str, platform: &str) -> Result<String> {
    Ok(format!("{}{}", tag, platform_suffix(platform)?))
}
