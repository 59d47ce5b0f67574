//! Domain model: release strategies, rules, tag specs and manifests

pub mod manifest;
pub mod platform;
pub mod rule;
pub mod strategy;
pub mod tag;
pub mod version;

pub use manifest::{Application, Image, Manifest, PlatformImage};
pub use platform::{platform_suffix, platform_tag};
pub use rule::Rule;
pub use strategy::{ApplicationStrategy, ReleaseStrategy, StrategyImage};
pub use tag::{TagSpec, VersionTag};
pub use version::VersionPrecision;

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// Accept either a single value or a list of values
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}
