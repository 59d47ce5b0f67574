use indexmap::IndexMap;
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::rule::Rule;
use crate::error::{ReleaserError, Result};

/// Dockerfile used when a strategy image declares none
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Build context used when a strategy image declares none
pub const DEFAULT_CONTEXT: &str = ".";

/// Declarative release strategy of a repository.
///
/// Maps application names to their strategy, plus an optional list of
/// repository-wide rules used by applications that declare none.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReleaseStrategy {
    #[serde(default)]
    pub applications: IndexMap<String, ApplicationStrategy>,

    #[serde(default, alias = "on_commit_msg", deserialize_with = "rule_set")]
    pub on: Vec<Rule>,
}

/// Release strategy of a single application
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ApplicationStrategy {
    #[serde(default)]
    pub images: Vec<StrategyImage>,

    #[serde(default, alias = "on", deserialize_with = "rule_set")]
    pub on_commit_msg: Vec<Rule>,
}

/// An image declared in a release strategy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawStrategyImage")]
pub struct StrategyImage {
    pub repository: String,
    pub platforms: Vec<String>,
    pub dockerfile: Option<String>,
    pub context: Option<String>,
}

impl ReleaseStrategy {
    /// Create an empty strategy
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an application
    pub fn with_application(mut self, name: impl Into<String>, app: ApplicationStrategy) -> Self {
        self.applications.insert(name.into(), app);
        self
    }

    /// Set the repository-wide default rules
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.on = rules;
        self
    }

    /// Parse and validate a strategy from a JSON value.
    ///
    /// TOML sources are converted to JSON values first so both formats
    /// share the same normalisation.
    pub fn from_value(value: Value) -> Result<Self> {
        let strategy: ReleaseStrategy = serde_json::from_value(value)
            .map_err(|e| ReleaserError::config(format!("invalid release strategy: {}", e)))?;
        strategy.validate()?;
        Ok(strategy)
    }

    /// Look up an application by name
    pub fn application(&self, name: &str) -> Result<&ApplicationStrategy> {
        self.applications
            .get(name)
            .ok_or_else(|| ReleaserError::ApplicationNotFound(name.to_string()))
    }

    /// Rules that apply to an application: its own when it declares any,
    /// otherwise the repository-wide defaults.
    pub fn effective_rules(&self, name: &str) -> Result<&[Rule]> {
        let app = self.application(name)?;
        if app.on_commit_msg.is_empty() {
            Ok(&self.on)
        } else {
            Ok(&app.on_commit_msg)
        }
    }

    /// Check structural constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        let global = self.on.iter().map(|rule| ("<default>", rule));
        let per_app = self
            .applications
            .iter()
            .flat_map(|(name, app)| app.on_commit_msg.iter().map(move |rule| (name.as_str(), rule)));

        for (owner, rule) in global.chain(per_app) {
            if rule.patterns.is_empty() {
                return Err(ReleaserError::config(format!(
                    "rule of application '{}' declares no match pattern",
                    owner
                )));
            }
        }

        for (name, app) in &self.applications {
            if let Some(image) = app.images.iter().find(|i| i.repository.trim().is_empty()) {
                return Err(ReleaserError::config(format!(
                    "application '{}' declares an image without repository ({:?})",
                    name, image
                )));
            }
        }
        Ok(())
    }
}

impl ApplicationStrategy {
    /// Create an application strategy producing the given images
    pub fn new(images: Vec<StrategyImage>) -> Self {
        ApplicationStrategy {
            images,
            on_commit_msg: Vec::new(),
        }
    }

    /// Set the application's own rules
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.on_commit_msg = rules;
        self
    }
}

impl StrategyImage {
    /// Create an image for a repository without platform variants
    pub fn new(repository: impl Into<String>) -> Self {
        StrategyImage {
            repository: repository.into(),
            platforms: Vec::new(),
            dockerfile: None,
            context: None,
        }
    }

    /// Declare the target platforms of the image
    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    /// Dockerfile path, defaulting to `Dockerfile`
    pub fn dockerfile(&self) -> &str {
        self.dockerfile.as_deref().unwrap_or(DEFAULT_DOCKERFILE)
    }

    /// Build context path, defaulting to `.`
    pub fn context(&self) -> &str {
        self.context.as_deref().unwrap_or(DEFAULT_CONTEXT)
    }

    /// Last path segment of the repository ("ghcr.io/org/api" -> "api")
    pub fn basename(&self) -> &str {
        self.repository
            .rsplit('/')
            .next()
            .unwrap_or(self.repository.as_str())
    }
}

/// Image entry as written in a strategy file: a bare repository or an object
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStrategyImage {
    Repository(String),
    Detailed {
        repository: String,
        #[serde(default)]
        platforms: Option<Vec<String>>,
        #[serde(default)]
        dockerfile: Option<String>,
        #[serde(default)]
        context: Option<String>,
    },
}

impl From<RawStrategyImage> for StrategyImage {
    fn from(raw: RawStrategyImage) -> Self {
        match raw {
            RawStrategyImage::Repository(repository) => StrategyImage::new(repository),
            RawStrategyImage::Detailed {
                repository,
                platforms,
                dockerfile,
                context,
            } => StrategyImage {
                repository,
                platforms: platforms.unwrap_or_default(),
                dockerfile,
                context,
            },
        }
    }
}

/// Accept a single rule, a list of rules, or a map of named rules
fn rule_set<'de, D>(deserializer: D) -> std::result::Result<Vec<Rule>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let rules = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value::<Vec<Rule>>(value),
        Value::Object(ref fields) if fields.contains_key("match") => {
            serde_json::from_value::<Rule>(value).map(|rule| vec![rule])
        }
        Value::Object(_) => serde_json::from_value::<IndexMap<String, Rule>>(value)
            .map(|named| named.into_values().collect()),
        other => {
            return Err(D::Error::custom(format!(
                "expected a rule, a list of rules or a map of named rules, found {}",
                other
            )))
        }
    };
    rules.map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tag::TagSpec;
    use serde_json::json;

    #[test]
    fn test_parse_minimal_strategy() {
        let strategy = ReleaseStrategy::from_value(json!({
            "applications": {
                "test-app": {
                    "images": ["test-image"],
                    "on_commit_msg": [{"match": ["*"], "tags": [{"type": "literal", "value": "head"}]}]
                }
            }
        }))
        .unwrap();

        let app = strategy.application("test-app").unwrap();
        assert_eq!(app.images, vec![StrategyImage::new("test-image")]);
        assert_eq!(
            app.on_commit_msg,
            vec![Rule::new(["*"], vec![TagSpec::literal("head")])]
        );
    }

    #[test]
    fn test_parse_single_rule_object() {
        let strategy = ReleaseStrategy::from_value(json!({
            "applications": {
                "app": {"on_commit_msg": {"match": "release", "tags": []}}
            }
        }))
        .unwrap();
        assert_eq!(strategy.application("app").unwrap().on_commit_msg.len(), 1);
    }

    #[test]
    fn test_parse_named_rules_keep_order() {
        let strategy = ReleaseStrategy::from_value(json!({
            "applications": {"app": {}},
            "on": {
                "zeta": {"match": "z", "tags": [{"value": "z"}]},
                "alpha": {"match": "a", "tags": [{"value": "a"}]}
            }
        }))
        .unwrap();
        let patterns: Vec<&str> = strategy
            .on
            .iter()
            .map(|r| r.patterns[0].as_str())
            .collect();
        assert_eq!(patterns, vec!["z", "a"]);
    }

    #[test]
    fn test_parse_detailed_image() {
        let strategy = ReleaseStrategy::from_value(json!({
            "applications": {
                "app": {"images": [{
                    "repository": "ghcr.io/org/api",
                    "platforms": ["linux/amd64", "linux/arm64"],
                    "dockerfile": "docker/Dockerfile.api"
                }]}
            }
        }))
        .unwrap();
        let image = &strategy.application("app").unwrap().images[0];
        assert_eq!(image.platforms, vec!["linux/amd64", "linux/arm64"]);
        assert_eq!(image.dockerfile(), "docker/Dockerfile.api");
        assert_eq!(image.context(), ".");
        assert_eq!(image.basename(), "api");
    }

    #[test]
    fn test_effective_rules_fall_back_to_global() {
        let global = vec![Rule::new(["*"], vec![TagSpec::literal("edge")])];
        let own = vec![Rule::new(["release"], vec![TagSpec::literal("latest")])];
        let strategy = ReleaseStrategy::new()
            .with_rules(global.clone())
            .with_application("inherits", ApplicationStrategy::new(vec![]))
            .with_application(
                "overrides",
                ApplicationStrategy::new(vec![]).with_rules(own.clone()),
            );

        assert_eq!(strategy.effective_rules("inherits").unwrap(), global.as_slice());
        assert_eq!(strategy.effective_rules("overrides").unwrap(), own.as_slice());
    }

    #[test]
    fn test_effective_rules_unknown_application() {
        let strategy = ReleaseStrategy::new();
        assert!(matches!(
            strategy.effective_rules("missing"),
            Err(ReleaserError::ApplicationNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_rule_without_pattern_rejected() {
        let err = ReleaseStrategy::from_value(json!({
            "applications": {"app": {"on_commit_msg": [{"match": [], "tags": []}]}}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("declares no match pattern"));
    }

    #[test]
    fn test_invalid_tag_surfaces_as_config_error() {
        let err = ReleaseStrategy::from_value(json!({
            "applications": {"app": {"on_commit_msg": [{
                "match": "*",
                "tags": [{"type": "version", "major": true, "minor": true}]
            }]}}
        }))
        .unwrap_err();
        assert!(matches!(err, ReleaserError::Config(_)));
        assert!(err.to_string().contains("both 'major' and 'minor'"));
    }

    #[test]
    fn test_empty_strategy() {
        let strategy = ReleaseStrategy::from_value(json!({"applications": {}})).unwrap();
        assert!(strategy.applications.is_empty());
        assert!(strategy.on.is_empty());
    }
}
