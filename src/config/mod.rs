//! Run configuration for the inflator.
//!
//! A run is described by a single YAML document handed over by the host orchestrator:
//!
//! ```yaml
//! apiVersion: inflator/v1
//! kind: Inflator
//! metadata:
//!   name: example
//! dependencies:
//!   - name: nginx
//!     repo: github.com/example/charts//nginx?ref=v1.2.0
//!     repoCreds: sshkey=/home/ci/.ssh/id_ed25519
//!     path: deploy/k8s
//!     pull: always
//!     templatePattern: "*.t*pl"
//!     kinds: ["deployment", "!secret"]
//! values:
//!   nginx:
//!     cpu:
//!       limit: "1000m"
//! excludeKinds: ["Namespace"]
//! ```
//!
//! `dependencies` is required; everything else is optional. The configuration is
//! validated as a whole before any fetch or render work starts.
//!
//! Process-wide overrides (cache root, forced pulls, cleanup, debug) are not part of the
//! document; see [`settings`].

pub mod settings;

pub use settings::{RunSettings, WorkspaceLocation};

use anyhow::Result;
use serde::{Deserialize, Deserializer};
use serde_yaml::Mapping;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use crate::constants::{DEFAULT_EXCLUDED_KINDS, DEFAULT_TEMPLATE_PATTERN};
use crate::core::InflatorError;

/// Whether an existing cache slot may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullPolicy {
    /// Reuse the cache slot when it already exists
    #[default]
    Default,
    /// Always clear the cache slot and fetch again
    Always,
}

impl FromStr for PullPolicy {
    type Err = InflatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "default" => Ok(Self::Default),
            "always" => Ok(Self::Always),
            _ => Err(InflatorError::InvalidSetting {
                field: "pull".to_string(),
                value: s.to_string(),
                expected: "default, always".to_string(),
            }),
        }
    }
}

impl fmt::Display for PullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Always => write!(f, "always"),
        }
    }
}

impl<'de> Deserialize<'de> for PullPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.as_deref().unwrap_or_default().parse().map_err(serde::de::Error::custom)
    }
}

/// Whether the workspace is removed at the end of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Keep the workspace
    Never,
    /// Remove the workspace
    Always,
}

impl FromStr for CleanupPolicy {
    type Err = InflatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            _ => Err(InflatorError::InvalidSetting {
                field: "cleanup".to_string(),
                value: s.to_string(),
                expected: "never, always".to_string(),
            }),
        }
    }
}

impl fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::Always => write!(f, "always"),
        }
    }
}

/// One remote source to fetch, render and aggregate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DependencySpec {
    /// Unique short identifier; also the first half of the cache slot name
    #[serde(default)]
    pub name: String,

    /// Transfer URI, optionally carrying `ref=<reference>` and further query parameters
    #[serde(rename = "repo", default)]
    pub source_uri: String,

    /// Comma-separated `key=value` credential entries (`sshkey=<path>`)
    #[serde(rename = "repoCreds", default)]
    pub credential_ref: Option<String>,

    /// Directory inside the fetched tree treated as the dependency root
    #[serde(rename = "path", default)]
    pub sub_path: Option<String>,

    /// Refetch policy
    #[serde(rename = "pull", default)]
    pub pull_policy: PullPolicy,

    /// Base-name pattern selecting template files
    #[serde(rename = "templatePattern", alias = "templatePatt", default = "default_template_glob")]
    pub template_glob: String,

    /// Kind allow-list; `!kind` entries deny. Empty allows every kind.
    #[serde(rename = "kinds", default)]
    pub kind_filter: Vec<String>,
}

fn default_template_glob() -> String {
    DEFAULT_TEMPLATE_PATTERN.to_string()
}

fn default_excluded_kinds() -> Vec<String> {
    DEFAULT_EXCLUDED_KINDS.iter().map(|k| (*k).to_string()).collect()
}

impl DependencySpec {
    /// Sub-path with surrounding slashes removed, `None` when empty.
    #[must_use]
    pub fn sub_path(&self) -> Option<&str> {
        self.sub_path.as_deref().map(|p| p.trim_matches('/')).filter(|p| !p.is_empty())
    }

    fn validate(&self, position: usize) -> Result<(), InflatorError> {
        let label = if self.name.is_empty() {
            format!("dependencies[{position}]")
        } else {
            self.name.clone()
        };
        let invalid = |reason: &str| InflatorError::InvalidDependency {
            name: label.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("missing required field 'name'"));
        }
        let mut components = Path::new(&self.name).components();
        let single_component =
            matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
        if !single_component || self.name.contains(['/', '\\']) {
            return Err(invalid("'name' must be a plain identifier without path separators"));
        }

        if self.source_uri.trim().is_empty() {
            return Err(invalid("missing required field 'repo'"));
        }

        if let Some(sub_path) = self.sub_path() {
            let escapes = Path::new(sub_path)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(invalid("'path' must be relative and stay inside the fetched tree"));
            }
        }

        glob::Pattern::new(&self.template_glob).map_err(|e| InflatorError::InvalidPattern {
            pattern: self.template_glob.clone(),
            reason: e.to_string(),
        })?;

        if self.kind_filter.iter().any(|k| k.trim().trim_start_matches('!').trim().is_empty()) {
            return Err(invalid("'kinds' entries must not be empty"));
        }

        Ok(())
    }
}

/// Informational resource metadata passed along by the host orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metadata {
    /// Resource name
    #[serde(default)]
    pub name: Option<String>,
}

/// The parsed run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Resource API version, informational
    #[serde(default)]
    pub api_version: Option<String>,

    /// Resource kind, informational
    #[serde(default)]
    pub kind: Option<String>,

    /// Resource metadata, informational
    #[serde(default)]
    pub metadata: Option<Metadata>,

    /// Free-text run name
    #[serde(default)]
    pub name: Option<String>,

    /// Ordered dependencies; required
    #[serde(default)]
    pub dependencies: Option<Vec<DependencySpec>>,

    /// Nested values tree flattened into the template context
    #[serde(default)]
    pub values: Option<Mapping>,

    /// Kinds dropped for every dependency regardless of its `kinds` filter
    #[serde(default = "default_excluded_kinds")]
    pub exclude_kinds: Vec<String>,
}

impl RunConfig {
    /// Read, parse and validate a run configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                InflatorError::ConfigNotFound {
                    path: path.display().to_string(),
                }
            } else {
                InflatorError::ConfigParseError {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let config = Self::from_yaml_str(&content, &path.display().to_string())?;
        tracing::debug!(
            "Loaded run configuration '{}' with {} dependencies",
            config.display_name(),
            config.dependencies().len()
        );
        Ok(config)
    }

    /// Parse and validate a run configuration from YAML text.
    ///
    /// `file` is only used to label errors.
    pub fn from_yaml_str(content: &str, file: &str) -> Result<Self, InflatorError> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| InflatorError::ConfigParseError {
                file: file.to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), InflatorError> {
        let Some(dependencies) = &self.dependencies else {
            return Err(InflatorError::ConfigValidationError {
                reason: "missing the required 'dependencies' key".to_string(),
            });
        };

        let mut seen = HashSet::new();
        for (position, dependency) in dependencies.iter().enumerate() {
            dependency.validate(position)?;
            if !seen.insert(dependency.name.as_str()) {
                return Err(InflatorError::DuplicateDependency {
                    name: dependency.name.clone(),
                });
            }
        }

        if self.exclude_kinds.iter().any(|k| k.trim().is_empty()) {
            return Err(InflatorError::ConfigValidationError {
                reason: "'excludeKinds' entries must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Dependencies in declared order.
    #[must_use]
    pub fn dependencies(&self) -> &[DependencySpec] {
        self.dependencies.as_deref().unwrap_or_default()
    }

    /// The `values` tree, empty when absent.
    #[must_use]
    pub fn values(&self) -> Mapping {
        self.values.clone().unwrap_or_default()
    }

    /// Run name for logging: `name`, then `metadata.name`, then a placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or_else(|| self.metadata.as_ref().and_then(|m| m.name.as_deref()))
            .unwrap_or("unnamed")
    }
}
