//! Process-wide run settings.
//!
//! Settings come from the environment of the host orchestrator and may be overridden on the
//! command line. They never appear in the run configuration document itself.
//!
//! # Workspace location
//!
//! 1. `INFLATOR_CACHE_ROOT` / `--cache-root` (persistent)
//! 2. Derived from `KUSTOMIZE_PLUGIN_CONFIG_ROOT` when it contains an `/envs/<env>/` segment:
//!    `<prefix>/repos`, shared by every environment overlay (persistent)
//! 3. A fresh `inflator-<uuid>` directory under the system temp dir (transient)

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{CleanupPolicy, PullPolicy};
use crate::constants::{
    DEFAULT_FETCHER, DERIVED_REPOS_DIR, ENV_CACHE_ROOT, ENV_CLEANUP, ENV_DEBUG, ENV_FETCHER,
    ENV_PLUGIN_CONFIG_ROOT, ENV_PULL, ENVS_SEGMENT, TRANSIENT_WORKSPACE_PREFIX,
};

/// Where the workspace root of a run lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceLocation {
    /// Reused across runs; cache slots survive
    Persistent {
        /// Workspace root
        root: PathBuf,
        /// Environment overlay name when the root was derived from the plugin config root
        environment: Option<String>,
    },
    /// Created for this run only
    Transient {
        /// Workspace root
        root: PathBuf,
    },
}

impl WorkspaceLocation {
    /// The workspace root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        match self {
            Self::Persistent { root, .. } | Self::Transient { root } => root,
        }
    }

    /// Whether the workspace was created for this run only.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Environment-driven overrides for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Explicit persistent workspace root
    pub cache_root: Option<PathBuf>,
    /// Directory of the plugin configuration as announced by the host orchestrator
    pub plugin_config_root: Option<PathBuf>,
    /// Refetch every dependency regardless of its own pull policy
    pub force_pull: bool,
    /// Explicit cleanup policy; `None` selects the default for the workspace kind
    pub cleanup: Option<CleanupPolicy>,
    /// Debug verbosity; also keeps the workspace
    pub debug: bool,
    /// External transfer program for remote sources
    pub fetcher: String,
    /// Maximum number of concurrent fetches
    pub max_parallel: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            cache_root: None,
            plugin_config_root: None,
            force_pull: false,
            cleanup: None,
            debug: false,
            fetcher: DEFAULT_FETCHER.to_string(),
            max_parallel: 1,
        }
    }
}

impl RunSettings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let force_pull = match get(ENV_PULL) {
            Some(value) => value.parse::<PullPolicy>()? == PullPolicy::Always,
            None => false,
        };
        let cleanup = get(ENV_CLEANUP).map(|v| v.parse::<CleanupPolicy>()).transpose()?;

        Ok(Self {
            cache_root: get(ENV_CACHE_ROOT).map(PathBuf::from),
            plugin_config_root: get(ENV_PLUGIN_CONFIG_ROOT).map(PathBuf::from),
            force_pull,
            cleanup,
            debug: get(ENV_DEBUG).is_some_and(|v| is_truthy(&v)),
            fetcher: get(ENV_FETCHER).unwrap_or_else(|| DEFAULT_FETCHER.to_string()),
            max_parallel: 1,
        })
    }

    /// Decide where this run's workspace lives.
    ///
    /// A transient location gets a fresh unique directory name on every call.
    #[must_use]
    pub fn workspace_location(&self) -> WorkspaceLocation {
        if let Some(root) = &self.cache_root {
            return WorkspaceLocation::Persistent {
                root: root.clone(),
                environment: None,
            };
        }

        if let Some(config_root) = &self.plugin_config_root
            && let Some((root, environment)) = derive_cache_root(config_root)
        {
            tracing::debug!(
                target: "cache",
                "Derived persistent cache root {} from {}",
                root.display(),
                config_root.display()
            );
            return WorkspaceLocation::Persistent {
                root,
                environment,
            };
        }

        WorkspaceLocation::Transient {
            root: std::env::temp_dir()
                .join(format!("{TRANSIENT_WORKSPACE_PREFIX}{}", uuid::Uuid::new_v4())),
        }
    }

    /// Cleanup policy in effect for the given workspace.
    ///
    /// Debug always keeps the workspace. Otherwise an explicit policy wins, and the default
    /// removes transient workspaces and keeps persistent ones.
    #[must_use]
    pub fn effective_cleanup(&self, location: &WorkspaceLocation) -> CleanupPolicy {
        if self.debug {
            return CleanupPolicy::Never;
        }
        match self.cleanup {
            Some(policy) => policy,
            None if location.is_transient() => CleanupPolicy::Always,
            None => CleanupPolicy::Never,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

/// Derive a persistent cache root from the host plugin configuration root.
///
/// `/work/site/envs/dev/apps` yields `(/work/site/repos, Some("dev"))`. Paths without an
/// `/envs/` segment yield `None`.
#[must_use]
pub fn derive_cache_root(plugin_config_root: &Path) -> Option<(PathBuf, Option<String>)> {
    let raw = plugin_config_root.to_string_lossy();
    let index = raw.find(ENVS_SEGMENT)?;

    let prefix = &raw[..index];
    let rest = &raw[index + ENVS_SEGMENT.len()..];
    let environment = rest.split('/').next().filter(|s| !s.is_empty()).map(str::to_string);

    let base = if prefix.is_empty() {
        PathBuf::from("/")
    } else {
        PathBuf::from(prefix)
    };
    Some((base.join(DERIVED_REPOS_DIR), environment))
}
