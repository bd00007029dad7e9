//! Global constants used throughout the inflator codebase.
//!
//! File patterns, environment variable names, the document separator and
//! timeouts live here so that every stage agrees on them.

use std::time::Duration;

/// Default base-name pattern for template files (`deploy.yaml.tpl`, `svc.tmpl`, ...).
pub const DEFAULT_TEMPLATE_PATTERN: &str = "*.t*pl";

/// Base-name pattern for rendered manifests picked up by the aggregator.
///
/// Every destination produced by the renderer matches this pattern, while the
/// template sources themselves never do.
pub const RENDERED_MANIFEST_PATTERN: &str = "*.rendered.y*ml";

/// Marker inserted before the YAML extension of rendered files.
pub const RENDER_MARKER: &str = "rendered";

/// Extension used for rendered files whose template name carries no YAML extension.
pub const DEFAULT_MANIFEST_EXTENSION: &str = "yaml";

/// Separator written before the first document and after every included document.
pub const DOCUMENT_SEPARATOR: &str = "\n---\n";

/// Reference marker looked up in a source URI to derive the cache discriminator.
pub const REF_MARKER: &str = "ref=";

/// Credential key carrying an SSH private-key file path.
pub const SSH_KEY_CREDENTIAL: &str = "sshkey";

/// Kinds dropped for every dependency unless the run configuration says otherwise.
pub const DEFAULT_EXCLUDED_KINDS: &[&str] = &["Namespace"];

/// Default external transfer program.
pub const DEFAULT_FETCHER: &str = "go-getter";

/// Timeout for a single external transfer (10 minutes).
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(600);

/// Prefix of the transient workspace directory created under the system temp dir.
pub const TRANSIENT_WORKSPACE_PREFIX: &str = "inflator-";

/// Sibling of the `envs/` directory used as persistent cache root when derived from the
/// host plugin configuration root.
pub const DERIVED_REPOS_DIR: &str = "repos";

/// Path segment that marks an environment overlay in the host plugin configuration root.
pub const ENVS_SEGMENT: &str = "/envs/";

/// Environment variable: persistent workspace root.
pub const ENV_CACHE_ROOT: &str = "INFLATOR_CACHE_ROOT";

/// Environment variable: force refetch of every dependency (`always`).
pub const ENV_PULL: &str = "INFLATOR_PULL";

/// Environment variable: cleanup policy (`never` / `always`).
pub const ENV_CLEANUP: &str = "INFLATOR_CLEANUP";

/// Environment variable: debug verbosity, also suppresses cleanup.
pub const ENV_DEBUG: &str = "INFLATOR_DEBUG";

/// Environment variable: external transfer program.
pub const ENV_FETCHER: &str = "INFLATOR_FETCHER";

/// Environment variable set by the host orchestrator to the directory holding the plugin config.
pub const ENV_PLUGIN_CONFIG_ROOT: &str = "KUSTOMIZE_PLUGIN_CONFIG_ROOT";
