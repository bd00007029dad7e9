//! Cache key derivation and workspace management
//!
//! Every dependency is fetched into its own cache slot below the workspace root. The slot
//! name is derived from the dependency name and a discriminator taken from its source URI, so
//! that repeated runs with an unchanged source land in the same slot and can skip the fetch.
//!
//! # Slot layout
//!
//! ```text
//! <workspace root>/
//! ├── nginx-v1.2.0/          # repo: ...//nginx?ref=v1.2.0
//! │   └── deploy/k8s/        # path: deploy/k8s  (the resolved directory)
//! └── redis-9f3a61c2/        # repo without ref=, FNV-1a of the URI
//! ```
//!
//! # Discriminator
//!
//! - The value of the `ref=` query parameter, up to the next `?` or `&`
//! - A reference containing `/`, `\` or `_` has its separators replaced by `_` and the
//!   FNV-1a hash of the raw reference appended (`feature/login` becomes
//!   `feature_login-<hash>`), so `feature/login` and `feature_login` never share a slot
//! - Otherwise the 32-bit FNV-1a hash of the full source URI, as 8 hex digits
//!
//! # Fetch decision
//!
//! A fetch is skipped when the resolved directory already exists, the dependency's pull
//! policy is not `always` and no global pull override is set. When a fetch is needed the slot
//! is removed and recreated first; any failure doing so aborts the run since a half-cleaned
//! slot would feed stale files to the renderer.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::{CleanupPolicy, DependencySpec, PullPolicy, WorkspaceLocation};
use crate::constants::REF_MARKER;
use crate::core::InflatorError;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a hash.
#[must_use]
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME))
}

/// Extract the reference embedded in a source URI (`...?ref=v1.2.0`).
///
/// The marker only counts at the start of a query parameter, so `href=` or `pref=` are not
/// references. Returns `None` when there is no marker or the value is empty.
#[must_use]
pub fn extract_reference(source_uri: &str) -> Option<&str> {
    let (index, _) = source_uri
        .match_indices(REF_MARKER)
        .find(|(index, _)| *index == 0 || matches!(source_uri.as_bytes()[index - 1], b'?' | b'&'))?;
    let rest = &source_uri[index + REF_MARKER.len()..];
    let end = rest.find(['?', '&']).unwrap_or(rest.len());
    Some(&rest[..end]).filter(|r| !r.is_empty())
}

/// Cache discriminator for a source URI.
#[must_use]
pub fn cache_discriminator(source_uri: &str) -> String {
    match extract_reference(source_uri) {
        Some(reference) if reference.contains(['/', '\\', '_']) => format!(
            "{}-{:08x}",
            reference.replace(['/', '\\'], "_"),
            fnv1a_32(reference.as_bytes())
        ),
        Some(reference) => reference.to_string(),
        None => format!("{:08x}", fnv1a_32(source_uri.as_bytes())),
    }
}

/// A dependency together with its on-disk location.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDependency {
    /// The dependency as configured
    pub spec: DependencySpec,
    /// Cache slot the source is fetched into
    pub slot_dir: PathBuf,
    /// Slot joined with the dependency's sub-path; root for rendering and aggregation
    pub resolved_dir: PathBuf,
}

impl ResolvedDependency {
    /// Dependency name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Whether the source has to be (re)fetched.
    #[must_use]
    pub fn needs_fetch(&self, force_pull: bool) -> bool {
        force_pull || self.spec.pull_policy == PullPolicy::Always || !self.resolved_dir.exists()
    }
}

/// The directory shared by every cache slot of a run.
#[derive(Debug, Clone)]
pub struct Workspace {
    location: WorkspaceLocation,
}

impl Workspace {
    /// Create the workspace root (if needed) and return a handle to it.
    pub async fn open(location: WorkspaceLocation) -> Result<Self> {
        let root = location.root();
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| workspace_error("creating workspace root", root, &e))?;

        tracing::debug!(
            target: "cache",
            "Using {} workspace at {}",
            if location.is_transient() { "transient" } else { "persistent" },
            root.display()
        );
        Ok(Self {
            location,
        })
    }

    /// Workspace root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.location.root()
    }

    /// Workspace location.
    #[must_use]
    pub const fn location(&self) -> &WorkspaceLocation {
        &self.location
    }

    /// Compute the cache slot and resolved directory of a dependency.
    ///
    /// Pure; repeated calls with the same dependency yield the same paths.
    #[must_use]
    pub fn resolve(&self, spec: &DependencySpec) -> ResolvedDependency {
        let slot_dir = self
            .root()
            .join(format!("{}-{}", spec.name, cache_discriminator(&spec.source_uri)));
        let resolved_dir = match spec.sub_path() {
            Some(sub_path) => slot_dir.join(sub_path),
            None => slot_dir.clone(),
        };

        ResolvedDependency {
            spec: spec.clone(),
            slot_dir,
            resolved_dir,
        }
    }

    /// Empty the cache slot of a dependency ahead of a fetch.
    ///
    /// An existing slot is removed; the slot directory is then created empty.
    pub async fn prepare_slot(&self, dependency: &ResolvedDependency) -> Result<()> {
        let slot = &dependency.slot_dir;

        if tokio::fs::try_exists(slot).await.unwrap_or(false) {
            tracing::debug!(target: "cache", "({}) Clearing cache slot {}", dependency.name(), slot.display());
            tokio::fs::remove_dir_all(slot)
                .await
                .map_err(|e| workspace_error("clearing cache slot", slot, &e))?;
        }

        tokio::fs::create_dir_all(slot)
            .await
            .map_err(|e| workspace_error("creating cache slot", slot, &e))?;
        Ok(())
    }

    /// Remove the workspace according to the cleanup policy.
    ///
    /// Returns whether the workspace was removed.
    pub async fn cleanup(&self, policy: CleanupPolicy) -> Result<bool> {
        let root = self.root();
        match policy {
            CleanupPolicy::Never => {
                tracing::debug!(target: "cache", "Keeping workspace {}", root.display());
                Ok(false)
            }
            CleanupPolicy::Always => {
                if tokio::fs::try_exists(root).await.unwrap_or(false) {
                    tokio::fs::remove_dir_all(root)
                        .await
                        .map_err(|e| workspace_error("removing workspace", root, &e))?;
                    tracing::debug!(target: "cache", "Removed workspace {}", root.display());
                }
                Ok(true)
            }
        }
    }
}

fn workspace_error(operation: &str, path: &Path, error: &std::io::Error) -> InflatorError {
    InflatorError::WorkspaceError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        reason: error.to_string(),
    }
}
