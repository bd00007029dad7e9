//! Dependency fetcher
//!
//! Populates cache slots through a transfer collaborator. The collaborator is the
//! [`Transfer`] trait: it receives a source URI (credentials already attached) and a
//! destination directory, and either fills the directory or fails.
//!
//! Two transfers ship with the crate:
//! - [`CommandTransfer`] runs an external program (`go-getter` by default) as
//!   `<program> <source> <destination>`
//! - [`LocalTransfer`] copies local directories natively, so local sources work without
//!   the external program
//!
//! [`DefaultTransfer`] routes between the two based on the shape of the source URI.
//!
//! Fetch failures are fatal for the run. There is no automatic retry; `pull: always` (or
//! `INFLATOR_PULL=always`) forces a clean fetch on the next run.

pub mod command_builder;
pub mod credentials;

use anyhow::{Context, Result};
use futures::StreamExt;
use std::future::Future;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cache::{ResolvedDependency, Workspace};
use crate::constants::DEFAULT_FETCHER;
use crate::core::{FileOperation, FileResultExt, InflatorError};
use command_builder::FetchCommand;
use credentials::{redact, transfer_uri};

/// Populates a destination directory from a source URI.
pub trait Transfer: Send + Sync {
    /// Fetch `source` into the existing, empty directory `destination`.
    fn fetch(&self, source: &str, destination: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// Transfer through an external program.
#[derive(Debug, Clone)]
pub struct CommandTransfer {
    program: String,
}

impl CommandTransfer {
    /// Use `program` (name on `PATH` or explicit path).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The configured program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandTransfer {
    fn default() -> Self {
        Self::new(DEFAULT_FETCHER)
    }
}

impl Transfer for CommandTransfer {
    async fn fetch(&self, source: &str, destination: &Path) -> Result<()> {
        let program = which::which(&self.program).map_err(|_| InflatorError::FetcherNotFound {
            program: self.program.clone(),
        })?;

        FetchCommand::transfer(program.display().to_string(), source, destination).execute().await
    }
}

/// Native copy of local sources.
#[derive(Debug, Clone, Default)]
pub struct LocalTransfer;

impl LocalTransfer {
    /// Whether `source` names a local path (`/abs`, `./rel`, `../rel` or `file://`).
    #[must_use]
    pub fn handles(source: &str) -> bool {
        source.starts_with('/')
            || source.starts_with("./")
            || source.starts_with("../")
            || source.starts_with("file://")
    }

    /// The local path named by `source`, without scheme or query.
    #[must_use]
    pub fn local_path(source: &str) -> PathBuf {
        let without_query = source.split('?').next().unwrap_or(source);
        PathBuf::from(without_query.strip_prefix("file://").unwrap_or(without_query))
    }
}

impl Transfer for LocalTransfer {
    async fn fetch(&self, source: &str, destination: &Path) -> Result<()> {
        let from = Self::local_path(source);
        let to = destination.to_path_buf();

        tokio::task::spawn_blocking(move || copy_tree(&from, &to))
            .await
            .context("Local copy task panicked")?
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    let metadata = std::fs::metadata(from).with_file_context(
        FileOperation::Read,
        from,
        "reading local dependency source",
        "fetch::copy_tree",
    )?;

    if metadata.is_file() {
        let file_name = from.file_name().context("Local source has no file name")?;
        std::fs::copy(from, to.join(file_name)).with_file_context(
            FileOperation::Copy,
            from,
            "copying local dependency source",
            "fetch::copy_tree",
        )?;
        return Ok(());
    }

    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", from.display()))?;
        let relative = entry.path().strip_prefix(from)?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).with_file_context(
                FileOperation::CreateDir,
                &target,
                "creating directory in cache slot",
                "fetch::copy_tree",
            )?;
        } else {
            std::fs::copy(entry.path(), &target).with_file_context(
                FileOperation::Copy,
                entry.path(),
                "copying local dependency source",
                "fetch::copy_tree",
            )?;
        }
    }
    Ok(())
}

/// Local sources are copied natively, everything else goes through the external program.
#[derive(Debug, Clone, Default)]
pub struct DefaultTransfer {
    local: LocalTransfer,
    command: CommandTransfer,
}

impl DefaultTransfer {
    /// Route remote sources to `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            local: LocalTransfer,
            command: CommandTransfer::new(program),
        }
    }
}

impl Transfer for DefaultTransfer {
    async fn fetch(&self, source: &str, destination: &Path) -> Result<()> {
        if LocalTransfer::handles(source) {
            tracing::debug!(target: "fetch", "Copying local source {}", redact(source));
            self.local.fetch(source, destination).await
        } else {
            self.command.fetch(source, destination).await
        }
    }
}

/// Fetch one dependency into its cache slot unless the slot can be reused.
///
/// Returns whether the transfer was invoked.
pub async fn fetch_dependency<T: Transfer>(
    transfer: &T,
    workspace: &Workspace,
    dependency: &ResolvedDependency,
    force_pull: bool,
) -> Result<bool> {
    let name = dependency.name();

    if !dependency.needs_fetch(force_pull) {
        tracing::debug!(
            target: "fetch",
            "({}) Reusing cached {}",
            name,
            dependency.resolved_dir.display()
        );
        return Ok(false);
    }

    let uri = transfer_uri(&dependency.spec.source_uri, dependency.spec.credential_ref.as_deref())
        .await?;
    workspace.prepare_slot(dependency).await?;

    tracing::info!(target: "fetch", "({}) Fetching {}", name, redact(&dependency.spec.source_uri));

    let result = transfer.fetch(&uri, &dependency.slot_dir).await;
    if result.is_err() {
        // A half-populated slot must not be reused by the next run
        if let Err(e) = tokio::fs::remove_dir_all(&dependency.slot_dir).await {
            tracing::warn!(target: "fetch", "({}) Failed to remove incomplete cache slot: {}", name, e);
        }
    }

    result.map_err(|e| {
        if matches!(e.downcast_ref::<InflatorError>(), Some(InflatorError::FetcherNotFound { .. })) {
            return e;
        }
        InflatorError::FetchFailed {
            name: name.to_string(),
            source_uri: redact(&dependency.spec.source_uri),
            reason: redact(&format!("{e:#}")),
        }
        .into()
    })?;

    Ok(true)
}

/// Fetch every dependency, at most `max_parallel` at a time.
///
/// Every started transfer runs to completion before the first failure is reported, so no
/// slot is left half-populated by a cancelled transfer. Returns the number of transfers
/// performed.
pub async fn fetch_all<T: Transfer>(
    transfer: &T,
    workspace: &Workspace,
    dependencies: &[ResolvedDependency],
    force_pull: bool,
    max_parallel: usize,
) -> Result<usize> {
    let results: Vec<Result<bool>> = futures::stream::iter(dependencies)
        .map(|dependency| fetch_dependency(transfer, workspace, dependency, force_pull))
        .buffered(max_parallel.max(1))
        .collect()
        .await;

    let mut fetched = 0;
    for result in results {
        if result? {
            fetched += 1;
        }
    }
    Ok(fetched)
}
