//! Run orchestration.
//!
//! A run goes through four stages, each completing for every dependency before the next
//! starts:
//!
//! 1. flatten the `values` tree into template variables
//! 2. resolve cache slots and fetch what is missing (optionally in parallel)
//! 3. render templates, dependency by dependency in declared order
//! 4. aggregate rendered manifests into the output stream, in declared order
//!
//! The first failure aborts the run; there is no partial output. The workspace is then
//! cleaned up according to the effective cleanup policy.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cache::{ResolvedDependency, Workspace};
use crate::config::{CleanupPolicy, RunConfig, RunSettings};
use crate::fetch::{DefaultTransfer, Transfer, fetch_all};
use crate::manifest::{AggregateReport, KindFilter, OutputStream, aggregate_dependency};
use crate::templating::TemplateRenderer;
use crate::values::flatten;

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The output document stream
    pub output: String,
    /// Number of transfers performed (reused cache slots are not counted)
    pub fetched: usize,
    /// Number of templates rendered
    pub rendered: usize,
    /// Aggregation counts per dependency, in declared order
    pub reports: Vec<AggregateReport>,
    /// Workspace root used by the run
    pub workspace_root: PathBuf,
    /// Whether the workspace was removed at the end
    pub cleaned_up: bool,
}

/// Fetch, render and aggregate pipeline over a transfer collaborator.
pub struct Pipeline<T> {
    transfer: T,
    settings: RunSettings,
}

impl Pipeline<DefaultTransfer> {
    /// Pipeline using the configured external fetcher for remote sources.
    #[must_use]
    pub fn with_default_transfer(settings: RunSettings) -> Self {
        let transfer = DefaultTransfer::new(settings.fetcher.clone());
        Self::new(transfer, settings)
    }
}

impl<T: Transfer> Pipeline<T> {
    /// Create a pipeline.
    pub const fn new(transfer: T, settings: RunSettings) -> Self {
        Self {
            transfer,
            settings,
        }
    }

    /// The settings of this pipeline.
    #[must_use]
    pub const fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Load the run configuration at `path` and run it.
    pub async fn run_file(&self, path: &Path) -> Result<RunOutcome> {
        let config = RunConfig::load(path)?;
        self.run(&config).await
    }

    /// Run a validated configuration.
    pub async fn run(&self, config: &RunConfig) -> Result<RunOutcome> {
        config.validate()?;

        let workspace = Workspace::open(self.settings.workspace_location()).await?;
        if self.settings.debug {
            tracing::info!("Workspace: {}", workspace.root().display());
        }
        let policy = self.settings.effective_cleanup(workspace.location());

        let result = self.run_stages(config, &workspace).await;

        match result {
            Ok(mut outcome) => {
                outcome.cleaned_up = workspace.cleanup(policy).await?;
                Ok(outcome)
            }
            Err(error) => {
                if policy == CleanupPolicy::Always
                    && let Err(cleanup_error) = workspace.cleanup(policy).await
                {
                    tracing::warn!("Failed to clean up workspace after error: {cleanup_error}");
                }
                Err(error)
            }
        }
    }

    async fn run_stages(&self, config: &RunConfig, workspace: &Workspace) -> Result<RunOutcome> {
        tracing::info!(
            "Running '{}' with {} dependencies",
            config.display_name(),
            config.dependencies().len()
        );

        let values = flatten(&config.values());
        tracing::debug!("Flattened {} value(s)", values.len());

        let dependencies: Vec<ResolvedDependency> =
            config.dependencies().iter().map(|spec| workspace.resolve(spec)).collect();

        let fetched = fetch_all(
            &self.transfer,
            workspace,
            &dependencies,
            self.settings.force_pull,
            self.settings.max_parallel,
        )
        .await?;

        let renderer = TemplateRenderer::new(&values)?;
        let mut rendered = 0;
        for dependency in &dependencies {
            rendered += renderer.render_dependency(dependency)?.len();
        }

        let mut output = OutputStream::new();
        let mut reports = Vec::with_capacity(dependencies.len());
        for dependency in &dependencies {
            let filter = KindFilter::new(&dependency.spec.kind_filter, &config.exclude_kinds);
            reports.push(aggregate_dependency(dependency, &filter, &mut output)?);
        }

        tracing::info!(
            "Fetched {} dependencies, rendered {} templates, emitted {} manifests",
            fetched,
            rendered,
            output.len()
        );

        Ok(RunOutcome {
            output: output.into_string(),
            fetched,
            rendered,
            reports,
            workspace_root: workspace.root().to_path_buf(),
            cleaned_up: false,
        })
    }
}
