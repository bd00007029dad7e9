//! Command-line interface for the inflator.
//!
//! The binary is invoked by the host orchestrator with the path of a run configuration
//! and writes the aggregated document stream to standard output. Everything else (logs,
//! warnings, errors) goes to standard error so the stream stays clean.
//!
//! # Usage
//!
//! ```bash
//! # What the orchestrator does
//! inflator ./generator.yaml
//!
//! # Reuse a persistent cache and refetch everything
//! INFLATOR_CACHE_ROOT=/var/cache/inflator inflator --pull always ./generator.yaml
//!
//! # Keep the workspace around and log every step
//! inflator --debug ./generator.yaml
//! ```
//!
//! # Settings precedence
//!
//! Command-line flags override environment variables, which override built-in defaults.
//! See [`RunSettings`] for the variables that are read.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{CleanupPolicy, PullPolicy, RunSettings};
use crate::pipeline::Pipeline;

/// Root command of the `inflator` binary.
#[derive(Parser, Debug)]
#[command(
    name = "inflator",
    about = "Fetch, render and aggregate remote manifest templates",
    version,
    long_about = "Fetches the dependencies listed in a run configuration into a cache workspace, \
                  renders their templates with the configured values and writes the selected \
                  manifests to stdout as one YAML document stream."
)]
pub struct Cli {
    /// Path of the run configuration
    pub config: PathBuf,

    /// Persistent workspace root (overrides `INFLATOR_CACHE_ROOT`)
    #[arg(long, value_name = "DIR")]
    pub cache_root: Option<PathBuf>,

    /// Pull policy applied to every dependency: `default` or `always`
    /// (overrides `INFLATOR_PULL`)
    #[arg(long, value_name = "POLICY")]
    pub pull: Option<PullPolicy>,

    /// Workspace cleanup after the run: `never` or `always` (overrides `INFLATOR_CLEANUP`)
    #[arg(long, value_name = "POLICY")]
    pub cleanup: Option<CleanupPolicy>,

    /// Log every step and keep the workspace for inspection
    #[arg(long)]
    pub debug: bool,

    /// External transfer program for remote sources (overrides `INFLATOR_FETCHER`)
    #[arg(long, value_name = "PROGRAM")]
    pub fetcher: Option<String>,

    /// Maximum number of dependencies fetched concurrently
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub max_parallel: usize,

    /// Plugin configuration root announced by the orchestrator
    /// (overrides `KUSTOMIZE_PLUGIN_CONFIG_ROOT`)
    #[arg(long, value_name = "DIR", hide = true)]
    pub plugin_config_root: Option<PathBuf>,

    /// Enable verbose logging on stderr
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Run the pipeline and print the document stream.
    pub async fn execute(self) -> Result<()> {
        let settings = self.build_settings()?;
        init_logging(&self.log_filter(&settings));

        let pipeline = Pipeline::with_default_transfer(settings);
        let outcome = pipeline.run_file(&self.config).await?;

        print!("{}", outcome.output);
        Ok(())
    }

    /// Settings from the process environment with command-line overrides applied.
    pub fn build_settings(&self) -> Result<RunSettings> {
        Ok(self.apply_overrides(RunSettings::from_env()?))
    }

    /// Apply the command-line flags on top of `settings`.
    #[must_use]
    pub fn apply_overrides(&self, mut settings: RunSettings) -> RunSettings {
        if let Some(root) = &self.cache_root {
            settings.cache_root = Some(root.clone());
        }
        if let Some(root) = &self.plugin_config_root {
            settings.plugin_config_root = Some(root.clone());
        }
        if let Some(pull) = self.pull {
            settings.force_pull = pull == PullPolicy::Always;
        }
        if let Some(cleanup) = self.cleanup {
            settings.cleanup = Some(cleanup);
        }
        if self.debug {
            settings.debug = true;
        }
        if let Some(fetcher) = &self.fetcher {
            settings.fetcher.clone_from(fetcher);
        }
        settings.max_parallel = self.max_parallel.max(1);
        settings
    }

    /// Log filter directive; `RUST_LOG` wins when set.
    #[must_use]
    pub fn log_filter(&self, settings: &RunSettings) -> String {
        if let Ok(directive) = std::env::var("RUST_LOG")
            && !directive.trim().is_empty()
        {
            return directive;
        }

        if self.quiet {
            "error".to_string()
        } else if self.verbose || settings.debug {
            "debug".to_string()
        } else {
            "warn".to_string()
        }
    }
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .try_init();
}
