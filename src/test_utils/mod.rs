//! Test utilities for the inflator
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`init_test_logging`] installs a tracing subscriber once per test binary
//! - [`StubTransfer`] stands in for the transfer collaborator and counts invocations
//! - [`write_fixture`] lays out a dependency source tree
//!
//! # Example
//!
//! ```rust,no_run
//! use inflator_cli::test_utils::{StubTransfer, write_fixture};
//!
//! let temp = tempfile::TempDir::new().unwrap();
//! write_fixture(temp.path(), &[("deploy.yaml.tpl", "kind: Deployment\n")]);
//! let transfer = StubTransfer::with_fixture(temp.path());
//! assert_eq!(transfer.invocations(), 0);
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::fetch::{LocalTransfer, Transfer};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; does nothing when neither is set.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Write `files` (relative path, content) below `root`, creating directories as needed.
pub fn write_fixture(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }
}

/// Transfer collaborator for tests.
///
/// Records every invocation. Depending on construction it copies a fixture tree into the
/// destination, leaves the destination empty, or fails with a fixed message. Clones share
/// their counters.
#[derive(Debug, Clone, Default)]
pub struct StubTransfer {
    invocations: Arc<AtomicUsize>,
    sources: Arc<Mutex<Vec<String>>>,
    fixture: Option<PathBuf>,
    failure: Option<String>,
}

impl StubTransfer {
    /// Succeeds without writing anything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `fixture` into every destination.
    #[must_use]
    pub fn with_fixture(fixture: &Path) -> Self {
        Self {
            fixture: Some(fixture.to_path_buf()),
            ..Self::default()
        }
    }

    /// Fails every fetch with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Number of fetches so far.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Source URIs received so far, in call order.
    #[must_use]
    pub fn sources(&self) -> Vec<String> {
        self.sources.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Transfer for StubTransfer {
    async fn fetch(&self, source: &str, destination: &Path) -> Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut sources) = self.sources.lock() {
            sources.push(source.to_string());
        }

        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        if let Some(fixture) = &self.fixture {
            LocalTransfer.fetch(&fixture.display().to_string(), destination).await?;
        }
        Ok(())
    }
}
