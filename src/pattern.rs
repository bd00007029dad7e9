//! Base-name pattern discovery.
//!
//! Templates and rendered manifests are found by walking a dependency directory and matching
//! each file's base name (never its path) against a glob pattern:
//!
//! - `*` matches any sequence of characters, including a leading `.`
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match a character set or range
//!
//! The walk always descends into every directory; directories themselves never match.
//! Symlinks are not followed. Results are sorted lexically so that discovery order, and
//! therefore output order, is the same on every platform.

use anyhow::{Context, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::core::InflatorError;

/// Matches file base names against a compiled glob pattern.
///
/// # Examples
///
/// ```rust
/// use inflator_cli::pattern::PatternMatcher;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let matcher = PatternMatcher::new("*.t*pl")?;
///
/// assert!(matcher.matches(Path::new("deploy/app.yaml.tpl")));
/// assert!(matcher.matches(Path::new("svc.tmpl")));
/// assert!(!matcher.matches(Path::new("deploy/app.rendered.yaml")));
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Pattern,
    original_pattern: String,
}

impl PatternMatcher {
    /// Compile `pattern_str`.
    pub fn new(pattern_str: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern_str).map_err(|e| InflatorError::InvalidPattern {
            pattern: pattern_str.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            pattern,
            original_pattern: pattern_str.to_string(),
        })
    }

    /// Whether the base name of `path` matches.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.pattern.matches(&name.to_string_lossy()))
    }

    /// Find every matching file below `base_path`, sorted lexically.
    ///
    /// A missing `base_path` yields no matches. Other traversal failures are errors.
    pub fn find_matches(&self, base_path: &Path) -> Result<Vec<PathBuf>> {
        debug!("Searching for pattern '{}' in {}", self.original_pattern, base_path.display());

        if !base_path.exists() {
            debug!("{} does not exist, no matches", base_path.display());
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in WalkDir::new(base_path).follow_links(false) {
            let entry =
                entry.with_context(|| format!("Failed to walk directory {}", base_path.display()))?;
            if entry.file_type().is_dir() || !entry.path().is_file() {
                continue;
            }

            trace!("Checking path: {}", entry.path().display());
            if self.matches(entry.path()) {
                matches.push(entry.into_path());
            }
        }

        matches.sort();
        debug!("Found {} matches for pattern '{}'", matches.len(), self.original_pattern);
        Ok(matches)
    }

    /// The pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.original_pattern
    }
}
