//! Common test utilities for inflator integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use crate::fixtures::SourceFixture;

/// Environment variables read by the binary, cleared for every run
const INFLATOR_ENV: &[&str] = &[
    "INFLATOR_CACHE_ROOT",
    "INFLATOR_PULL",
    "INFLATOR_CLEANUP",
    "INFLATOR_DEBUG",
    "INFLATOR_FETCHER",
    "KUSTOMIZE_PLUGIN_CONFIG_ROOT",
    "RUST_LOG",
];

/// Test project with a working directory, a persistent cache and local template sources
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    cache_dir: PathBuf,
    sources_dir: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let cache_dir = temp_dir.path().join("cache");
        let sources_dir = temp_dir.path().join("sources");

        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&sources_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            cache_dir,
            sources_dir,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_dir
    }

    /// Lay out a fixture under the sources directory and return its path
    pub fn create_source(&self, fixture: &SourceFixture) -> Result<PathBuf> {
        let root = self.sources_dir.join(&fixture.name);
        for (relative, content) in &fixture.files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)
                .with_context(|| format!("Failed to write fixture file {}", path.display()))?;
        }
        Ok(root)
    }

    /// Write the run configuration and return its path
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        let path = self.project_dir.join("generator.yaml");
        fs::write(&path, content)
            .with_context(|| format!("Failed to write run configuration to {}", path.display()))?;
        Ok(path)
    }

    /// Directories currently present in the cache
    pub fn cache_slots(&self) -> Result<Vec<String>> {
        if !self.cache_dir.exists() {
            return Ok(Vec::new());
        }
        let mut slots = fs::read_dir(&self.cache_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        slots.sort();
        Ok(slots)
    }

    /// Run the binary against the project's persistent cache
    pub fn run_inflator(&self, args: &[&str]) -> Result<CommandOutput> {
        self.run_inflator_with_env(args, &[("INFLATOR_CACHE_ROOT", &self.cache_dir.display().to_string())])
    }

    /// Run the binary with an explicit environment (nothing inherited from `INFLATOR_*`)
    pub fn run_inflator_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<CommandOutput> {
        let mut command = Command::new(env!("CARGO_BIN_EXE_inflator"));
        command.args(args).current_dir(&self.project_dir).env("NO_COLOR", "1");
        for key in INFLATOR_ENV {
            command.env_remove(key);
        }
        for (key, value) in env {
            command.env(key, value);
        }

        let output = command.output().context("Failed to run inflator")?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Run configuration with one local dependency per `(name, source, extra)` entry
///
/// `extra` is appended verbatim to the dependency mapping (indented YAML lines).
pub fn run_config(dependencies: &[(&str, &Path, &str)], values: &str) -> String {
    let mut config = String::from(
        "apiVersion: generators.example.com/v1\nkind: GotplInflator\nmetadata:\n  name: test\ndependencies:\n",
    );
    for (name, source, extra) in dependencies {
        config.push_str(&format!("  - name: {name}\n    repo: {}\n", source.display()));
        config.push_str(extra);
    }
    if !values.is_empty() {
        config.push_str("values:\n");
        config.push_str(values);
    }
    config
}

/// Split an output stream into its documents
pub fn documents(stream: &str) -> Vec<&str> {
    stream.split("\n---\n").map(str::trim).filter(|doc| !doc.is_empty()).collect()
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(self.success, "Command failed with code {:?}\nStderr: {}", self.code, self.stderr);
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
