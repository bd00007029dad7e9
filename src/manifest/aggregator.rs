//! Aggregation of rendered manifests into the output document stream.

use anyhow::Result;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

use super::kind_filter::{KindDecision, KindFilter};
use crate::cache::ResolvedDependency;
use crate::constants::{DOCUMENT_SEPARATOR, RENDERED_MANIFEST_PATTERN};
use crate::core::{FileOperation, FileResultExt, InflatorError};
use crate::pattern::PatternMatcher;

/// The concatenated output of a run.
///
/// Starts with one separator; every appended document is followed by another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStream {
    buffer: String,
    documents: usize,
}

impl Default for OutputStream {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputStream {
    /// An empty stream (a single leading separator).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: DOCUMENT_SEPARATOR.to_string(),
            documents: 0,
        }
    }

    /// Append one manifest verbatim.
    pub fn push_document(&mut self, content: &str) {
        self.buffer.push_str(content);
        self.buffer.push_str(DOCUMENT_SEPARATOR);
        self.documents += 1;
    }

    /// Number of appended manifests.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.documents
    }

    /// Whether no manifest was appended.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.documents == 0
    }

    /// The stream text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Consume the stream, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }
}

/// Per-dependency aggregation counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Dependency name
    pub dependency: String,
    /// Manifests appended to the stream
    pub included: usize,
    /// Manifests dropped by the kind policy
    pub excluded: usize,
    /// Files dropped because they declare no kind
    pub without_kind: usize,
}

/// Determine the kind of a rendered manifest.
///
/// Every YAML document in the file must parse and be a mapping (empty documents are
/// allowed). The first non-empty document decides: its `kind` string, or `None` when it
/// has no `kind` or the file holds no document at all.
pub fn document_kind(path: &Path, content: &str) -> Result<Option<String>> {
    let mut first: Option<Value> = None;

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document).map_err(|e| InflatorError::ManifestParseError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if value.is_null() {
            continue;
        }
        if !value.is_mapping() {
            return Err(InflatorError::InvalidManifest {
                path: path.display().to_string(),
                reason: format!("expected a mapping, found {}", value_type(&value)),
            }
            .into());
        }
        if first.is_none() {
            first = Some(value);
        }
    }

    let Some(Value::Mapping(mapping)) = first else {
        return Ok(None);
    };

    match mapping.get("kind") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(kind)) => Ok(Some(kind.clone())),
        Some(other) => Err(InflatorError::InvalidManifest {
            path: path.display().to_string(),
            reason: format!("`kind` must be a string, found {}", value_type(other)),
        }
        .into()),
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Append the rendered manifests of one dependency to `output`.
///
/// Manifests are discovered below the dependency's resolved directory and processed in
/// lexical path order.
pub fn aggregate_dependency(
    dependency: &ResolvedDependency,
    filter: &KindFilter,
    output: &mut OutputStream,
) -> Result<AggregateReport> {
    let name = dependency.name();
    let matcher = PatternMatcher::new(RENDERED_MANIFEST_PATTERN)?;
    let manifests = matcher.find_matches(&dependency.resolved_dir)?;

    let mut report = AggregateReport {
        dependency: name.to_string(),
        ..AggregateReport::default()
    };

    for manifest in manifests {
        let content = std::fs::read_to_string(&manifest).with_file_context(
            FileOperation::Read,
            &manifest,
            "reading rendered manifest",
            "manifest::aggregate_dependency",
        )?;

        let Some(kind) = document_kind(&manifest, &content)? else {
            tracing::debug!(target: "aggregate", "({}) {} has no kind, skipped", name, manifest.display());
            report.without_kind += 1;
            continue;
        };

        let decision = filter.decide(&kind);
        tracing::debug!(
            target: "aggregate",
            "({}) {} kind={} decision={:?}",
            name,
            manifest.display(),
            kind,
            decision
        );

        if decision == KindDecision::Included {
            output.push_document(&content);
            report.included += 1;
        } else {
            report.excluded += 1;
        }
    }

    tracing::info!(
        target: "aggregate",
        "({}) {} manifest(s) included, {} excluded",
        name,
        report.included,
        report.excluded
    );
    Ok(report)
}
