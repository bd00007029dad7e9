//! Template rendering engine with Tera.

use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use strsim::levenshtein;
use tera::{Context as TeraContext, Tera};

use super::error::{ErrorLocation, TemplateError};
use super::filters;
use crate::cache::ResolvedDependency;
use crate::constants::{DEFAULT_MANIFEST_EXTENSION, RENDER_MARKER};
use crate::core::{FileOperation, FileResultExt, InflatorError};
use crate::pattern::PatternMatcher;
use crate::values::FlatValues;

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Lines shown before and after the failing line.
const CONTEXT_LINES: usize = 3;

static VARIABLE_NOT_FOUND: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"Variable `([^`]+)` not found").ok());

static PARSE_POSITION: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"--> (\d+):(\d+)").ok());

/// The outcome of rendering one template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Template that was rendered
    pub source: PathBuf,
    /// Sibling file the output was written to
    pub destination: PathBuf,
    /// Rendered text
    pub content: String,
}

/// Destination of a rendered template.
///
/// The template extension is stripped. A remaining `.yaml`/`.yml` extension gets the render
/// marker inserted before it; anything else gets `.rendered.yaml` appended:
///
/// - `deploy.yaml.tpl` → `deploy.rendered.yaml`
/// - `config.yml.gotmpl` → `config.rendered.yml`
/// - `service.tmpl` → `service.rendered.yaml`
#[must_use]
pub fn rendered_destination(template: &Path) -> PathBuf {
    let base = template.with_extension("");
    let yaml_extension = base
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .filter(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    match yaml_extension {
        Some(extension) => base.with_extension(format!("{RENDER_MARKER}.{extension}")),
        None => {
            let file_name = base.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            base.with_file_name(format!("{file_name}.{RENDER_MARKER}.{DEFAULT_MANIFEST_EXTENSION}"))
        }
    }
}

/// Renders templates against the flattened values of a run.
///
/// Every render uses a fresh Tera instance with the helper filters registered, so rendering
/// the same template twice with the same values produces identical bytes. Undefined
/// variables are errors.
pub struct TemplateRenderer {
    context: TeraContext,
    variables: Vec<String>,
}

impl TemplateRenderer {
    /// Build a renderer whose context holds every flattened value as a top-level variable.
    pub fn new(values: &FlatValues) -> Result<Self> {
        let mut context = TeraContext::new();
        for (key, value) in values {
            context.try_insert(key.as_str(), value).map_err(|e| InflatorError::Other {
                message: format!("Value '{key}' cannot be used in templates: {e}"),
            })?;
        }

        Ok(Self {
            context,
            variables: values.keys().cloned().collect(),
        })
    }

    /// Names of all variables available to templates.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Render template text.
    pub fn render_str(
        &self,
        template_content: &str,
        location: ErrorLocation,
    ) -> Result<String, TemplateError> {
        let mut tera = Tera::default();
        filters::register_all(&mut tera);

        tera.render_str(template_content, &self.context)
            .map_err(|e| self.parse_tera_error(&e, template_content, location))
    }

    /// Render one template file and write the result next to it.
    pub fn render_file(&self, template: &Path, dependency: &str) -> Result<RenderedArtifact> {
        let content = std::fs::read_to_string(template).with_file_context(
            FileOperation::Read,
            template,
            "reading template",
            "templating::render_file",
        )?;

        let location = ErrorLocation {
            dependency: dependency.to_string(),
            file_path: Some(template.to_path_buf()),
            ..ErrorLocation::default()
        };
        let rendered = self.render_str(&content, location)?;

        let destination = rendered_destination(template);
        std::fs::write(&destination, &rendered).with_file_context(
            FileOperation::Write,
            &destination,
            "writing rendered manifest",
            "templating::render_file",
        )?;

        tracing::debug!(
            target: "render",
            "({}) Rendered {} -> {}",
            dependency,
            template.display(),
            destination.display()
        );

        Ok(RenderedArtifact {
            source: template.to_path_buf(),
            destination,
            content: rendered,
        })
    }

    /// Render every template of a dependency.
    ///
    /// A dependency without matching templates (or without a directory) renders nothing.
    /// Two templates rendering to the same file (`deploy.yaml.tpl` and `deploy.yaml.tmpl`)
    /// are rejected before anything is written.
    pub fn render_dependency(&self, dependency: &ResolvedDependency) -> Result<Vec<RenderedArtifact>> {
        let matcher = PatternMatcher::new(&dependency.spec.template_glob)?;
        let templates = matcher.find_matches(&dependency.resolved_dir)?;

        let mut destinations: HashMap<PathBuf, &PathBuf> = HashMap::new();
        for template in &templates {
            if let Some(previous) = destinations.insert(rendered_destination(template), template) {
                return Err(InflatorError::InvalidDependency {
                    name: dependency.name().to_string(),
                    reason: format!(
                        "templates {} and {} both render to {}",
                        previous.display(),
                        template.display(),
                        rendered_destination(template).display()
                    ),
                }
                .into());
            }
        }

        if templates.is_empty() {
            tracing::debug!(
                target: "render",
                "({}) No templates matching '{}' in {}",
                dependency.name(),
                matcher.pattern(),
                dependency.resolved_dir.display()
            );
        }

        let artifacts = templates
            .iter()
            .map(|template| self.render_file(template, dependency.name()))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            target: "render",
            "({}) Rendered {} template(s)",
            dependency.name(),
            artifacts.len()
        );
        Ok(artifacts)
    }

    fn parse_tera_error(
        &self,
        error: &tera::Error,
        template_content: &str,
        mut location: ErrorLocation,
    ) -> TemplateError {
        let chain = error_chain(error);

        location.line_number = chain.iter().find_map(|msg| extract_line(msg));
        location.context_lines = location
            .line_number
            .map(|line| extract_context_lines(template_content, line, CONTEXT_LINES))
            .filter(|lines| !lines.is_empty());

        if let Some(variable) = chain.iter().find_map(|msg| extract_variable_name(msg)) {
            let suggestions = find_similar_variables(&variable, &self.variables);
            return TemplateError::VariableNotFound {
                variable,
                suggestions: Box::new(suggestions),
                location: Box::new(location),
            };
        }

        TemplateError::SyntaxError {
            message: format_tera_error(&chain),
            location: Box::new(location),
        }
    }
}

fn error_chain(error: &tera::Error) -> Vec<String> {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }
    messages
}

fn extract_variable_name(message: &str) -> Option<String> {
    let re = VARIABLE_NOT_FOUND.as_ref()?;
    re.captures(message).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

fn extract_line(message: &str) -> Option<usize> {
    let re = PARSE_POSITION.as_ref()?;
    re.captures(message).and_then(|caps| caps.get(1)).and_then(|m| m.as_str().parse().ok())
}

fn find_similar_variables(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> = available.iter().map(|var| (var, levenshtein(target, var))).collect();
    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    scored
        .into_iter()
        .filter(|(_, distance)| *distance <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(var, _)| var.clone())
        .collect()
}

fn extract_context_lines(content: &str, error_line: usize, context_size: usize) -> Vec<(usize, String)> {
    let lines: Vec<&str> = content.lines().collect();
    if error_line == 0 || error_line > lines.len() {
        return Vec::new();
    }

    let start = error_line.saturating_sub(context_size + 1);
    let end = (error_line + context_size).min(lines.len());
    lines[start..end].iter().enumerate().map(|(idx, line)| (start + idx + 1, (*line).to_string())).collect()
}

/// Join the useful parts of a Tera error chain, dropping the internal one-off template name.
fn format_tera_error(chain: &[String]) -> String {
    let messages: Vec<String> = chain
        .iter()
        .map(|msg| {
            msg.replace("while rendering '__tera_one_off'", "")
                .replace("Failed to render '__tera_one_off'", "")
                .replace("Failed to parse '__tera_one_off'", "")
                .replace("'__tera_one_off'", "template")
                .trim()
                .to_string()
        })
        .filter(|msg| !msg.is_empty())
        .collect();

    if messages.is_empty() {
        "Template rendering failed".to_string()
    } else {
        messages.join("\n  -> ")
    }
}
