//! Structured template errors.
//!
//! Every render failure carries the template path and the dependency it belongs to, so the
//! diagnostic points at the exact file inside the fetched tree.

use std::path::PathBuf;

/// Where a template error happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorLocation {
    /// Dependency owning the template
    pub dependency: String,
    /// Template file, when rendering from disk
    pub file_path: Option<PathBuf>,
    /// 1-based line number, when the engine reports one
    pub line_number: Option<usize>,
    /// Lines surrounding the error as `(line number, text)`
    pub context_lines: Option<Vec<(usize, String)>>,
}

/// A failed template render.
#[derive(Debug)]
pub enum TemplateError {
    /// The template references a variable absent from the values
    VariableNotFound {
        /// Variable as written in the template
        variable: String,
        /// Closest known variable names
        suggestions: Box<Vec<String>>,
        /// Where it happened
        location: Box<ErrorLocation>,
    },

    /// Parse error, unknown filter, failing helper and everything else the engine reports
    SyntaxError {
        /// Cleaned engine message
        message: String,
        /// Where it happened
        location: Box<ErrorLocation>,
    },
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::VariableNotFound {
                variable,
                location,
                ..
            } => {
                write!(f, "Template variable not found: '{variable}'")?;
                write_origin(f, location)
            }
            TemplateError::SyntaxError {
                message,
                location,
            } => {
                write!(f, "Template error: {message}")?;
                write_origin(f, location)
            }
        }
    }
}

fn write_origin(f: &mut std::fmt::Formatter<'_>, location: &ErrorLocation) -> std::fmt::Result {
    match &location.file_path {
        Some(path) => write!(f, " in {} (dependency '{}')", path.display(), location.dependency),
        None => write!(f, " (dependency '{}')", location.dependency),
    }
}

impl std::error::Error for TemplateError {}

impl TemplateError {
    /// The error location.
    #[must_use]
    pub fn location(&self) -> &ErrorLocation {
        match self {
            TemplateError::VariableNotFound {
                location,
                ..
            }
            | TemplateError::SyntaxError {
                location,
                ..
            } => location,
        }
    }

    /// Multi-line description with location, source excerpt and suggestions.
    pub fn format_with_context(&self) -> String {
        match self {
            TemplateError::VariableNotFound {
                variable,
                suggestions,
                location,
            } => format_variable_not_found_error(variable, suggestions, location),
            TemplateError::SyntaxError {
                message,
                location,
            } => format_syntax_error(message, location),
        }
    }
}

fn format_location(msg: &mut String, location: &ErrorLocation) {
    msg.push_str(&format!("Dependency: {}\n", location.dependency));
    if let Some(path) = &location.file_path {
        msg.push_str(&format!("Template: {}\n", path.display()));
    }
    if let Some(line) = location.line_number {
        msg.push_str(&format!("Line: {line}\n"));
    }
}

fn format_context_lines(msg: &mut String, location: &ErrorLocation) {
    let Some(lines) = &location.context_lines else {
        return;
    };

    msg.push('\n');
    for (number, text) in lines {
        let marker = if Some(*number) == location.line_number {
            ">"
        } else {
            " "
        };
        msg.push_str(&format!("{marker} {number:>4} | {text}\n"));
    }
}

fn format_variable_not_found_error(
    variable: &str,
    suggestions: &[String],
    location: &ErrorLocation,
) -> String {
    let mut msg = String::new();

    msg.push_str(&format!("Variable: {variable}\n"));
    format_location(&mut msg, location);
    format_context_lines(&mut msg, location);

    if !suggestions.is_empty() {
        msg.push_str("\nDid you mean one of these?\n");
        for suggestion in suggestions {
            msg.push_str(&format!("  - {suggestion}\n"));
        }
    }

    msg.push_str(
        "\nValues are flattened: `a: {b: {c: 1}}` under `values` is available as `a_b_c`.\n",
    );
    msg
}

fn format_syntax_error(message: &str, location: &ErrorLocation) -> String {
    let mut msg = String::new();

    msg.push_str(&format!("Error: {message}\n"));
    format_location(&mut msg, location);
    format_context_lines(&mut msg, location);

    msg.push_str("\nCommon issues:\n");
    msg.push_str("  - Unclosed {{ }} or {% %} delimiters\n");
    msg.push_str("  - Unknown filter names (helpers: to_yaml, handle_env_vars, nindent, indent)\n");
    msg.push_str("  - Malformed JSON passed to handle_env_vars\n");
    msg
}
