//! Error handling for the inflator
//!
//! This module provides the strongly-typed error enum used across the pipeline and the
//! user-facing error reporting layer used by the binary. Every failure in a run is fatal,
//! so the emphasis is on a single, precise diagnostic rather than on recovery.
//!
//! # Architecture
//!
//! - [`InflatorError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//! - [`user_friendly_error`] - Converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Error Categories
//!
//! The variants follow the four stages of a run:
//! - **Configuration**: [`InflatorError::ConfigNotFound`], [`InflatorError::ConfigParseError`],
//!   [`InflatorError::InvalidDependency`], [`InflatorError::DuplicateDependency`], ...
//! - **Fetch / workspace**: [`InflatorError::FetcherNotFound`], [`InflatorError::FetchFailed`],
//!   [`InflatorError::WorkspaceError`], [`InflatorError::CredentialError`]
//! - **Render**: template failures are reported through
//!   [`TemplateError`](crate::templating::TemplateError); the engine-independent
//!   [`InflatorError::HelperInputError`] covers malformed helper input.
//! - **Aggregation**: [`InflatorError::ManifestParseError`], [`InflatorError::InvalidManifest`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use inflator_cli::core::{InflatorError, ErrorContext, user_friendly_error};
//!
//! let error = InflatorError::FetcherNotFound {
//!     program: "go-getter".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for inflator operations
///
/// Each variant carries the names, paths and URIs needed to point the user at the
/// offending input. Variants are grouped by the stage of the run that produces them.
#[derive(Error, Debug)]
pub enum InflatorError {
    /// Run configuration file does not exist or cannot be opened
    #[error("Run configuration not found: {path}")]
    ConfigNotFound {
        /// Path that was passed on the command line
        path: String,
    },

    /// Run configuration is not valid YAML or does not match the expected shape
    #[error("Invalid run configuration in {file}")]
    ConfigParseError {
        /// The configuration file
        file: String,
        /// Parser message
        reason: String,
    },

    /// Run configuration parsed but is semantically invalid
    #[error("Run configuration validation failed: {reason}")]
    ConfigValidationError {
        /// What is wrong
        reason: String,
    },

    /// A dependency record is invalid
    #[error("Invalid dependency specification for '{name}': {reason}")]
    InvalidDependency {
        /// Dependency name (or its position when the name is missing)
        name: String,
        /// What is wrong
        reason: String,
    },

    /// Two dependencies share the same name
    #[error("Dependency name '{name}' is declared more than once")]
    DuplicateDependency {
        /// The duplicated name
        name: String,
    },

    /// A file pattern does not compile
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as written
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Configuration value outside of its allowed set
    #[error("Invalid value '{value}' for {field}: expected one of {expected}")]
    InvalidSetting {
        /// Field or environment variable name
        field: String,
        /// The rejected value
        value: String,
        /// Allowed values
        expected: String,
    },

    /// The external transfer program is not on `PATH`
    ///
    /// Remote sources are fetched through an external program (by default `go-getter`).
    /// Local sources are copied natively and never need it.
    #[error("Fetch program '{program}' is not installed or not found in PATH")]
    FetcherNotFound {
        /// Program name or path
        program: String,
    },

    /// The transfer collaborator failed to populate a cache slot
    #[error("Failed to fetch dependency '{name}' from {source_uri}")]
    FetchFailed {
        /// Dependency name
        name: String,
        /// Source URI with credentials redacted
        source_uri: String,
        /// Output of the failing transfer
        reason: String,
    },

    /// A credential reference could not be resolved
    #[error("Failed to read credential file '{path}'")]
    CredentialError {
        /// Credential file path
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// Creating, clearing or removing a workspace directory failed
    #[error("Workspace error while {operation}: {path}")]
    WorkspaceError {
        /// What was being done
        operation: String,
        /// Directory involved
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// A template helper received malformed input
    #[error("Template helper '{helper}' received malformed input: {reason}")]
    HelperInputError {
        /// Helper name
        helper: String,
        /// Decoder message
        reason: String,
    },

    /// A rendered manifest is not valid YAML
    #[error("Failed to parse rendered manifest {path}")]
    ManifestParseError {
        /// Rendered file
        path: String,
        /// Parser message
        reason: String,
    },

    /// A rendered manifest parsed but has an unusable shape
    #[error("Invalid rendered manifest {path}: {reason}")]
    InvalidManifest {
        /// Rendered file
        path: String,
        /// What is wrong
        reason: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for InflatorError {
    fn clone(&self) -> Self {
        match self {
            Self::ConfigNotFound {
                path,
            } => Self::ConfigNotFound {
                path: path.clone(),
            },
            Self::ConfigParseError {
                file,
                reason,
            } => Self::ConfigParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ConfigValidationError {
                reason,
            } => Self::ConfigValidationError {
                reason: reason.clone(),
            },
            Self::InvalidDependency {
                name,
                reason,
            } => Self::InvalidDependency {
                name: name.clone(),
                reason: reason.clone(),
            },
            Self::DuplicateDependency {
                name,
            } => Self::DuplicateDependency {
                name: name.clone(),
            },
            Self::InvalidPattern {
                pattern,
                reason,
            } => Self::InvalidPattern {
                pattern: pattern.clone(),
                reason: reason.clone(),
            },
            Self::InvalidSetting {
                field,
                value,
                expected,
            } => Self::InvalidSetting {
                field: field.clone(),
                value: value.clone(),
                expected: expected.clone(),
            },
            Self::FetcherNotFound {
                program,
            } => Self::FetcherNotFound {
                program: program.clone(),
            },
            Self::FetchFailed {
                name,
                source_uri,
                reason,
            } => Self::FetchFailed {
                name: name.clone(),
                source_uri: source_uri.clone(),
                reason: reason.clone(),
            },
            Self::CredentialError {
                path,
                reason,
            } => Self::CredentialError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::WorkspaceError {
                operation,
                path,
                reason,
            } => Self::WorkspaceError {
                operation: operation.clone(),
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::HelperInputError {
                helper,
                reason,
            } => Self::HelperInputError {
                helper: helper.clone(),
                reason: reason.clone(),
            },
            Self::ManifestParseError {
                path,
                reason,
            } => Self::ManifestParseError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::InvalidManifest {
                path,
                reason,
            } => Self::InvalidManifest {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show the main message in red, optional details in yellow and
/// an optional suggestion in green.
///
/// ```rust,no_run
/// use inflator_cli::core::{InflatorError, ErrorContext};
///
/// let context = ErrorContext::new(InflatorError::DuplicateDependency {
///     name: "nginx".to_string(),
/// })
/// .with_suggestion("Rename one of the dependencies")
/// .with_details("Dependency names select the cache slot and must be unique");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: InflatorError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: InflatorError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// Stdout is reserved for the output document stream, so diagnostics always go to stderr.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`InflatorError`] variants, file operation errors, template errors and
/// plain I/O errors. Anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(inflator_error) = error.downcast_ref::<InflatorError>() {
        return create_error_context(inflator_error.clone());
    }

    if let Some(template_error) = error.downcast_ref::<crate::templating::TemplateError>() {
        return ErrorContext::new(InflatorError::Other {
            message: template_error.to_string(),
        })
        .with_details(template_error.format_with_context())
        .with_suggestion(
            "Templates are trusted build inputs: fix the template in the dependency source, \
             or add the missing key under `values` in the run configuration",
        );
    }

    if let Some(file_error) = error.downcast_ref::<super::file_error::FileOperationError>() {
        return ErrorContext::new(InflatorError::Other {
            message: file_error.to_string(),
        })
        .with_details(file_error.user_message());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(InflatorError::WorkspaceError {
                    operation: "accessing files".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check ownership and permissions of the workspace and cache root")
                .with_details(
                    "This error occurs when the inflator cannot read or write a workspace file",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(InflatorError::WorkspaceError {
                    operation: "accessing files".to_string(),
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(InflatorError::Other {
        message,
    })
}

/// Map each [`InflatorError`] variant to a context with tailored suggestions.
fn create_error_context(error: InflatorError) -> ErrorContext {
    match &error {
        InflatorError::ConfigNotFound { path } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Check that '{path}' exists and is readable"))
            .with_details("The inflator takes the path of its run configuration as its only argument"),

        InflatorError::ConfigParseError { file, reason } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check the YAML syntax in {file}. `dependencies` must be a list and `values` a mapping"
            ))
            .with_details(reason.clone()),

        InflatorError::DuplicateDependency { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Give every dependency a unique `name`")
            .with_details("The dependency name selects the on-disk cache slot"),

        InflatorError::FetcherNotFound { program } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Install '{program}' or point INFLATOR_FETCHER / --fetcher at a compatible program"
            ))
            .with_details("Remote dependencies are fetched with `<program> <source> <destination>`"),

        InflatorError::FetchFailed { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion(
                "Check the `repo` URI and your access to it. Rerun with `pull: always` \
                 (or INFLATOR_PULL=always) to force a clean fetch",
            )
            .with_details(reason.clone()),

        InflatorError::CredentialError { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion("Check the `sshkey=<path>` entry in `repoCreds`")
            .with_details(reason.clone()),

        InflatorError::WorkspaceError { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion(
                "Check permissions of the cache root. A half-cleaned cache slot can be removed by hand",
            )
            .with_details(reason.clone()),

        InflatorError::ManifestParseError { reason, .. } => ErrorContext::new(error.clone())
            .with_suggestion("The template producing this file renders invalid YAML; fix the template")
            .with_details(reason.clone()),

        _ => ErrorContext::new(error.clone()),
    }
}
