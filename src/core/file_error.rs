//! Structured file system error handling
//!
//! Captures the operation, path and purpose at the call site instead of
//! parsing error messages after the fact.

use std::path::PathBuf;
use thiserror::Error;

/// The file system operation that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading a file
    Read,
    /// Writing a file
    Write,
    /// Creating a directory tree
    CreateDir,
    /// Copying a file or directory
    Copy,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::CreateDir => write!(f, "creating directory"),
            FileOperation::Copy => write!(f, "copying"),
        }
    }
}

/// A failed file operation together with where and why it was attempted.
#[derive(Error, Debug)]
#[error("File operation failed: {operation} {}", file_path.display())]
pub struct FileOperationError {
    /// What was attempted
    pub operation: FileOperation,
    /// The path involved
    pub file_path: PathBuf,
    /// Why the operation was attempted (e.g. "writing rendered manifest")
    pub purpose: String,
    /// Function that attempted it
    pub caller: String,
    /// Underlying I/O error
    #[source]
    pub source: std::io::Error,
}

impl FileOperationError {
    /// Build a user-oriented multi-line description of the failure.
    pub fn user_message(&self) -> String {
        let mut message = format!(
            "Failed {} '{}' for {} ({})",
            self.operation,
            self.file_path.display(),
            self.purpose,
            self.caller
        );

        match self.source.kind() {
            std::io::ErrorKind::NotFound => {
                message.push_str("\n\nThe path does not exist.");
                if self.purpose.contains("template") || self.purpose.contains("render") {
                    message.push_str("\nCheck `path` and `templatePattern` of the dependency.");
                }
            }
            std::io::ErrorKind::PermissionDenied => {
                message.push_str(&format!(
                    "\n\nPermission denied. Check file/directory permissions for: {}",
                    self.file_path.display()
                ));
            }
            std::io::ErrorKind::InvalidData => {
                message.push_str("\n\nThe file contains invalid data. Ensure it is UTF-8 text.");
            }
            _ => {
                message.push_str(&format!("\n\nError details: {}", self.source));
            }
        }

        message
    }
}

/// Extension trait attaching a [`FileOperation`] context to `io::Result`s.
pub trait FileResultExt<T> {
    /// Wrap the error (if any) in a [`FileOperationError`].
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        caller: impl Into<String>,
    ) -> Result<T, FileOperationError>;
}

impl<T> FileResultExt<T> for Result<T, std::io::Error> {
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        caller: impl Into<String>,
    ) -> Result<T, FileOperationError> {
        self.map_err(|source| FileOperationError {
            operation,
            file_path: file_path.into(),
            purpose: purpose.into(),
            caller: caller.into(),
            source,
        })
    }
}
