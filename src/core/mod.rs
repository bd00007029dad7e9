//! Core types shared by every stage of the pipeline.
//!
//! - [`error`] - [`InflatorError`], [`ErrorContext`] and the user-facing conversion
//! - [`file_error`] - file operation context attached to I/O failures

pub mod error;
pub mod file_error;

pub use error::{ErrorContext, InflatorError, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
