//! Execution Errors
//!
//! Errors local to a single statement. None of them abort a surrounding
//! sequence: the executor renders them into the current context and turns
//! them into an exit code.

use thiserror::Error;

use crate::fs::FsError;
use crate::interpreter::types::EXIT_FAILURE;

/// Error returned by a command handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
    pub exit_code: i32,
}

impl HandlerError {
    /// Failure with the default exit code of 1.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: EXIT_FAILURE,
        }
    }

    pub fn with_exit_code(message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }
}

impl From<FsError> for HandlerError {
    fn from(err: FsError) -> Self {
        Self::new(err.to_string())
    }
}

/// VFS failure while satisfying `<`, `>` or `>>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedirectError {
    #[error("{path}: cannot read input: {source}")]
    Input {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("{path}: cannot write output: {source}")]
    Output {
        path: String,
        #[source]
        source: FsError,
    },
}

impl RedirectError {
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}
