//! File System Types
//!
//! The virtual filesystem collaborator consumed by redirects and by
//! command handlers through their `CommandContext`.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("EISDIR: illegal operation on a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotDirectory { path: String, operation: String },
}

impl FsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }
}

/// How `write_file` treats an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and replace
    #[default]
    Write,
    Append,
}

/// File system entry types
#[derive(Debug, Clone)]
pub enum FsEntry {
    File { content: String },
    Directory,
}

impl FsEntry {
    pub fn is_file(&self) -> bool {
        matches!(self, FsEntry::File { .. })
    }
}

/// Options for mkdir operation
#[derive(Debug, Clone, Default)]
pub struct MkdirOptions {
    pub recursive: bool,
}

/// Initial files map type: path -> content
pub type InitialFiles = HashMap<String, String>;

/// Abstract filesystem interface that can be implemented by different backends.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read the contents of a file
    async fn read_file(&self, path: &str) -> Result<String, FsError>;

    /// Write content to a file, creating it (and its parents) if needed
    async fn write_file(&self, path: &str, content: &str, mode: WriteMode) -> Result<(), FsError>;

    /// Check if a path exists
    async fn exists(&self, path: &str) -> bool;

    /// Create a directory
    async fn mkdir(&self, path: &str, options: &MkdirOptions) -> Result<(), FsError>;

    /// Resolve a relative path against a base path
    fn resolve_path(&self, base: &str, path: &str) -> String;
}
