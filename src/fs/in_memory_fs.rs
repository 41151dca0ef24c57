//! In-Memory File System Implementation
//!
//! A pure in-memory virtual file system for the shell session.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::*;

/// In-memory virtual file system.
pub struct InMemoryFs {
    data: RwLock<HashMap<String, FsEntry>>,
}

impl InMemoryFs {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        let mut data = HashMap::new();
        data.insert("/".to_string(), FsEntry::Directory);
        Self { data: RwLock::new(data) }
    }

}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Path utilities (free functions operating on HashMap directly)
// ============================================================================

fn normalize_path(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }
    let parts = path.split('/').filter(|p| !p.is_empty() && *p != ".");
    let mut resolved: Vec<&str> = Vec::new();
    for part in parts {
        if part == ".." {
            resolved.pop();
        } else {
            resolved.push(part);
        }
    }
    if resolved.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", resolved.join("/"))
    }
}

fn dirname(path: &str) -> String {
    let normalized = normalize_path(path);
    match normalized.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => normalized[..pos].to_string(),
    }
}

/// Create missing parent directories; fails if a parent is a file.
fn ensure_parent_dirs(
    data: &mut HashMap<String, FsEntry>,
    path: &str,
    original: &str,
) -> Result<(), FsError> {
    let dir = dirname(path);
    if dir == "/" {
        return Ok(());
    }
    match data.get(&dir) {
        Some(FsEntry::Directory) => Ok(()),
        Some(FsEntry::File { .. }) => Err(FsError::NotDirectory {
            path: original.to_string(),
            operation: "open".to_string(),
        }),
        None => {
            ensure_parent_dirs(data, &dir, original)?;
            data.insert(dir, FsEntry::Directory);
            Ok(())
        }
    }
}

// ============================================================================
// FileSystem trait implementation
// ============================================================================

#[async_trait]
impl FileSystem for InMemoryFs {
    async fn read_file(&self, path: &str) -> Result<String, FsError> {
        let data = self.data.read().await;
        match data.get(&normalize_path(path)) {
            Some(FsEntry::File { content }) => Ok(content.clone()),
            Some(FsEntry::Directory) => Err(FsError::IsDirectory {
                path: path.to_string(),
                operation: "read".to_string(),
            }),
            None => Err(FsError::NotFound {
                path: path.to_string(),
                operation: "open".to_string(),
            }),
        }
    }

    async fn write_file(&self, path: &str, content: &str, mode: WriteMode) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        let normalized = normalize_path(path);

        let existing = match data.get(&normalized) {
            Some(FsEntry::Directory) => {
                return Err(FsError::IsDirectory {
                    path: path.to_string(),
                    operation: "write".to_string(),
                })
            }
            Some(FsEntry::File { content }) if mode == WriteMode::Append => content.clone(),
            _ => String::new(),
        };

        ensure_parent_dirs(&mut data, &normalized, path)?;
        data.insert(normalized, FsEntry::File {
            content: existing + content,
        });
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        let data = self.data.read().await;
        data.contains_key(&normalize_path(path))
    }

    async fn mkdir(&self, path: &str, options: &MkdirOptions) -> Result<(), FsError> {
        let mut data = self.data.write().await;
        let normalized = normalize_path(path);

        if let Some(entry) = data.get(&normalized) {
            if entry.is_file() || !options.recursive {
                return Err(FsError::AlreadyExists {
                    path: path.to_string(),
                    operation: "mkdir".to_string(),
                });
            }
            return Ok(());
        }

        let parent = dirname(&normalized);
        if parent != "/" && !data.contains_key(&parent) {
            if !options.recursive {
                return Err(FsError::NotFound {
                    path: path.to_string(),
                    operation: "mkdir".to_string(),
                });
            }
            ensure_parent_dirs(&mut data, &normalized, path)?;
        }

        data.insert(normalized, FsEntry::Directory);
        Ok(())
    }

    fn resolve_path(&self, base: &str, path: &str) -> String {
        if path.starts_with('/') {
            normalize_path(path)
        } else {
            normalize_path(&format!("{}/{}", base, path))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
