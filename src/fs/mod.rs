//! File System Module
//!
//! Virtual file system abstractions for the shell session.
//! - InMemoryFs: Pure in-memory file system (default)

pub mod types;
pub mod in_memory_fs;

pub use types::*;
pub use in_memory_fs::InMemoryFs;
