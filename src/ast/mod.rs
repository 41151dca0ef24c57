//! Abstract Syntax Tree (AST) Types
//!
//! Architecture:
//!   Input → Lexer → Parser → AST → Executor → Command Registry → Output

pub mod types;

pub use types::*;
