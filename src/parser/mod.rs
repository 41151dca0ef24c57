//! Parser module for shell input
//!
//! This module contains the lexer and the recursive-descent parser.

pub mod types;
pub mod lexer;
pub mod parser;

// Re-exports
pub use types::{LexError, ParseError, SyntaxError};
pub use lexer::{tokenize, Lexer, Token, TokenType};
pub use parser::{parse, Parser};
