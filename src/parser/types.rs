//! Parser Types
//!
//! Error types shared by the lexer and the parser. Both abort the whole
//! input line: no tokens and no partial AST survive a failure.

use thiserror::Error;

use crate::parser::lexer::Token;

// Parser limits to reject pathological input before any work is done
pub const MAX_INPUT_SIZE: usize = 1_000_000; // 1MB max input
pub const MAX_TOKENS: usize = 100_000;

/// Error raised by the lexer on unterminated quotes or `${...}` references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lex error at {line}:{column}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl LexError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Error raised by the parser on malformed grammar.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Parse error at {line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub token: Option<Token>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            token: None,
        }
    }

    pub fn with_token(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            line: token.line,
            column: token.column,
            token: Some(token.clone()),
        }
    }
}

/// Any failure that prevents a line from reaching the executor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// The bare diagnostic, without the position prefix.
    pub fn message(&self) -> &str {
        match self {
            SyntaxError::Lex(e) => &e.message,
            SyntaxError::Parse(e) => &e.message,
        }
    }
}
