//! koma-shell - A small shell command language
//!
//! Lexes, parses and executes shell input (commands, pipelines, `<`/`>`/`>>`
//! redirects, `NAME=value` assignments and `$VAR` expansion) against a
//! pluggable command registry and virtual filesystem.

pub mod ast;
pub mod commands;
pub mod config;
pub mod fs;
pub mod interpreter;
pub mod parser;
pub mod shell;
pub mod terminal;

pub use ast::types::*;
pub use commands::{
    create_default_registry, Command, CommandContext, CommandRegistry, HandlerResult,
};
pub use interpreter::{Executor, HandlerError, RedirectError, ShellState};
pub use parser::{parse, tokenize, LexError, ParseError, Parser, SyntaxError, Token, TokenType};
pub use shell::{Shell, ShellOptions};
