//! Lexer for Shell Input
//!
//! The lexer turns a line (or a multi-line script) into a flat token stream
//! that the parser consumes. It handles:
//! - Operators (`|`, `;`, `<`, `>`, `>>`) with or without surrounding spaces
//! - Words, including `NAME=value` assignment words
//! - Single quotes (verbatim) and double quotes (`\"` and `\\` unescaped)
//! - Variable references: `$NAME`, `${NAME}`, `$?`, `$#`, `$@`, `$0`
//! - Comments starting at a token boundary
//!
//! Every token carries its char offset, 1-based line and 0-based column.

use std::fmt;

use crate::parser::types::LexError;

/// Token types for the shell lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Word,
    /// Quoted text, already unescaped
    String,
    /// Variable reference; the value is the bare name
    Variable,
    /// Raw `NAME=value` text
    Assignment,
    Pipe,           // |
    Semicolon,      // ;
    Newline,
    RedirectIn,     // <
    RedirectOut,    // >
    RedirectAppend, // >>
    Eof,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "WORD",
            Self::String => "STRING",
            Self::Variable => "VARIABLE",
            Self::Assignment => "ASSIGNMENT",
            Self::Pipe => "PIPE",
            Self::Semicolon => "SEMICOLON",
            Self::Newline => "NEWLINE",
            Self::RedirectIn => "REDIRECT_IN",
            Self::RedirectOut => "REDIRECT_OUT",
            Self::RedirectAppend => "REDIRECT_APPEND",
            Self::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    /// Char offset of the first character in the input
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        value: impl Into<String>,
        position: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            token_type,
            value: value.into(),
            position,
            line,
            column,
        }
    }

    /// Text used when quoting this token in a diagnostic.
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Eof => "end of input".to_string(),
            TokenType::Newline => "newline".to_string(),
            TokenType::Variable => format!("'${}'", self.value),
            _ => format!("'{}'", self.value),
        }
    }
}

/// Names that may follow a bare `$` without braces
const SPECIAL_VARIABLES: &[char] = &['?', '#', '@', '0'];

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

/// Check if a string is a valid variable name
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Check if the unquoted prefix of a word reads `NAME=`.
fn is_assignment_prefix(s: &str) -> bool {
    match s.find('=') {
        Some(eq) => is_valid_name(&s[..eq]),
        None => false,
    }
}

/// Check if a character is a word boundary (ends a word token)
fn is_word_boundary(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | ';' | '|' | '<' | '>')
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input. The result always ends with one EOF token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let len = self.input.len();

        while self.pos < len {
            self.skip_whitespace();

            if self.pos >= len {
                break;
            }

            if let Some(token) = self.next_token()? {
                self.tokens.push(token);
            }
        }

        self.tokens.push(Token::new(
            TokenType::Eof,
            "",
            self.pos,
            self.line,
            self.column,
        ));

        log::trace!("tokenized {} tokens", self.tokens.len());
        Ok(self.tokens)
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\\' if self.peek(1) == Some('\n') => {
                    // Line continuation
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let start = self.pos;
        let line = self.line;
        let column = self.column;

        let c0 = match self.current() {
            Some(c) => c,
            None => return Ok(None),
        };

        let op = |token_type: TokenType, value: &str| {
            Some(Token::new(token_type, value, start, line, column))
        };

        match c0 {
            '#' => {
                self.skip_comment();
                Ok(None)
            }
            '\n' => {
                self.advance();
                Ok(op(TokenType::Newline, "\n"))
            }
            '|' => {
                self.advance();
                Ok(op(TokenType::Pipe, "|"))
            }
            ';' => {
                self.advance();
                Ok(op(TokenType::Semicolon, ";"))
            }
            '<' => {
                self.advance();
                Ok(op(TokenType::RedirectIn, "<"))
            }
            '>' if self.peek(1) == Some('>') => {
                self.advance();
                self.advance();
                Ok(op(TokenType::RedirectAppend, ">>"))
            }
            '>' => {
                self.advance();
                Ok(op(TokenType::RedirectOut, ">"))
            }
            '$' => self.read_variable(start, line, column).map(Some),
            _ => self.read_word(start, line, column).map(Some),
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.current() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Read `$NAME`, `${NAME}` or a special variable. A `$` that starts
    /// neither falls through to an ordinary word containing the `$`.
    fn read_variable(
        &mut self,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token, LexError> {
        match self.peek(1) {
            Some('{') => {
                self.advance();
                self.advance();
                let mut name = String::new();
                loop {
                    match self.advance() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(LexError::new(
                                "Unterminated variable reference",
                                line,
                                column,
                            ))
                        }
                    }
                }
                let name = name.trim().to_string();
                let special =
                    name.len() == 1 && name.chars().all(|c| SPECIAL_VARIABLES.contains(&c));
                if !is_valid_name(&name) && !special {
                    return Err(LexError::new(
                        format!("Bad variable reference: ${{{}}}", name),
                        line,
                        column,
                    ));
                }
                Ok(Token::new(TokenType::Variable, name, start, line, column))
            }
            Some(c) if SPECIAL_VARIABLES.contains(&c) => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenType::Variable, c.to_string(), start, line, column))
            }
            Some(c) if is_name_start(c) => {
                self.advance();
                let mut name = String::new();
                while let Some(c) = self.current() {
                    if !is_name_char(c) {
                        break;
                    }
                    name.push(c);
                    self.advance();
                }
                Ok(Token::new(TokenType::Variable, name, start, line, column))
            }
            _ => self.read_word(start, line, column),
        }
    }

    /// Read a word up to the next boundary. Quoted segments and backslash
    /// escapes are resolved in place. An unquoted `$` that starts a variable
    /// reference ends the word, except inside an assignment value where it
    /// stays literal.
    fn read_word(&mut self, start: usize, line: usize, column: usize) -> Result<Token, LexError> {
        let mut value = String::new();
        // Text read before the first quote or escape; decides ASSIGNMENT
        let mut bare_prefix: Option<String> = None;
        let mut quoted = false;

        while let Some(c) = self.current() {
            if is_word_boundary(c) {
                break;
            }
            if c == '$'
                && (quoted || !value.is_empty())
                && self.starts_variable()
                && !is_assignment_prefix(bare_prefix.as_deref().unwrap_or(&value))
            {
                break;
            }
            match c {
                '\'' => {
                    bare_prefix.get_or_insert_with(|| value.clone());
                    quoted = true;
                    self.read_single_quoted(&mut value)?;
                }
                '"' => {
                    bare_prefix.get_or_insert_with(|| value.clone());
                    quoted = true;
                    self.read_double_quoted(&mut value)?;
                }
                '\\' => {
                    bare_prefix.get_or_insert_with(|| value.clone());
                    self.advance();
                    match self.advance() {
                        Some('\n') => {}
                        Some(escaped) => {
                            quoted = true;
                            value.push(escaped);
                        }
                        None => value.push('\\'),
                    }
                }
                _ => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        let prefix = bare_prefix.as_deref().unwrap_or(&value);
        let token_type = if is_assignment_prefix(prefix) {
            TokenType::Assignment
        } else if quoted {
            TokenType::String
        } else {
            TokenType::Word
        };

        Ok(Token::new(token_type, value, start, line, column))
    }

    /// Whether the `$` at the current position begins `$NAME`, `${` or a
    /// special variable.
    fn starts_variable(&self) -> bool {
        matches!(
            self.peek(1),
            Some(c) if c == '{' || is_name_start(c) || SPECIAL_VARIABLES.contains(&c)
        )
    }

    fn read_single_quoted(&mut self, out: &mut String) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        self.advance();
        loop {
            match self.advance() {
                Some('\'') => return Ok(()),
                Some(c) => out.push(c),
                None => return Err(LexError::new("Unterminated single quote", line, column)),
            }
        }
    }

    fn read_double_quoted(&mut self, out: &mut String) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        self.advance();
        loop {
            match self.advance() {
                Some('"') => return Ok(()),
                Some('\\') => match self.current() {
                    Some(c @ ('"' | '\\')) => {
                        out.push(c);
                        self.advance();
                    }
                    _ => out.push('\\'),
                },
                Some(c) => out.push(c),
                None => return Err(LexError::new("Unterminated double quote", line, column)),
            }
        }
    }
}
