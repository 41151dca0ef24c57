//! Recursive Descent Parser for Shell Input
//!
//! This parser consumes tokens from the lexer and produces a single root
//! AST node per input. Any error aborts the whole line.
//!
//! Grammar:
//!   program    ::= sequence
//!   sequence   ::= statement ((';' | NEWLINE) statement)*
//!   statement  ::= ASSIGNMENT+ | redirected
//!   redirected ::= pipeline (('<' | '>' | '>>') filename)*
//!   pipeline   ::= command ('|' command)*
//!   command    ::= WORD arg*
//!   arg        ::= WORD | STRING | VARIABLE | ASSIGNMENT

use crate::ast::types::{
    Argument, AstNode, CommandNode, CompoundBody, CompoundNode, OutputMode, PipelineNode,
    Redirects, SequenceNode, VariableNode, AST,
};
use crate::parser::lexer::{Lexer, Token, TokenType};
use crate::parser::types::{ParseError, SyntaxError, MAX_INPUT_SIZE, MAX_TOKENS};

/// Parse a line of shell input into its root node.
pub fn parse(input: &str) -> Result<AstNode, SyntaxError> {
    Parser::new().parse(input)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            tokens: Vec::new(),
            pos: 0,
        }
    }

    /// Tokenize and parse a shell string
    pub fn parse(&mut self, input: &str) -> Result<AstNode, SyntaxError> {
        if input.len() > MAX_INPUT_SIZE {
            return Err(ParseError::new(
                format!(
                    "Input too large: {} bytes exceeds limit of {}",
                    input.len(),
                    MAX_INPUT_SIZE
                ),
                1,
                0,
            )
            .into());
        }

        let tokens = Lexer::new(input).tokenize()?;
        Ok(self.parse_tokens(tokens)?)
    }

    /// Parse from pre-tokenized input
    pub fn parse_tokens(&mut self, tokens: Vec<Token>) -> Result<AstNode, ParseError> {
        if tokens.len() > MAX_TOKENS {
            return Err(ParseError::new(
                format!("Too many tokens: {} exceeds limit of {}", tokens.len(), MAX_TOKENS),
                1,
                0,
            ));
        }

        self.tokens = tokens;
        self.pos = 0;
        self.parse_program()
    }

    // ===========================================================================
    // HELPER METHODS
    // ===========================================================================

    fn current(&self) -> Token {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(token) => token.clone(),
            None => Token::new(TokenType::Eof, "", 0, 1, 0),
        }
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, types: &[TokenType]) -> bool {
        let current_type = self.tokens.get(self.pos).map(|t| t.token_type);
        match current_type {
            Some(t) => types.contains(&t),
            // Running off the end reads as EOF
            None => types.contains(&TokenType::Eof),
        }
    }

    fn error<T>(&self, message: &str) -> Result<T, ParseError> {
        Err(ParseError::with_token(message, &self.current()))
    }

    fn skip_separators(&mut self) {
        while self.check(&[TokenType::Semicolon, TokenType::Newline]) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&[TokenType::Newline]) {
            self.advance();
        }
    }

    fn is_statement_end(&self) -> bool {
        self.check(&[TokenType::Eof, TokenType::Semicolon, TokenType::Newline])
    }

    fn is_word(&self) -> bool {
        self.check(&[TokenType::Word, TokenType::String])
    }

    // ===========================================================================
    // GRAMMAR
    // ===========================================================================

    fn parse_program(&mut self) -> Result<AstNode, ParseError> {
        let mut statements = Vec::new();

        loop {
            self.skip_separators();
            if self.check(&[TokenType::Eof]) {
                break;
            }

            self.parse_statement(&mut statements)?;

            if !self.is_statement_end() {
                let token = self.current();
                let message = if token.token_type == TokenType::Pipe {
                    "Redirects must follow the last command of a pipeline".to_string()
                } else {
                    format!("Unexpected token {}", token.describe())
                };
                return self.error(&message);
            }
        }

        Ok(match statements.len() {
            0 => AstNode::Empty,
            1 => statements.remove(0),
            _ => AstNode::Sequence(SequenceNode { commands: statements }),
        })
    }

    fn parse_statement(&mut self, out: &mut Vec<AstNode>) -> Result<(), ParseError> {
        if self.check(&[TokenType::Assignment]) {
            return self.parse_assignments(out);
        }

        let pipeline = self.parse_pipeline()?;
        let redirects = self.parse_redirects()?;

        let body = if pipeline.commands.len() == 1 {
            let mut commands = pipeline.commands;
            CompoundBody::Command(commands.remove(0))
        } else {
            CompoundBody::Pipeline(pipeline)
        };

        let node = if redirects.is_empty() {
            match body {
                CompoundBody::Command(c) => AstNode::Command(c),
                CompoundBody::Pipeline(p) => AstNode::Pipeline(p),
            }
        } else {
            AstNode::Compound(CompoundNode {
                command: body,
                redirects,
            })
        };

        out.push(node);
        Ok(())
    }

    /// A run of `NAME=value` words forming a whole statement.
    fn parse_assignments(&mut self, out: &mut Vec<AstNode>) -> Result<(), ParseError> {
        while self.check(&[TokenType::Assignment]) {
            let token = self.advance();
            let node = AST::assignment_from_word(&token.value)
                .ok_or_else(|| ParseError::with_token("Malformed assignment", &token))?;
            out.push(AstNode::Assignment(node));
        }

        if self.check(&[TokenType::Pipe]) {
            return self.error("Pipeline can only contain commands");
        }
        if !self.is_statement_end() {
            let token = self.current();
            return self.error(&format!(
                "Unexpected token {} after assignment",
                token.describe()
            ));
        }
        Ok(())
    }

    fn parse_pipeline(&mut self) -> Result<PipelineNode, ParseError> {
        let mut commands = vec![self.parse_command()?];

        while self.check(&[TokenType::Pipe]) {
            self.advance();
            self.skip_newlines();
            if self.check(&[TokenType::Assignment]) {
                return self.error("Pipeline can only contain commands");
            }
            commands.push(self.parse_command()?);
        }

        Ok(PipelineNode { commands })
    }

    fn parse_command(&mut self) -> Result<CommandNode, ParseError> {
        if !self.is_word() {
            let token = self.current();
            return if token.token_type == TokenType::Eof {
                self.error("Expected command")
            } else {
                self.error(&format!("Expected command, found {}", token.describe()))
            };
        }

        let name = self.advance().value;
        let mut args = Vec::new();

        loop {
            let token = self.current();
            match token.token_type {
                TokenType::Word | TokenType::String | TokenType::Assignment => {
                    self.advance();
                    args.push(Argument::Literal(token.value));
                }
                TokenType::Variable => {
                    self.advance();
                    args.push(Argument::Variable(VariableNode { name: token.value }));
                }
                _ => break,
            }
        }

        Ok(CommandNode { command: name, args })
    }

    fn parse_redirects(&mut self) -> Result<Redirects, ParseError> {
        let mut redirects = Redirects::default();

        loop {
            // None for `<`, the output mode for `>` and `>>`
            let output_mode = match self.current().token_type {
                TokenType::RedirectIn => None,
                TokenType::RedirectOut => Some(OutputMode::Write),
                TokenType::RedirectAppend => Some(OutputMode::Append),
                _ => break,
            };
            self.advance();
            let target = self.parse_filename()?;

            match output_mode {
                None => redirects.input = Some(target),
                Some(mode) => {
                    redirects.output = Some(target);
                    redirects.output_mode = mode;
                }
            }
        }

        Ok(redirects)
    }

    /// A redirect target. `NAME=value`-shaped words are plain filenames here.
    fn parse_filename(&mut self) -> Result<String, ParseError> {
        let token = self.current();
        match token.token_type {
            TokenType::Word | TokenType::String | TokenType::Assignment => {
                Ok(self.advance().value)
            }
            TokenType::Eof => self.error("Expected filename"),
            _ => self.error(&format!("Expected filename, found {}", token.describe())),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
