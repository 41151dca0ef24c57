//! Abstract Syntax Tree (AST) Types
//!
//! A closed set of node variants produced by the parser. The executor
//! dispatches over [`AstNode`] with a single exhaustive match.

use std::fmt;

// =============================================================================
// ROOT
// =============================================================================

/// Union of all node types
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// No-op, produced from blank input
    Empty,
    Command(CommandNode),
    Pipeline(PipelineNode),
    Compound(CompoundNode),
    Sequence(SequenceNode),
    Assignment(AssignmentNode),
    Variable(VariableNode),
}

// =============================================================================
// COMMANDS & PIPELINES
// =============================================================================

/// A single command invocation: `name arg...`
#[derive(Debug, Clone, PartialEq)]
pub struct CommandNode {
    pub command: String,
    /// Unevaluated arguments; variables are expanded at execution time
    pub args: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Literal(String),
    Variable(VariableNode),
}

/// A pipeline: cmd1 | cmd2 | cmd3
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineNode {
    pub commands: Vec<CommandNode>,
}

// =============================================================================
// REDIRECTED STATEMENTS
// =============================================================================

/// What a redirect wraps: a lone command or a whole pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum CompoundBody {
    Command(CommandNode),
    Pipeline(PipelineNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `>`: truncate
    #[default]
    Write,
    /// `>>`
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Redirects {
    pub input: Option<String>,
    pub output: Option<String>,
    pub output_mode: OutputMode,
}

impl Redirects {
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }
}

/// A command or pipeline with at least one redirect attached
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundNode {
    pub command: CompoundBody,
    pub redirects: Redirects,
}

// =============================================================================
// STATEMENTS
// =============================================================================

/// Statements separated by `;` or newline, run unconditionally in order
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceNode {
    pub commands: Vec<AstNode>,
}

/// Standalone `NAME=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentNode {
    pub name: String,
    pub value: String,
}

/// Reference to an environment entry or a special variable (`?`, `#`, `@`, `0`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNode {
    pub name: String,
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Factory helpers for building nodes by hand
pub struct AST;

impl AST {
    pub fn command(name: &str, args: Vec<Argument>) -> CommandNode {
        CommandNode {
            command: name.to_string(),
            args,
        }
    }

    pub fn literal(value: &str) -> Argument {
        Argument::Literal(value.to_string())
    }

    pub fn variable(name: &str) -> Argument {
        Argument::Variable(VariableNode {
            name: name.to_string(),
        })
    }

    pub fn pipeline(commands: Vec<CommandNode>) -> PipelineNode {
        PipelineNode { commands }
    }

    pub fn sequence(commands: Vec<AstNode>) -> AstNode {
        AstNode::Sequence(SequenceNode { commands })
    }

    pub fn assignment(name: &str, value: &str) -> AstNode {
        AstNode::Assignment(AssignmentNode {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Split raw `NAME=value` assignment text at the first `=`.
    pub fn assignment_from_word(word: &str) -> Option<AssignmentNode> {
        let (name, value) = word.split_once('=')?;
        Some(AssignmentNode {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

// =============================================================================
// DISPLAY (shell-like rendering, used in diagnostics and logs)
// =============================================================================

fn quote_if_needed(s: &str) -> String {
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || "|;<>'\"$#\\".contains(c)) {
        format!("'{}'", s.replace('\'', "'\\''"))
    } else {
        s.to_string()
    }
}

impl fmt::Display for VariableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${{{}}}", self.name)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Literal(s) => f.write_str(&quote_if_needed(s)),
            Argument::Variable(v) => v.fmt(f),
        }
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_if_needed(&self.command))?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl fmt::Display for PipelineNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            cmd.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for CompoundNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.command {
            CompoundBody::Command(c) => c.fmt(f)?,
            CompoundBody::Pipeline(p) => p.fmt(f)?,
        }
        if let Some(input) = &self.redirects.input {
            write!(f, " < {}", quote_if_needed(input))?;
        }
        if let Some(output) = &self.redirects.output {
            let op = match self.redirects.output_mode {
                OutputMode::Write => ">",
                OutputMode::Append => ">>",
            };
            write!(f, " {} {}", op, quote_if_needed(output))?;
        }
        Ok(())
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Empty => Ok(()),
            AstNode::Command(c) => c.fmt(f),
            AstNode::Pipeline(p) => p.fmt(f),
            AstNode::Compound(c) => c.fmt(f),
            AstNode::Sequence(s) => {
                for (i, node) in s.commands.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    node.fmt(f)?;
                }
                Ok(())
            }
            AstNode::Assignment(a) => write!(f, "{}={}", a.name, quote_if_needed(&a.value)),
            AstNode::Variable(v) => v.fmt(f),
        }
    }
}
