//! Redirection Handling
//!
//! Applies a statement's redirects:
//! - < : Read a file into the statement's stdin
//! - > : Write captured stdout to a file
//! - >> : Append captured stdout to a file
//!
//! Captured output is only written when the statement succeeds. On failure
//! it goes to the enclosing context and the target is left alone.

use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, warn};
use regex_lite::Regex;

use crate::ast::types::{CompoundBody, CompoundNode, OutputMode};
use crate::commands::CommandContext;
use crate::fs::WriteMode;
use crate::interpreter::errors::RedirectError;
use crate::interpreter::executor::Executor;
use crate::interpreter::types::{ShellState, EXIT_SUCCESS};

lazy_static! {
    static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap();
}

/// Remove terminal color and cursor sequences.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

impl From<OutputMode> for WriteMode {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Write => WriteMode::Write,
            OutputMode::Append => WriteMode::Append,
        }
    }
}

impl Executor<'_> {
    pub(crate) async fn execute_compound(
        &self,
        compound: &CompoundNode,
        state: &ShellState,
        ctx: &mut CommandContext,
    ) -> i32 {
        let redirects = &compound.redirects;

        let stdin = match &redirects.input {
            Some(path) => match self.read_input(path, state).await {
                Ok(content) => Some(content),
                Err(err) => return self.report(err, ctx),
            },
            None => ctx.has_stdin().then(|| ctx.get_stdin().to_string()),
        };

        let Some(target) = &redirects.output else {
            let mut inner = ctx.derive(stdin);
            let exit_code = self.execute_body(&compound.command, state, &mut inner).await;
            ctx.absorb(inner);
            return exit_code;
        };

        let mut inner = CommandContext::buffered(Arc::clone(self.fs()), ctx.cwd())
            .with_stdin(stdin)
            .redirected();
        inner.is_piped = ctx.is_piped;
        let exit_code = self.execute_body(&compound.command, state, &mut inner).await;

        if exit_code != EXIT_SUCCESS {
            debug!("{} not written, statement exited {}", target, exit_code);
            ctx.write(&inner.into_output());
            return exit_code;
        }

        let content = strip_ansi(&inner.get_stdout().unwrap_or_default());
        match self.write_output(target, &content, redirects.output_mode, state).await {
            Ok(()) => exit_code,
            Err(err) => self.report(err, ctx),
        }
    }

    async fn execute_body(
        &self,
        body: &CompoundBody,
        state: &ShellState,
        ctx: &mut CommandContext,
    ) -> i32 {
        match body {
            CompoundBody::Command(cmd) => self.execute_command(cmd, state, ctx).await,
            CompoundBody::Pipeline(pipeline) => self.execute_pipeline(pipeline, state, ctx).await,
        }
    }

    async fn read_input(&self, path: &str, state: &ShellState) -> Result<String, RedirectError> {
        let resolved = self.fs().resolve_path(&state.cwd, path);
        debug!("< {}", resolved);
        self.fs().read_file(&resolved).await.map_err(|source| RedirectError::Input {
            path: path.to_string(),
            source,
        })
    }

    async fn write_output(
        &self,
        path: &str,
        content: &str,
        mode: OutputMode,
        state: &ShellState,
    ) -> Result<(), RedirectError> {
        let resolved = self.fs().resolve_path(&state.cwd, path);
        let output_error = |source| RedirectError::Output {
            path: path.to_string(),
            source,
        };

        let mut text = String::with_capacity(content.len() + 1);
        if mode == OutputMode::Append {
            let existing = match self.fs().read_file(&resolved).await {
                Ok(existing) => existing,
                Err(e) if e.is_not_found() => String::new(),
                Err(e) => return Err(output_error(e)),
            };
            if !existing.is_empty() && !existing.ends_with('\n') {
                text.push('\n');
            }
        }
        text.push_str(content);

        let op = if mode == OutputMode::Append { ">>" } else { ">" };
        debug!("{} {} ({} bytes)", op, resolved, text.len());
        self.fs().write_file(&resolved, &text, mode.into()).await.map_err(output_error)
    }

    fn report(&self, err: RedirectError, ctx: &mut CommandContext) -> i32 {
        warn!("redirect failed: {}", err);
        ctx.writeln(&format!("koma: {}", err));
        err.exit_code()
    }
}
