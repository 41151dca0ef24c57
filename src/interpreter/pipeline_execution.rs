//! Pipeline Execution
//!
//! Runs `cmd1 | cmd2 | cmd3` stage by stage. Every stage but the last writes
//! into its own buffer, and that buffer becomes the next stage's stdin. The
//! last stage writes wherever the enclosing context writes.

use std::sync::Arc;

use log::debug;

use crate::ast::types::CommandNode;
use crate::commands::CommandContext;
use crate::interpreter::executor::Executor;
use crate::interpreter::expansion::expand_arguments;
use crate::interpreter::types::{ShellState, EXIT_SUCCESS};

/// One fully expanded pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStage {
    pub command: String,
    pub args: Vec<String>,
}

impl PipelineStage {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Resolve a command's variable arguments against `state`.
    pub fn expand(cmd: &CommandNode, state: &ShellState) -> Self {
        Self::new(cmd.command.clone(), expand_arguments(state, &cmd.args))
    }
}

/// Pipeline execution state.
#[derive(Debug, Default)]
pub struct PipelineState {
    /// Stdin for the next stage
    pub stdin: Option<String>,
    /// Exit codes of every finished stage, in order
    pub pipestatus: Vec<i32>,
}

impl PipelineState {
    pub fn new(stdin: Option<String>) -> Self {
        Self {
            stdin,
            pipestatus: Vec::new(),
        }
    }

    /// Record a finished stage. `output` is the text handed to the next
    /// stage, `None` for the last one.
    pub fn record(&mut self, exit_code: i32, output: Option<String>) {
        self.pipestatus.push(exit_code);
        self.stdin = output;
    }

    /// Exit code of the last stage. Earlier failures do not count.
    pub fn final_exit_code(&self) -> i32 {
        self.pipestatus.last().copied().unwrap_or(EXIT_SUCCESS)
    }
}

impl Executor<'_> {
    /// Run `stages` left to right. The first stage reads the stdin of `ctx`.
    pub async fn run_pipeline(
        &self,
        stages: &[PipelineStage],
        state: &ShellState,
        ctx: &mut CommandContext,
    ) -> i32 {
        let Some((last, init)) = stages.split_last() else {
            return EXIT_SUCCESS;
        };

        let initial_stdin = ctx.has_stdin().then(|| ctx.get_stdin().to_string());
        let mut pipeline = PipelineState::new(initial_stdin);

        for stage in init {
            let mut stage_ctx = CommandContext::buffered(Arc::clone(self.fs()), ctx.cwd())
                .with_stdin(pipeline.stdin.take())
                .piped();
            let exit_code = self.dispatch(&stage.command, &stage.args, state, &mut stage_ctx).await;
            pipeline.record(exit_code, Some(stage_ctx.into_output()));
        }

        let mut last_ctx = ctx.derive(pipeline.stdin.take());
        let exit_code = self.dispatch(&last.command, &last.args, state, &mut last_ctx).await;
        pipeline.record(exit_code, None);
        ctx.absorb(last_ctx);

        debug!("pipeline finished, pipestatus {:?}", pipeline.pipestatus);
        pipeline.final_exit_code()
    }
}
