use async_trait::async_trait;
use crate::commands::{Command, CommandContext, HandlerResult};
use crate::interpreter::types::{ShellState, EXIT_FAILURE};

pub struct TrueCommand;

#[async_trait]
impl Command for TrueCommand {
    fn name(&self) -> &'static str {
        "true"
    }

    async fn execute(
        &self,
        _args: &[String],
        _state: &ShellState,
        _ctx: &mut CommandContext,
    ) -> HandlerResult {
        Ok(None)
    }
}

pub struct FalseCommand;

#[async_trait]
impl Command for FalseCommand {
    fn name(&self) -> &'static str {
        "false"
    }

    async fn execute(
        &self,
        _args: &[String],
        _state: &ShellState,
        _ctx: &mut CommandContext,
    ) -> HandlerResult {
        Ok(Some(EXIT_FAILURE))
    }
}
