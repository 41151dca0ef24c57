//! Executor
//!
//! Walks an AST statement by statement. Each statement yields an exit code,
//! and `$?` is updated after every one of them, so a sequence always runs to
//! its end and later statements observe the most recent result.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use log::{debug, warn};

use crate::ast::types::{AstNode, CommandNode, PipelineNode};
use crate::commands::{CommandContext, CommandRegistry};
use crate::fs::FileSystem;
use crate::interpreter::expansion::expand_arguments;
use crate::interpreter::pipeline_execution::PipelineStage;
use crate::interpreter::types::{ShellState, EXIT_COMMAND_NOT_FOUND, EXIT_SUCCESS};

pub struct Executor<'a> {
    registry: &'a CommandRegistry,
    fs: Arc<dyn FileSystem>,
}

impl<'a> Executor<'a> {
    pub fn new(registry: &'a CommandRegistry, fs: Arc<dyn FileSystem>) -> Self {
        Self { registry, fs }
    }

    pub(crate) fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Execute a node and record its exit code in `state`.
    pub async fn execute(
        &self,
        node: &AstNode,
        state: &mut ShellState,
        ctx: &mut CommandContext,
    ) -> i32 {
        let exit_code = self.execute_node(node, state, ctx).await;
        state.update_exit_code(exit_code);
        exit_code
    }

    fn execute_node<'b>(
        &'b self,
        node: &'b AstNode,
        state: &'b mut ShellState,
        ctx: &'b mut CommandContext,
    ) -> Pin<Box<dyn Future<Output = i32> + Send + 'b>> {
        Box::pin(async move {
            match node {
                AstNode::Empty => EXIT_SUCCESS,
                AstNode::Command(cmd) => self.execute_command(cmd, state, ctx).await,
                AstNode::Pipeline(pipeline) => self.execute_pipeline(pipeline, state, ctx).await,
                AstNode::Compound(compound) => self.execute_compound(compound, state, ctx).await,
                AstNode::Sequence(seq) => {
                    let mut exit_code = EXIT_SUCCESS;
                    for child in &seq.commands {
                        exit_code = self.execute_node(child, state, ctx).await;
                        state.update_exit_code(exit_code);
                    }
                    exit_code
                }
                AstNode::Assignment(assign) => {
                    debug!("assign {}={}", assign.name, assign.value);
                    state.set_var(assign.name.clone(), assign.value.clone());
                    EXIT_SUCCESS
                }
                // A bare reference only makes sense as an argument
                AstNode::Variable(_) => EXIT_SUCCESS,
            }
        })
    }

    pub(crate) async fn execute_command(
        &self,
        cmd: &CommandNode,
        state: &ShellState,
        ctx: &mut CommandContext,
    ) -> i32 {
        let args = expand_arguments(state, &cmd.args);
        self.dispatch(&cmd.command, &args, state, ctx).await
    }

    pub(crate) async fn execute_pipeline(
        &self,
        pipeline: &PipelineNode,
        state: &ShellState,
        ctx: &mut CommandContext,
    ) -> i32 {
        let stages: Vec<PipelineStage> = pipeline
            .commands
            .iter()
            .map(|cmd| PipelineStage::expand(cmd, state))
            .collect();
        self.run_pipeline(&stages, state, ctx).await
    }

    /// Look up `name` in the registry and run it in `ctx`.
    pub(crate) async fn dispatch(
        &self,
        name: &str,
        args: &[String],
        state: &ShellState,
        ctx: &mut CommandContext,
    ) -> i32 {
        let Some(handler) = self.registry.get(name) else {
            debug!("{}: not registered", name);
            ctx.writeln(&format!("{}: command not found", name));
            return EXIT_COMMAND_NOT_FOUND;
        };

        debug!(
            "dispatch {} {:?} (piped={}, redirected={})",
            name, args, ctx.is_piped, ctx.is_redirected
        );
        match handler.execute(args, state, ctx).await {
            Ok(code) => code.unwrap_or(EXIT_SUCCESS),
            Err(err) => {
                warn!("{} failed with exit code {}: {}", name, err.exit_code, err.message);
                ctx.writeln(&format!("{}: {}", name, err.message));
                err.exit_code
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::commands::{create_default_registry, Command, HandlerResult};
    use crate::fs::{InMemoryFs, WriteMode};
    use crate::interpreter::errors::HandlerError;
    use crate::parser::parse;
    use crate::terminal::CaptureTerminal;

    struct FailCommand;

    #[async_trait]
    impl Command for FailCommand {
        fn name(&self) -> &'static str {
            "fail"
        }

        async fn execute(
            &self,
            args: &[String],
            _state: &ShellState,
            ctx: &mut CommandContext,
        ) -> HandlerResult {
            ctx.writeln("partial");
            match args.first() {
                Some(code) => Err(HandlerError::with_exit_code(
                    "custom failure",
                    code.parse().unwrap_or(1),
                )),
                None => Err(HandlerError::new("boom")),
            }
        }
    }

    struct ExitCommand;

    #[async_trait]
    impl Command for ExitCommand {
        fn name(&self) -> &'static str {
            "exit_with"
        }

        async fn execute(
            &self,
            args: &[String],
            _state: &ShellState,
            _ctx: &mut CommandContext,
        ) -> HandlerResult {
            Ok(args.first().and_then(|a| a.parse().ok()))
        }
    }

    /// Prints the context flags it was run with
    struct FlagsCommand;

    #[async_trait]
    impl Command for FlagsCommand {
        fn name(&self) -> &'static str {
            "flags"
        }

        async fn execute(
            &self,
            _args: &[String],
            _state: &ShellState,
            ctx: &mut CommandContext,
        ) -> HandlerResult {
            let line = format!(
                "piped={} redirected={} stdin={}",
                ctx.is_piped,
                ctx.is_redirected,
                ctx.has_stdin()
            );
            ctx.writeln(&line);
            Ok(None)
        }
    }

    struct Harness {
        registry: CommandRegistry,
        fs: Arc<InMemoryFs>,
        term: Arc<CaptureTerminal>,
        state: ShellState,
    }

    impl Harness {
        fn new() -> Self {
            let mut registry = create_default_registry();
            registry.register(Box::new(FailCommand));
            registry.register(Box::new(ExitCommand));
            registry.register(Box::new(FlagsCommand));
            Self {
                registry,
                fs: Arc::new(InMemoryFs::new()),
                term: Arc::new(CaptureTerminal::new()),
                state: ShellState::default(),
            }
        }

        async fn run(&mut self, input: &str) -> i32 {
            let ast = parse(input).unwrap();
            let executor = Executor::new(&self.registry, self.fs.clone());
            let mut ctx = CommandContext::terminal(
                self.term.clone(),
                self.fs.clone(),
                self.state.cwd.clone(),
            );
            executor.execute(&ast, &mut self.state, &mut ctx).await
        }

        async fn file(&self, path: &str) -> String {
            self.fs.read_file(path).await.unwrap()
        }
    }

    #[tokio::test]
    async fn test_simple_command() {
        let mut h = Harness::new();
        assert_eq!(h.run("echo hello world").await, 0);
        assert_eq!(h.term.contents(), "hello world\n");
    }

    #[tokio::test]
    async fn test_command_not_found() {
        let mut h = Harness::new();
        assert_eq!(h.run("nope arg").await, 127);
        assert!(h.term.contents().contains("command not found"));
        assert_eq!(h.term.contents(), "nope: command not found\n");
        assert_eq!(h.state.last_exit_code, 127);
    }

    #[tokio::test]
    async fn test_sequence_continues_after_failure() {
        let mut h = Harness::new();
        assert_eq!(h.run("echo success; nope; echo $?").await, 0);
        assert_eq!(h.term.contents(), "success\nnope: command not found\n127\n");
    }

    #[tokio::test]
    async fn test_sequence_result_is_last_child() {
        let mut h = Harness::new();
        assert_eq!(h.run("true\nfalse").await, 1);
        assert_eq!(h.state.last_exit_code, 1);
        assert_eq!(h.run("false; true").await, 0);
    }

    #[tokio::test]
    async fn test_assignment_then_expansion() {
        let mut h = Harness::new();
        assert_eq!(h.run("NAME=value").await, 0);
        assert_eq!(h.state.get_var("NAME"), Some("value"));
        h.run("echo $NAME ${NAME} $UNSET.").await;
        assert_eq!(h.term.contents(), "value value  .\n");
    }

    #[tokio::test]
    async fn test_assignment_visible_in_same_sequence() {
        let mut h = Harness::new();
        h.run("A=1; echo $A").await;
        assert_eq!(h.term.contents(), "1\n");
    }

    #[tokio::test]
    async fn test_variable_after_word_text() {
        let mut h = Harness::new();
        h.run("X=1; echo pre$X").await;
        assert_eq!(h.term.contents(), "pre 1\n");
    }

    #[tokio::test]
    async fn test_assignment_shaped_redirect_target() {
        let mut h = Harness::new();
        assert_eq!(h.run("echo x > a=b.txt").await, 0);
        assert_eq!(h.file("/a=b.txt").await, "x");
        assert!(h.state.get_var("a").is_none());
    }

    #[tokio::test]
    async fn test_exit_code_expansion() {
        let mut h = Harness::new();
        h.run("exit_with 42; echo $?").await;
        assert_eq!(h.term.contents(), "42\n");
    }

    #[tokio::test]
    async fn test_handler_returning_nothing_is_success() {
        let mut h = Harness::new();
        assert_eq!(h.run("exit_with").await, 0);
    }

    #[tokio::test]
    async fn test_handler_error_rendering() {
        let mut h = Harness::new();
        assert_eq!(h.run("fail").await, 1);
        assert_eq!(h.term.contents(), "partial\nfail: boom\n");

        let mut h = Harness::new();
        assert_eq!(h.run("fail 3").await, 3);
        assert_eq!(h.term.contents(), "partial\nfail: custom failure\n");
    }

    #[tokio::test]
    async fn test_pipeline_chains_stdout() {
        let mut h = Harness::new();
        assert_eq!(h.run("echo -e 'foo\\nbar\\nfood' | grep foo").await, 0);
        assert_eq!(h.term.contents(), "foo\nfood\n");

        let mut h = Harness::new();
        h.run("echo -e 'a\\nb\\nc' | grep -v b | wc -l").await;
        assert_eq!(h.term.contents(), "2\n");
    }

    #[tokio::test]
    async fn test_pipeline_keeps_trailing_newline() {
        let mut h = Harness::new();
        h.run("echo hi | cat").await;
        assert_eq!(h.term.contents(), "hi\n");
    }

    #[tokio::test]
    async fn test_pipeline_exit_code_is_last_stage() {
        let mut h = Harness::new();
        assert_eq!(h.run("false | true").await, 0);
        assert_eq!(h.run("true | false").await, 1);
    }

    #[tokio::test]
    async fn test_pipeline_error_text_flows_downstream() {
        let mut h = Harness::new();
        assert_eq!(h.run("fail | cat").await, 0);
        assert_eq!(h.term.contents(), "partial\nfail: boom\n");
    }

    #[tokio::test]
    async fn test_pipeline_context_flags() {
        let mut h = Harness::new();
        h.run("flags | cat").await;
        assert_eq!(h.term.contents(), "piped=true redirected=false stdin=false\n");

        let mut h = Harness::new();
        h.run("echo x | flags").await;
        assert_eq!(h.term.contents(), "piped=false redirected=false stdin=true\n");
    }

    #[tokio::test]
    async fn test_redirect_round_trip() {
        let mut h = Harness::new();
        assert_eq!(h.run("echo \"hello\" > out.txt").await, 0);
        assert_eq!(h.file("/out.txt").await, "hello");
        assert_eq!(h.term.contents(), "");
    }

    #[tokio::test]
    async fn test_redirect_strips_ansi() {
        let mut h = Harness::new();
        h.run("echo -e '\\e[31mred\\e[0m' > color.txt").await;
        assert_eq!(h.file("/color.txt").await, "red");
    }

    #[tokio::test]
    async fn test_append_vs_overwrite() {
        let mut h = Harness::new();
        h.run("echo a >> f").await;
        h.run("echo b >> f").await;
        assert_eq!(h.file("/f").await, "a\nb");

        h.run("echo c > f").await;
        assert_eq!(h.file("/f").await, "c");
    }

    #[tokio::test]
    async fn test_input_redirect() {
        let mut h = Harness::new();
        h.fs.write_file("/in.txt", "one\ntwo\nthree\n", WriteMode::Write).await.unwrap();
        assert_eq!(h.run("wc -l < in.txt").await, 0);
        assert_eq!(h.term.contents(), "3\n");
    }

    #[tokio::test]
    async fn test_input_redirect_feeds_pipeline() {
        let mut h = Harness::new();
        h.fs.write_file("/in.txt", "apple\nberry\navocado\n", WriteMode::Write).await.unwrap();
        h.run("cat | grep ^a < in.txt > out.txt").await;
        assert_eq!(h.file("/out.txt").await, "apple\navocado");
        assert_eq!(h.term.contents(), "");
    }

    #[tokio::test]
    async fn test_missing_input_is_reported() {
        let mut h = Harness::new();
        assert_eq!(h.run("cat < missing.txt; echo $?").await, 0);
        let out = h.term.contents();
        assert!(out.starts_with("koma: missing.txt: cannot read input: ENOENT"));
        assert!(out.ends_with("1\n"));
    }

    #[tokio::test]
    async fn test_failed_redirected_command_leaves_file() {
        let mut h = Harness::new();
        h.fs.write_file("/keep.txt", "original", WriteMode::Write).await.unwrap();
        assert_eq!(h.run("fail > keep.txt").await, 1);
        assert_eq!(h.file("/keep.txt").await, "original");
        assert_eq!(h.term.contents(), "partial\nfail: boom\n");
    }

    #[tokio::test]
    async fn test_redirected_flags() {
        let mut h = Harness::new();
        h.run("flags > flags.txt").await;
        assert_eq!(h.file("/flags.txt").await, "piped=false redirected=true stdin=false");

        h.run("echo x | flags > flags.txt").await;
        assert_eq!(h.file("/flags.txt").await, "piped=false redirected=true stdin=true");
    }

    #[tokio::test]
    async fn test_redirect_into_directory_fails() {
        let mut h = Harness::new();
        h.run("echo x > /tmp/a.txt").await;
        assert_eq!(h.run("echo y > /tmp").await, 1);
        assert!(h.term.contents().contains("cannot write output"));
    }

    #[tokio::test]
    async fn test_redirect_relative_to_cwd() {
        let mut h = Harness::new();
        h.state.cwd = "/home/user".to_string();
        h.run("echo hi > note.txt").await;
        assert_eq!(h.file("/home/user/note.txt").await, "hi");
    }

    #[tokio::test]
    async fn test_empty_input() {
        let mut h = Harness::new();
        h.state.update_exit_code(5);
        assert_eq!(h.run("   ").await, 0);
        assert_eq!(h.state.last_exit_code, 0);
    }

    #[tokio::test]
    async fn test_variable_node_alone() {
        let mut h = Harness::new();
        let executor = Executor::new(&h.registry, h.fs.clone());
        let mut ctx = CommandContext::buffered(h.fs.clone(), "/");
        let node = AstNode::Variable(crate::ast::types::VariableNode { name: "X".to_string() });
        assert_eq!(executor.execute(&node, &mut h.state, &mut ctx).await, 0);
    }

    #[tokio::test]
    async fn test_buffered_parent_context() {
        let h = Harness::new();
        let mut state = ShellState::default();
        let executor = Executor::new(&h.registry, h.fs.clone());
        let mut ctx = CommandContext::buffered(h.fs.clone(), "/");
        let ast = parse("echo a | cat; echo b").unwrap();
        executor.execute(&ast, &mut state, &mut ctx).await;
        assert_eq!(ctx.get_stdout().as_deref(), Some("a\nb"));
    }
}
