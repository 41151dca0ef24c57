//! Shell Session
//!
//! Main entry point for running shell input.
//! Ties together the parser, executor, command registry and filesystem.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::commands::{create_default_registry, Command, CommandContext, CommandRegistry};
use crate::fs::{FileSystem, FsError, InitialFiles, InMemoryFs, MkdirOptions, WriteMode};
use crate::interpreter::executor::Executor;
use crate::interpreter::types::{ShellState, EXIT_FAILURE};
use crate::parser::parse;
use crate::terminal::{StdoutTerminal, Terminal};

/// Options for creating a shell session.
#[derive(Default)]
pub struct ShellOptions {
    /// Environment variables, merged over the defaults
    pub env: Option<HashMap<String, String>>,
    /// Working directory (defaults to `/`)
    pub cwd: Option<String>,
    /// File system instance (defaults to InMemoryFs)
    pub fs: Option<Arc<dyn FileSystem>>,
    /// Where unredirected output goes (defaults to stdout)
    pub terminal: Option<Arc<dyn Terminal>>,
    /// Command handlers (defaults to the bundled commands)
    pub registry: Option<CommandRegistry>,
    /// Files written into the filesystem before the first command runs
    pub files: Option<InitialFiles>,
}

/// One interactive shell session: state, registry, filesystem and terminal.
pub struct Shell {
    fs: Arc<dyn FileSystem>,
    terminal: Arc<dyn Terminal>,
    registry: CommandRegistry,
    state: ShellState,
}

impl Shell {
    /// Create a new shell session.
    pub async fn new(options: ShellOptions) -> Result<Self, FsError> {
        let cwd = options.cwd.unwrap_or_else(|| "/".to_string());
        let fs: Arc<dyn FileSystem> = options.fs.unwrap_or_else(|| Arc::new(InMemoryFs::new()));
        let terminal: Arc<dyn Terminal> =
            options.terminal.unwrap_or_else(|| Arc::new(StdoutTerminal));
        let registry = options.registry.unwrap_or_else(create_default_registry);

        let mut state = ShellState::new(cwd.clone());
        state.set_var("HOME", cwd.clone());
        state.set_var("PWD", cwd.clone());
        if let Some(user_env) = options.env {
            state.env.extend(user_env);
        }

        if let Some(files) = &options.files {
            let mut paths: Vec<&String> = files.keys().collect();
            paths.sort();
            for path in paths {
                let resolved = fs.resolve_path(&cwd, path);
                fs.write_file(&resolved, &files[path], WriteMode::Write).await?;
            }
        }

        if cwd != "/" {
            fs.mkdir(&cwd, &MkdirOptions { recursive: true }).await?;
        }

        debug!("shell ready: cwd={}, {} commands", cwd, registry.names().len());
        Ok(Self {
            fs,
            terminal,
            registry,
            state,
        })
    }

    /// Add or replace a command handler.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.registry.register(cmd);
    }

    /// Parse and execute `input`, returning its exit code.
    ///
    /// Syntax errors abort the whole input before anything runs; they are
    /// reported on the terminal and set `$?` to 1.
    pub async fn exec(&mut self, input: &str) -> i32 {
        let ast = match parse(input) {
            Ok(ast) => ast,
            Err(err) => {
                warn!("rejected input: {}", err);
                self.terminal.write(&format!("koma: {}\n", err));
                self.state.update_exit_code(EXIT_FAILURE);
                return EXIT_FAILURE;
            }
        };

        let executor = Executor::new(&self.registry, Arc::clone(&self.fs));
        let mut ctx = CommandContext::terminal(
            Arc::clone(&self.terminal),
            Arc::clone(&self.fs),
            self.state.cwd.clone(),
        );
        executor.execute(&ast, &mut self.state, &mut ctx).await
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    /// Value of `$?`.
    pub fn last_exit_code(&self) -> i32 {
        self.state.last_exit_code
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Read a file, resolving relative paths against the session's cwd.
    pub async fn read_file(&self, path: &str) -> Result<String, FsError> {
        let resolved = self.fs.resolve_path(&self.state.cwd, path);
        self.fs.read_file(&resolved).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::CaptureTerminal;

    async fn capture_shell(options: ShellOptions) -> (Shell, Arc<CaptureTerminal>) {
        let term = Arc::new(CaptureTerminal::new());
        let shell = Shell::new(ShellOptions {
            terminal: Some(term.clone()),
            ..options
        })
        .await
        .unwrap();
        (shell, term)
    }

    #[tokio::test]
    async fn test_exec_echo() {
        let (mut shell, term) = capture_shell(ShellOptions::default()).await;
        assert_eq!(shell.exec("echo hello").await, 0);
        assert_eq!(term.contents(), "hello\n");
    }

    #[tokio::test]
    async fn test_state_persists_across_exec() {
        let (mut shell, term) = capture_shell(ShellOptions::default()).await;
        shell.exec("GREETING=hi").await;
        shell.exec("nope").await;
        assert_eq!(shell.last_exit_code(), 127);
        shell.exec("echo $GREETING $?").await;
        assert_eq!(term.take(), "nope: command not found\nhi 127\n");
    }

    #[tokio::test]
    async fn test_syntax_error_sets_exit_code() {
        let (mut shell, term) = capture_shell(ShellOptions::default()).await;
        assert_eq!(shell.exec("echo 'open").await, 1);
        assert_eq!(shell.last_exit_code(), 1);
        assert!(term.contents().starts_with("koma: Lex error at 1:5: Unterminated single quote"));

        term.take();
        assert_eq!(shell.exec("echo a |").await, 1);
        assert!(term.contents().contains("Expected command"));
    }

    #[tokio::test]
    async fn test_syntax_error_runs_nothing() {
        let (mut shell, term) = capture_shell(ShellOptions::default()).await;
        shell.exec("echo first; echo >").await;
        assert!(!term.contents().contains("first"));
    }

    #[tokio::test]
    async fn test_initial_files_and_cwd() {
        let mut files = InitialFiles::new();
        files.insert("notes.txt".to_string(), "buy milk\n".to_string());
        files.insert("/etc/motd".to_string(), "welcome\n".to_string());
        let (mut shell, term) = capture_shell(ShellOptions {
            cwd: Some("/home/user".to_string()),
            files: Some(files),
            ..Default::default()
        })
        .await;

        assert_eq!(shell.state().get_var("PWD"), Some("/home/user"));
        shell.exec("cat notes.txt /etc/motd").await;
        assert_eq!(term.contents(), "buy milk\nwelcome\n");
    }

    #[tokio::test]
    async fn test_redirect_then_read_file() {
        let (mut shell, term) = capture_shell(ShellOptions::default()).await;
        shell.exec("echo \"hello\" > out.txt").await;
        assert_eq!(shell.read_file("out.txt").await.unwrap(), "hello");
        assert_eq!(term.contents(), "");
    }

    #[tokio::test]
    async fn test_user_env_overrides_defaults() {
        let mut env = HashMap::new();
        env.insert("HOME".to_string(), "/root".to_string());
        let (mut shell, term) = capture_shell(ShellOptions {
            env: Some(env),
            ..Default::default()
        })
        .await;
        shell.exec("echo $HOME").await;
        assert_eq!(term.contents(), "/root\n");
    }

    #[tokio::test]
    async fn test_custom_registry() {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(crate::commands::echo::EchoCommand));
        let (mut shell, _term) = capture_shell(ShellOptions {
            registry: Some(registry),
            ..Default::default()
        })
        .await;
        assert_eq!(shell.exec("cat").await, 127);
        shell.register(Box::new(crate::commands::cat::CatCommand));
        assert_eq!(shell.exec("cat").await, 0);
    }
}
