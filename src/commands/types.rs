// src/commands/types.rs
use async_trait::async_trait;
use std::sync::Arc;

use crate::fs::FileSystem;
use crate::interpreter::errors::HandlerError;
use crate::interpreter::types::ShellState;
use crate::terminal::Terminal;

/// Result of a command handler. `Ok(None)` means the handler returned no
/// explicit code and counts as success.
pub type HandlerResult = Result<Option<i32>, HandlerError>;

/// Command trait
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    async fn execute(
        &self,
        args: &[String],
        state: &ShellState,
        ctx: &mut CommandContext,
    ) -> HandlerResult;
}

enum OutputSink {
    Terminal(Arc<dyn Terminal>),
    Buffer(String),
}

/// The input/output surface a command handler sees.
///
/// Output goes either straight to the terminal or into a buffer that the
/// executor later feeds into the next pipeline stage or a redirect target.
pub struct CommandContext {
    sink: OutputSink,
    stdin: Option<String>,
    /// Output feeds another pipeline stage
    pub is_piped: bool,
    /// Output is captured for a `>`/`>>` redirect
    pub is_redirected: bool,
    cwd: String,
    fs: Arc<dyn FileSystem>,
}

impl CommandContext {
    /// Context that writes directly to a terminal.
    pub fn terminal(
        terminal: Arc<dyn Terminal>,
        fs: Arc<dyn FileSystem>,
        cwd: impl Into<String>,
    ) -> Self {
        Self {
            sink: OutputSink::Terminal(terminal),
            stdin: None,
            is_piped: false,
            is_redirected: false,
            cwd: cwd.into(),
            fs,
        }
    }

    /// Context that accumulates its output.
    pub fn buffered(fs: Arc<dyn FileSystem>, cwd: impl Into<String>) -> Self {
        Self {
            sink: OutputSink::Buffer(String::new()),
            stdin: None,
            is_piped: false,
            is_redirected: false,
            cwd: cwd.into(),
            fs,
        }
    }

    pub fn with_stdin(mut self, stdin: Option<String>) -> Self {
        self.stdin = stdin;
        self
    }

    pub fn piped(mut self) -> Self {
        self.is_piped = true;
        self
    }

    pub fn redirected(mut self) -> Self {
        self.is_redirected = true;
        self
    }

    /// A context that writes where `self` writes: the same terminal, or a
    /// fresh buffer to be merged back with [`CommandContext::absorb`].
    /// Flags are inherited.
    pub fn derive(&self, stdin: Option<String>) -> Self {
        let sink = match &self.sink {
            OutputSink::Terminal(t) => OutputSink::Terminal(Arc::clone(t)),
            OutputSink::Buffer(_) => OutputSink::Buffer(String::new()),
        };
        Self {
            sink,
            stdin,
            is_piped: self.is_piped,
            is_redirected: self.is_redirected,
            cwd: self.cwd.clone(),
            fs: Arc::clone(&self.fs),
        }
    }

    /// Append a derived context's buffered output to this context.
    pub fn absorb(&mut self, child: CommandContext) {
        if let OutputSink::Buffer(text) = child.sink {
            self.write(&text);
        }
    }

    pub fn writeln(&mut self, text: &str) {
        match &mut self.sink {
            OutputSink::Terminal(t) => t.write(&format!("{}\n", text)),
            OutputSink::Buffer(buf) => {
                buf.push_str(text);
                buf.push('\n');
            }
        }
    }

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.sink {
            OutputSink::Terminal(t) => t.write(text),
            OutputSink::Buffer(buf) => buf.push_str(text),
        }
    }

    pub fn is_buffered(&self) -> bool {
        matches!(self.sink, OutputSink::Buffer(_))
    }

    /// True whenever stdin was supplied by a pipe or `<`, even if empty.
    pub fn has_stdin(&self) -> bool {
        self.stdin.is_some()
    }

    /// Raw stdin text ("" when there is none).
    pub fn get_stdin(&self) -> &str {
        self.stdin.as_deref().unwrap_or("")
    }

    /// Stdin split into lines, without a trailing empty line.
    pub fn get_stdin_lines(&self) -> Vec<String> {
        let stdin = self.get_stdin();
        if stdin.is_empty() {
            return Vec::new();
        }
        let trimmed = stdin.strip_suffix('\n').unwrap_or(stdin);
        trimmed.split('\n').map(String::from).collect()
    }

    /// Buffered output with one trailing newline removed. `None` for
    /// terminal contexts.
    pub fn get_stdout(&self) -> Option<String> {
        match &self.sink {
            OutputSink::Terminal(_) => None,
            OutputSink::Buffer(buf) => Some(buf.strip_suffix('\n').unwrap_or(buf).to_string()),
        }
    }

    /// Raw buffered text, consuming the context.
    pub fn into_output(self) -> String {
        match self.sink {
            OutputSink::Terminal(_) => String::new(),
            OutputSink::Buffer(buf) => buf,
        }
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;
    use crate::terminal::CaptureTerminal;

    fn buffered() -> CommandContext {
        CommandContext::buffered(Arc::new(InMemoryFs::new()), "/")
    }

    #[test]
    fn test_buffered_writes() {
        let mut ctx = buffered();
        ctx.write("a");
        ctx.writeln("b");
        ctx.writeln("c");
        assert_eq!(ctx.get_stdout().as_deref(), Some("ab\nc"));
        assert_eq!(ctx.into_output(), "ab\nc\n");
    }

    #[test]
    fn test_terminal_writes() {
        let term = Arc::new(CaptureTerminal::new());
        let mut ctx = CommandContext::terminal(term.clone(), Arc::new(InMemoryFs::new()), "/");
        ctx.writeln("hello");
        ctx.write("x");
        assert_eq!(term.contents(), "hello\nx");
        assert_eq!(ctx.get_stdout(), None);
        assert!(!ctx.is_buffered());
    }

    #[test]
    fn test_stdin_accessors() {
        let ctx = buffered();
        assert!(!ctx.has_stdin());
        assert!(ctx.get_stdin_lines().is_empty());

        let ctx = buffered().with_stdin(Some("one\ntwo\n".to_string()));
        assert!(ctx.has_stdin());
        assert_eq!(ctx.get_stdin(), "one\ntwo\n");
        assert_eq!(ctx.get_stdin_lines(), vec!["one", "two"]);

        let ctx = buffered().with_stdin(Some(String::new()));
        assert!(ctx.has_stdin());
        assert!(ctx.get_stdin_lines().is_empty());
    }

    #[test]
    fn test_derive_from_buffer_inherits_flags() {
        let mut parent = buffered().redirected();
        let mut child = parent.derive(None);
        assert!(child.is_buffered());
        assert!(!child.is_piped);
        assert!(child.is_redirected);
        child.writeln("inner");
        parent.absorb(child);
        assert_eq!(parent.get_stdout().as_deref(), Some("inner"));
    }

    #[test]
    fn test_derive_from_terminal_writes_through() {
        let term = Arc::new(CaptureTerminal::new());
        let parent = CommandContext::terminal(term.clone(), Arc::new(InMemoryFs::new()), "/home");
        let mut child = parent.derive(Some("in".to_string()));
        assert!(!child.is_buffered());
        assert!(!child.is_piped);
        assert_eq!(child.cwd(), "/home");
        child.writeln("direct");
        assert_eq!(term.contents(), "direct\n");
    }
}
