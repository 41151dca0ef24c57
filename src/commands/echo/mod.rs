// src/commands/echo/mod.rs
use async_trait::async_trait;
use crate::commands::{Command, CommandContext, HandlerResult};
use crate::interpreter::types::ShellState;

pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn execute(
        &self,
        args: &[String],
        _state: &ShellState,
        ctx: &mut CommandContext,
    ) -> HandlerResult {
        let mut no_newline = false;
        let mut interpret_escapes = false;
        let mut start_index = 0;

        while start_index < args.len() {
            match args[start_index].as_str() {
                "-n" => no_newline = true,
                "-e" => interpret_escapes = true,
                "-E" => interpret_escapes = false,
                "-ne" | "-en" => {
                    no_newline = true;
                    interpret_escapes = true;
                }
                _ => break,
            }
            start_index += 1;
        }

        let mut output = args[start_index..].join(" ");

        if interpret_escapes {
            let (text, stop) = process_escapes(&output);
            output = text;
            if stop {
                // \c suppresses everything after it, newline included
                ctx.write(&output);
                return Ok(None);
            }
        }

        if !no_newline {
            output.push('\n');
        }
        ctx.write(&output);
        Ok(None)
    }
}

/// Expand `echo -e` escapes. The flag is set when `\c` cut the output short.
fn process_escapes(input: &str) -> (String, bool) {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            result.push('\\');
            break;
        };
        match next {
            '\\' => result.push('\\'),
            'n' => result.push('\n'),
            't' => result.push('\t'),
            'r' => result.push('\r'),
            'a' => result.push('\x07'),
            'b' => result.push('\x08'),
            'f' => result.push('\x0c'),
            'v' => result.push('\x0b'),
            'e' | 'E' => result.push('\x1b'),
            'c' => return (result, true),
            '0' => {
                let mut code = 0u32;
                for _ in 0..3 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if let Some(ch) = char::from_u32(code % 256) {
                    result.push(ch);
                }
            }
            other => {
                result.push('\\');
                result.push(other);
            }
        }
    }

    (result, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::fs::InMemoryFs;

    async fn run(args: &[&str]) -> String {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut ctx = CommandContext::buffered(Arc::new(InMemoryFs::new()), "/");
        EchoCommand.execute(&args, &ShellState::default(), &mut ctx).await.unwrap();
        ctx.into_output()
    }

    #[tokio::test]
    async fn test_echo_joins_args() {
        assert_eq!(run(&["hello", "world"]).await, "hello world\n");
        assert_eq!(run(&[]).await, "\n");
    }

    #[tokio::test]
    async fn test_echo_no_newline() {
        assert_eq!(run(&["-n", "hi"]).await, "hi");
    }

    #[tokio::test]
    async fn test_echo_escapes() {
        assert_eq!(run(&["-e", "a\\tb\\nc"]).await, "a\tb\nc\n");
        assert_eq!(run(&["a\\nb"]).await, "a\\nb\n");
        assert_eq!(run(&["-e", "\\0101"]).await, "A\n");
        assert_eq!(run(&["-e", "stop\\cignored"]).await, "stop");
    }

    #[tokio::test]
    async fn test_echo_ansi_escape() {
        assert_eq!(run(&["-e", "\\e[31mred\\e[0m"]).await, "\x1b[31mred\x1b[0m\n");
    }
}
