// src/commands/cat/mod.rs
use async_trait::async_trait;
use crate::commands::{Command, CommandContext, HandlerResult};
use crate::interpreter::errors::HandlerError;
use crate::interpreter::types::ShellState;

pub struct CatCommand;

#[async_trait]
impl Command for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    async fn execute(
        &self,
        args: &[String],
        _state: &ShellState,
        ctx: &mut CommandContext,
    ) -> HandlerResult {
        if args.iter().any(|a| a == "--help") {
            ctx.write(
                "Usage: cat [OPTION]... [FILE]...\n\n\
                 Concatenate FILE(s) to standard output.\n\n\
                 Options:\n\
                   -n, --number     number all output lines\n\
                       --help       display this help and exit\n",
            );
            return Ok(None);
        }

        let mut show_line_numbers = false;
        let mut files: Vec<&str> = Vec::new();

        for arg in args {
            match arg.as_str() {
                "-n" | "--number" => show_line_numbers = true,
                "-" => files.push("-"),
                a if a.starts_with('-') => {
                    return Err(HandlerError::with_exit_code(
                        format!("invalid option -- '{}'", &a[1..]),
                        2,
                    ));
                }
                a => files.push(a),
            }
        }

        if files.is_empty() {
            files.push("-");
        }

        let mut line_number = 1;
        for file in files {
            let content = if file == "-" {
                ctx.get_stdin().to_string()
            } else {
                let path = ctx.fs().resolve_path(ctx.cwd(), file);
                match ctx.fs().read_file(&path).await {
                    Ok(c) => c,
                    Err(e) if e.is_not_found() => {
                        return Err(HandlerError::new(format!(
                            "{}: No such file or directory",
                            file
                        )));
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            if show_line_numbers {
                let (numbered, next_line) = add_line_numbers(&content, line_number);
                ctx.write(&numbered);
                line_number = next_line;
            } else {
                ctx.write(&content);
            }
        }

        Ok(None)
    }
}

fn add_line_numbers(content: &str, start_line: usize) -> (String, usize) {
    if content.is_empty() {
        return (String::new(), start_line);
    }
    let has_trailing_newline = content.ends_with('\n');
    let body = content.strip_suffix('\n').unwrap_or(content);
    let lines: Vec<String> = body
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:>6}\t{}", start_line + i, line))
        .collect();
    let count = lines.len();

    let mut result = lines.join("\n");
    if has_trailing_newline {
        result.push('\n');
    }
    (result, start_line + count)
}
