// src/commands/wc/mod.rs
use async_trait::async_trait;
use crate::commands::{Command, CommandContext, HandlerResult};
use crate::interpreter::errors::HandlerError;
use crate::interpreter::types::ShellState;

pub struct WcCommand;

#[derive(Default)]
struct Stats {
    lines: usize,
    words: usize,
    bytes: usize,
}

fn count_stats(content: &str) -> Stats {
    Stats {
        lines: content.matches('\n').count(),
        words: content.split_whitespace().count(),
        bytes: content.len(),
    }
}

struct Columns {
    lines: bool,
    words: bool,
    bytes: bool,
}

impl Columns {
    fn render(&self, stats: &Stats, width: usize, label: Option<&str>) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.lines {
            parts.push(format!("{:>width$}", stats.lines, width = width));
        }
        if self.words {
            parts.push(format!("{:>width$}", stats.words, width = width));
        }
        if self.bytes {
            parts.push(format!("{:>width$}", stats.bytes, width = width));
        }
        match label {
            Some(name) => format!("{} {}", parts.join(" "), name),
            None => parts.join(" "),
        }
    }
}

#[async_trait]
impl Command for WcCommand {
    fn name(&self) -> &'static str {
        "wc"
    }

    async fn execute(
        &self,
        args: &[String],
        _state: &ShellState,
        ctx: &mut CommandContext,
    ) -> HandlerResult {
        if args.iter().any(|a| a == "--help") {
            ctx.write(
                "Usage: wc [OPTION]... [FILE]...\n\n\
                 Print newline, word, and byte counts for each FILE.\n\n\
                 Options:\n\
                   -c, --bytes    print the byte counts\n\
                   -l, --lines    print the newline counts\n\
                   -w, --words    print the word counts\n\
                       --help     display this help and exit\n",
            );
            return Ok(None);
        }

        let mut columns = Columns { lines: false, words: false, bytes: false };
        let mut files: Vec<&str> = Vec::new();

        for arg in args {
            match arg.as_str() {
                "-l" | "--lines" => columns.lines = true,
                "-w" | "--words" => columns.words = true,
                "-c" | "--bytes" => columns.bytes = true,
                a if a.starts_with('-') && a.len() > 1 => {
                    for flag in a[1..].chars() {
                        match flag {
                            'l' => columns.lines = true,
                            'w' => columns.words = true,
                            'c' => columns.bytes = true,
                            other => {
                                return Err(HandlerError::with_exit_code(
                                    format!("invalid option -- '{}'", other),
                                    2,
                                ));
                            }
                        }
                    }
                }
                a => files.push(a),
            }
        }

        if !columns.lines && !columns.words && !columns.bytes {
            columns = Columns { lines: true, words: true, bytes: true };
        }

        let mut all_stats: Vec<(Stats, Option<&str>)> = Vec::new();
        if files.is_empty() {
            all_stats.push((count_stats(ctx.get_stdin()), None));
        }
        for file in files {
            let path = ctx.fs().resolve_path(ctx.cwd(), file);
            let content = match ctx.fs().read_file(&path).await {
                Ok(c) => c,
                Err(e) if e.is_not_found() => {
                    return Err(HandlerError::new(format!("{}: No such file or directory", file)));
                }
                Err(e) => return Err(e.into()),
            };
            all_stats.push((count_stats(&content), Some(file)));
        }

        let mut total = Stats::default();
        for (stats, _) in &all_stats {
            total.lines += stats.lines;
            total.words += stats.words;
            total.bytes += stats.bytes;
        }

        // A single count is printed unpadded
        let shown = [columns.lines, columns.words, columns.bytes];
        let single_column = shown.iter().filter(|c| **c).count() == 1;
        let width = if single_column && all_stats.len() == 1 {
            0
        } else {
            [
                (columns.lines, total.lines),
                (columns.words, total.words),
                (columns.bytes, total.bytes),
            ]
                .iter()
                .filter(|(shown, _)| *shown)
                .map(|(_, n)| n.to_string().len())
                .max()
                .unwrap_or(1)
        };

        for (stats, label) in &all_stats {
            ctx.writeln(&columns.render(stats, width, *label));
        }
        if all_stats.len() > 1 {
            ctx.writeln(&columns.render(&total, width, Some("total")));
        }

        Ok(None)
    }
}
