// src/commands/grep/mod.rs
use async_trait::async_trait;
use regex_lite::Regex;
use crate::commands::{Command, CommandContext, HandlerResult};
use crate::interpreter::errors::HandlerError;
use crate::interpreter::types::{ShellState, EXIT_FAILURE};

pub struct GrepCommand;

#[derive(Default)]
struct GrepOptions {
    pattern: String,
    ignore_case: bool,
    invert_match: bool,
    count_only: bool,
    line_number: bool,
    fixed_strings: bool,
    files: Vec<String>,
}

fn parse_grep_args(args: &[String]) -> Result<GrepOptions, HandlerError> {
    let mut opts = GrepOptions::default();
    let mut pattern: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-e" => match iter.next() {
                Some(p) => pattern = Some(p.clone()),
                None => {
                    return Err(HandlerError::with_exit_code(
                        "option requires an argument -- 'e'",
                        2,
                    ))
                }
            },
            "-i" | "--ignore-case" => opts.ignore_case = true,
            "-v" | "--invert-match" => opts.invert_match = true,
            "-c" | "--count" => opts.count_only = true,
            "-n" | "--line-number" => opts.line_number = true,
            "-F" | "--fixed-strings" => opts.fixed_strings = true,
            "-E" | "--extended-regexp" => {}
            a if a.starts_with('-') && a.len() > 1 => {
                for flag in a[1..].chars() {
                    match flag {
                        'i' => opts.ignore_case = true,
                        'v' => opts.invert_match = true,
                        'c' => opts.count_only = true,
                        'n' => opts.line_number = true,
                        'F' => opts.fixed_strings = true,
                        'E' => {}
                        other => {
                            return Err(HandlerError::with_exit_code(
                                format!("invalid option -- '{}'", other),
                                2,
                            ));
                        }
                    }
                }
            }
            _ => positional.push(arg.clone()),
        }
    }

    opts.pattern = match pattern {
        Some(p) => p,
        None if !positional.is_empty() => positional.remove(0),
        None => return Err(HandlerError::with_exit_code("no pattern specified", 2)),
    };
    opts.files = positional;
    Ok(opts)
}

fn build_regex(opts: &GrepOptions) -> Result<Regex, HandlerError> {
    let mut pattern = if opts.fixed_strings {
        regex_lite::escape(&opts.pattern)
    } else {
        opts.pattern.clone()
    };
    if opts.ignore_case {
        pattern = format!("(?i){}", pattern);
    }
    Regex::new(&pattern)
        .map_err(|e| HandlerError::with_exit_code(format!("invalid pattern: {}", e), 2))
}

fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    let body = content.strip_suffix('\n').unwrap_or(content);
    body.split('\n').filter(move |_| !content.is_empty())
}

#[async_trait]
impl Command for GrepCommand {
    fn name(&self) -> &'static str {
        "grep"
    }

    async fn execute(
        &self,
        args: &[String],
        _state: &ShellState,
        ctx: &mut CommandContext,
    ) -> HandlerResult {
        if args.iter().any(|a| a == "--help") {
            ctx.write(
                "Usage: grep [OPTION]... PATTERN [FILE]...\n\n\
                 Search for PATTERN in each FILE.\n\n\
                 Options:\n\
                   -E, --extended-regexp  PATTERN is an extended regular expression\n\
                   -F, --fixed-strings    PATTERN is a literal string\n\
                   -i, --ignore-case      ignore case distinctions\n\
                   -v, --invert-match     select non-matching lines\n\
                   -c, --count            print only a count of matching lines\n\
                   -n, --line-number      print line number with output lines\n\
                       --help             display this help and exit\n",
            );
            return Ok(None);
        }

        let opts = parse_grep_args(args)?;
        let regex = build_regex(&opts)?;

        let mut sources: Vec<(Option<&str>, String)> = Vec::new();
        if opts.files.is_empty() {
            sources.push((None, ctx.get_stdin().to_string()));
        }
        for file in &opts.files {
            let path = ctx.fs().resolve_path(ctx.cwd(), file);
            match ctx.fs().read_file(&path).await {
                Ok(content) => sources.push((Some(file.as_str()), content)),
                Err(e) if e.is_not_found() => {
                    return Err(HandlerError::with_exit_code(
                        format!("{}: No such file or directory", file),
                        2,
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let show_names = sources.len() > 1;
        let mut total_matches = 0;

        for (name, content) in &sources {
            let prefix = match name {
                Some(n) if show_names => format!("{}:", n),
                _ => String::new(),
            };
            let mut count = 0;
            for (idx, line) in content_lines(content).enumerate() {
                if regex.is_match(line) == opts.invert_match {
                    continue;
                }
                count += 1;
                if opts.count_only {
                    continue;
                }
                if opts.line_number {
                    ctx.writeln(&format!("{}{}:{}", prefix, idx + 1, line));
                } else {
                    ctx.writeln(&format!("{}{}", prefix, line));
                }
            }
            if opts.count_only {
                ctx.writeln(&format!("{}{}", prefix, count));
            }
            total_matches += count;
        }

        if total_matches == 0 {
            return Ok(Some(EXIT_FAILURE));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileSystem, InMemoryFs, WriteMode};
    use std::sync::Arc;

    async fn run(
        args: &[&str],
        stdin: Option<&str>,
        files: Vec<(&str, &str)>,
    ) -> (HandlerResult, String) {
        let fs = Arc::new(InMemoryFs::new());
        for (path, content) in files {
            fs.write_file(path, content, WriteMode::Write).await.unwrap();
        }
        let mut ctx = CommandContext::buffered(fs, "/").with_stdin(stdin.map(String::from));
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let result = GrepCommand.execute(&args, &ShellState::default(), &mut ctx).await;
        (result, ctx.into_output())
    }

    #[tokio::test]
    async fn test_grep_stdin() {
        let (result, out) = run(&["foo"], Some("foo\nbar\nfood\n"), vec![]).await;
        assert_eq!(result, Ok(None));
        assert_eq!(out, "foo\nfood\n");
    }

    #[tokio::test]
    async fn test_grep_no_match_is_one() {
        let (result, out) = run(&["zzz"], Some("foo\n"), vec![]).await;
        assert_eq!(result, Ok(Some(1)));
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_grep_flags() {
        let (_, out) = run(&["-in", "FOO"], Some("a\nfoo\nFoo\n"), vec![]).await;
        assert_eq!(out, "2:foo\n3:Foo\n");

        let (_, out) = run(&["-v", "a"], Some("a\nb\nab\n"), vec![]).await;
        assert_eq!(out, "b\n");

        let (_, out) = run(&["-c", "o"], Some("one\ntwo\nsix\n"), vec![]).await;
        assert_eq!(out, "2\n");

        let (_, out) = run(&["-F", "a.c"], Some("abc\na.c\n"), vec![]).await;
        assert_eq!(out, "a.c\n");
    }

    #[tokio::test]
    async fn test_grep_files_with_names() {
        let (_, out) = run(&["x", "/a", "/b"], None, vec![("/a", "x1\ny\n"), ("/b", "x2\n")]).await;
        assert_eq!(out, "/a:x1\n/b:x2\n");
    }

    #[tokio::test]
    async fn test_grep_errors() {
        let (result, _) = run(&[], None, vec![]).await;
        assert_eq!(result.unwrap_err().exit_code, 2);

        let (result, _) = run(&["("], Some(""), vec![]).await;
        assert!(result.unwrap_err().message.starts_with("invalid pattern"));
    }
}
