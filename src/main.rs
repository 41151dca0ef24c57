use clap::Parser;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::io::{BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use koma_shell::config::ShellConfig;
use koma_shell::shell::{Shell, ShellOptions};
use koma_shell::terminal::CaptureTerminal;

#[derive(Parser)]
#[command(name = "koma-shell")]
#[command(about = "A small shell over an in-memory filesystem")]
#[command(version)]
struct Cli {
    /// Execute the script from command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Session configuration (TOML)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Working directory within the virtual filesystem
    #[arg(long = "cwd")]
    cwd: Option<String>,

    /// Output results as JSON (output, exitCode)
    #[arg(long = "json")]
    json: bool,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Script file to execute
    #[arg()]
    script_file: Option<PathBuf>,
}

/// Where the script to run comes from
#[derive(Debug, PartialEq, Eq)]
enum Source {
    Inline(String),
    File(PathBuf),
    Stdin,
    Repl,
}

/// `-c` wins over a script file, which wins over piped stdin. A terminal on
/// stdin means an interactive session, which has no single result to report
/// as JSON.
fn select_source(cli: &Cli, stdin_is_terminal: bool) -> Result<Source, &'static str> {
    let source = if let Some(script) = &cli.script {
        Source::Inline(script.clone())
    } else if let Some(file) = &cli.script_file {
        Source::File(file.clone())
    } else if stdin_is_terminal {
        Source::Repl
    } else {
        Source::Stdin
    };

    if cli.json && source == Source::Repl {
        return Err("--json requires -c, a script file, or piped stdin");
    }
    Ok(source)
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("koma-shell: {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ShellConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => ShellConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(cwd) = &cli.cwd {
        config.cwd = cwd.clone();
    }

    let level = config.level_filter().unwrap_or_else(|e| fail(e));
    if let Err(e) = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("koma-shell: logger unavailable: {}", e);
    }

    let source = select_source(&cli, std::io::stdin().is_terminal()).unwrap_or_else(|e| fail(e));
    let script = match source {
        Source::Inline(s) => Some(s),
        Source::File(file) => match std::fs::read_to_string(&file) {
            Ok(content) => Some(content),
            Err(e) => fail(format!("cannot read script file: {}: {}", file.display(), e)),
        },
        Source::Stdin => {
            let mut buf = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                fail(format!("cannot read stdin: {}", e));
            }
            Some(buf)
        }
        Source::Repl => None,
    };

    let capture = Arc::new(CaptureTerminal::new());
    let mut options = ShellOptions::from(config);
    if cli.json {
        options.terminal = Some(capture.clone());
    }
    let mut shell = Shell::new(options).await.unwrap_or_else(|e| fail(e));

    let Some(script) = script else {
        repl(&mut shell).await;
        std::process::exit(shell.last_exit_code());
    };

    let exit_code = shell.exec(&script).await;

    if cli.json {
        println!("{}", serde_json::json!({
            "output": capture.take(),
            "exitCode": exit_code,
        }));
    }

    std::process::exit(exit_code);
}

async fn repl(shell: &mut Shell) {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("koma$ ");
        let _ = std::io::stdout().flush();
        match lines.next() {
            Some(Ok(line)) => {
                if line.trim() == "exit" {
                    break;
                }
                shell.exec(&line).await;
            }
            Some(Err(e)) => fail(format!("cannot read stdin: {}", e)),
            None => {
                println!();
                break;
            }
        }
    }
}
