//! Command-line front end: runs a `.giant` file or starts an interactive
//! session. Mirrors the teacher's `why` binary - a thin `clap` surface over
//! the library crate plus ambient `log`/`simple_logger` diagnostics that are
//! entirely separate from the program output and `Error on line N: ...`
//! diagnostics the language itself produces.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser as ClapParser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Lexer, parser and evaluator for the GIANT relational-value language.
#[derive(Debug, ClapParser)]
#[command(name = "giant", author, version, about)]
struct Cli {
    /// Source file to run. Omit to start an interactive session.
    file: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = LogLevel::Warn)]
    verbosity: LogLevel,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    simple_logger::init_with_level(cli.verbosity.into()).expect("failed to initialize logger");

    match cli.file {
        Some(path) => execute_file(&path),
        None => {
            repl();
            ExitCode::SUCCESS
        }
    }
}

fn execute_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::error!("could not read {}: {e}", path.display());
            eprintln!("could not read {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout();
    let errors = giant::execute_with(&source, &mut stdout);
    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        for e in &errors {
            eprintln!("{e}");
        }
        ExitCode::FAILURE
    }
}

/// Reads statements from stdin, buffering lines while the most recently read
/// one opens an indented `when ... :` body, and evaluating the buffered
/// statement(s) once a blank line or a dedent back to column zero is seen.
/// The literal input `stop` ends the session.
fn repl() {
    let stdin = io::stdin();
    let mut pending = String::new();
    let mut in_block = false;

    prompt();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };

        if !in_block && line.trim() == "stop" {
            break;
        }

        if line.trim().is_empty() {
            if !pending.is_empty() {
                run_and_report(&pending);
                pending.clear();
                in_block = false;
            }
            prompt();
            continue;
        }

        let is_indented = line.starts_with(' ') || line.starts_with('\t');
        if in_block && !is_indented {
            run_and_report(&pending);
            pending.clear();
            in_block = false;
        }

        if line.trim_end().ends_with(':') {
            in_block = true;
        }

        pending.push_str(&line);
        pending.push('\n');

        if !in_block {
            run_and_report(&pending);
            pending.clear();
        }

        prompt();
    }

    if !pending.is_empty() {
        run_and_report(&pending);
    }
}

fn run_and_report(source: &str) {
    let mut stdout = io::stdout();
    let errors = giant::execute_with(source, &mut stdout);
    for e in &errors {
        eprintln!("{e}");
    }
}

fn prompt() {
    print!("giant> ");
    let _ = io::stdout().flush();
}
