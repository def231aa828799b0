//! CLI tool to inspect and validate FCL scripts.

use std::fs;
use std::process::ExitCode;

use fcl_syntax::{Ast, ParseError, ParserOptions};
use tracing_subscriber::EnvFilter;

fn usage() -> ExitCode {
    eprintln!("Usage: fcl <command> [--max-nesting N] [files...]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tokens  Print the token stream of each file");
    eprintln!("  parse   Print the syntax tree of each file");
    eprintln!("  check   Check if file(s) parse");
    eprintln!();
    eprintln!("Set RUST_LOG=fcl_syntax=trace to follow the parser.");
    ExitCode::from(2)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        return usage();
    }

    let command = args[1].as_str();
    let mut options = ParserOptions::default();
    let mut files = Vec::new();

    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--max-nesting" {
            let Some(limit) = rest.next().and_then(|value| value.parse().ok()) else {
                eprintln!("Error: --max-nesting expects a number");
                return ExitCode::from(2);
            };
            options.max_nesting = limit;
        } else {
            files.push(arg.as_str());
        }
    }

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{path}: {e}");
                had_error = true;
                continue;
            }
        };

        match command {
            "tokens" => {
                for token in fcl_syntax::tokenize(&content) {
                    println!("{token}");
                }
            }
            "parse" => match Ast::parse_with(&content, &options) {
                Ok(ast) => print!("{}", fcl_syntax::format(ast.root())),
                Err(e) => {
                    report(path, &content, &e);
                    had_error = true;
                }
            },
            "check" => match Ast::parse_with(&content, &options) {
                Ok(ast) => {
                    let statements = ast.root().children().len();
                    eprintln!("{path}: valid ({statements} statement(s))");
                }
                Err(e) => {
                    report(path, &content, &e);
                    had_error = true;
                }
            },
            _ => {
                eprintln!("Unknown command: {command}");
                return ExitCode::from(2);
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report(path: &str, content: &str, error: &ParseError) {
    // error offsets count the implicit opening brace
    let tokens = fcl_syntax::tokenize(content);
    let span = fcl_syntax::locate(&tokens, error.position.saturating_sub(1));
    let label = if error.is_syntax() {
        "syntax error"
    } else {
        "input too deeply nested"
    };
    eprintln!(
        "{path}: {label}: {error} (line {}, column {})",
        span.line, span.column
    );
}
