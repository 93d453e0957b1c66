//! tyla CLI entry point

use std::fs;
use std::process;

use clap::{Parser, Subcommand};
use miette::GraphicalReportHandler;
use tyla_ast::Program;

#[derive(Parser)]
#[command(name = "tyla", version, about = "Semantic analysis pass for a statically-typed scripting dialect")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Type-check a JSON-encoded program and print the decorated tree.
    Check {
        /// Path to a JSON document holding a `Program`.
        path: String,
    },
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { path } => check(&path),
    }
}

fn check(path: &str) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: could not read '{}': {}", path, err);
            process::exit(1);
        }
    };

    let program: Program = match serde_json::from_str(&source) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: '{}' is not a valid program document: {}", path, err);
            process::exit(1);
        }
    };

    match tyla::check_program(program, path) {
        Ok(checked) => match serde_json::to_string_pretty(&checked) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("error: could not serialize the checked program: {}", err);
                process::exit(1);
            }
        },
        Err(diagnostic) => {
            render_diagnostic(&diagnostic);
            process::exit(1);
        }
    }
}

fn render_diagnostic(diagnostic: &tyla::Diagnostic) {
    let mut rendered = String::new();
    if GraphicalReportHandler::new()
        .render_report(&mut rendered, diagnostic)
        .is_ok()
    {
        eprint!("{}", rendered);
    } else {
        eprintln!("{}", diagnostic);
    }
}
