use crate::eval::{evaluate, format_result};
use crate::history::History;
use crate::repl::Repl;
use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod db;
mod environment;
mod errors;
mod eval;
mod expression;
mod history;
mod repl;

const HISTORY_FILE: &str = "tally_history";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Evaluate one expression, print the result and exit
    #[arg(short, long)]
    expression: Option<String>,
}

fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialize tracing: {err}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    let history = open_history();

    if let Some(expression) = cli.expression.as_deref() {
        evaluate_once(history, expression)
    } else if std::io::stdin().is_terminal() {
        run_interactive(history)
    } else {
        run_pipe(history)
    }
}

fn init_tracing() -> Result<()> {
    let log_path = environment::get_data_file("tally.log")?;
    let log_file = std::sync::Arc::new(std::fs::File::create(log_path)?);
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(log_file)
        .init();
    Ok(())
}

/// History falls back to in-memory when the data dir is unusable; the
/// calculator itself keeps working.
fn open_history() -> History {
    match History::from_file(HISTORY_FILE) {
        Ok(history) => history,
        Err(err) => {
            warn!("history unavailable, running without persistence: {}", err);
            History::new()
        }
    }
}

fn evaluate_once(mut history: History, expression: &str) -> ExitCode {
    match evaluate(expression) {
        Ok(value) => {
            let formatted = format_result(value);
            if let Err(err) = history.record(expression, &formatted) {
                warn!("failed to record history: {}", err);
            }
            println!("{}", formatted);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("tally: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_interactive(history: History) -> ExitCode {
    debug!("start interactive mode");
    let mut repl = Repl::new(history);
    match repl.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run_pipe(mut history: History) -> ExitCode {
    debug!("start pipe mode");
    use std::io::{self, BufRead, BufReader};

    let stdin = io::stdin();
    let reader = BufReader::new(stdin);
    let mut code = ExitCode::SUCCESS;

    for line in reader.lines() {
        match line {
            Ok(input) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                match evaluate(input) {
                    Ok(value) => {
                        let formatted = format_result(value);
                        if let Err(err) = history.record(input, &formatted) {
                            warn!("failed to record history: {}", err);
                        }
                        println!("{}", formatted);
                    }
                    Err(err) => {
                        eprintln!("tally: {}", err);
                        code = ExitCode::FAILURE;
                    }
                }
            }
            Err(err) => {
                eprintln!("Error reading input: {:?}", err);
                break;
            }
        }
    }
    code
}
