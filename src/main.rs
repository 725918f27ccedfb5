//! Interactive order book shell.
//!
//! Runs the REPL over a fresh book, optionally preloading an action
//! script first. Exits 0 on normal termination.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod cli;

use cli::Repl;

#[derive(Parser)]
#[command(name = "matchbook")]
#[command(about = "Single-instrument limit order book with continuous matching")]
#[command(version)]
struct Args {
    /// Action script to apply before the prompt appears
    #[arg(short, long, value_name = "FILE")]
    preload: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut repl = Repl::new();

    if let Some(path) = &args.preload {
        match repl.preload(path) {
            Ok(outcome) => {
                println!(
                    "Preloaded {} actions ({} trades) from {}.",
                    outcome.actions,
                    outcome.trades,
                    path.display()
                );
            }
            Err(err) => {
                error!("failed to preload {}: {err}", path.display());
                eprintln!("error: failed to preload {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    if let Err(err) = repl.run() {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
