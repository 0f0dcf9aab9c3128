//! Casilla CLI - fills official tax-form PDFs from structured data
//!
//! Usage: casilla <COMMAND>
//!
//! Commands:
//!   fill    Fill a template PDF with one data tree
//!   check   Run every stage except rendering
//!   batch   Fill every job listed in a manifest

use std::process::ExitCode;

use clap::Parser;

use casilla::presentation::Cli;

mod commands;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("CASILLA_LOG", level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json = cli.json;

    match commands::dispatch(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            if json {
                let event = serde_json::json!({
                    "event": "error",
                    "message": format!("{err:#}"),
                });
                println!("{event}");
            }
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
