mod api;
mod cli;
mod client;
mod config;
mod error;
mod format;
mod query;
mod resolve;
mod submit;
mod swagger;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) => {
            e.print().ok();
            return ExitCode::from(if e.use_stderr() { 2 } else { 0 });
        }
    };

    init_logging(cli.verbose);
    let debug = cli.debug;

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if debug {
                if let Some(raw) = e.raw_exchange() {
                    println!("{raw}");
                }
            }
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
