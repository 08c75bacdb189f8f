mod cli;
mod config;
mod convert;
mod fit_cmd;
mod logging;
mod prices_cmd;
mod response;
mod sweep_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Fit(args) => fit_cmd::run(args),
        Command::Prices(args) => prices_cmd::run(args),
        Command::Sweep(args) => sweep_cmd::run(args),
    }
}
