/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod logging;

use cli::{Cli, Command};
use config::DoxaConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = DoxaConfig::load(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Compile(args) => {
            let report = commands::compile::execute(&args, &config, &mut stdout)?;
            Ok(if report.errors > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Ldp(args) => {
            commands::ldp::execute(&args, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
