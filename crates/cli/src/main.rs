// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `gwctl` - a thin command-line front end over the task runtime gateway's
//! in-process [`gw_gateway::Service`]. There is no wire protocol here: every
//! subcommand builds its own gateway wiring, drives it, and tears it down.

mod commands;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};

use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "gwctl", version, about = "Task runtime gateway control tool")]
struct Cli {
    /// Output format for commands that print structured data.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a run and stream its events until it reaches a terminal state.
    Run(commands::run::RunArgs),
    /// Print the effective gateway configuration resolved from the environment.
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::handle(args, cli.format).await.map(Some),
        Commands::Config => commands::config::handle(cli.format).map(|()| None),
    };

    match result {
        Ok(Some(code)) => std::process::exit(code),
        Ok(None) => {}
        Err(err) => {
            if let Some(exit_err) = err.downcast_ref::<ExitError>() {
                eprintln!("error: {exit_err}");
                std::process::exit(exit_err.code);
            }
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
