// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

mod caps;
mod error;
mod modes;
mod negotiate;
mod probe;
mod utils;

use clap::{Parser, Subcommand};
use error::result_to_exit_code;
use std::process::ExitCode;

/// hwdecode CLI - Hardware decode negotiation diagnostics
#[derive(Parser)]
#[command(name = "hwdecode")]
#[command(version)]
#[command(about = "hwdecode CLI - Hardware decode negotiation diagnostics")]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (use RUST_LOG=trace for more)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known hardware decode profiles in preference order
    Modes(modes::Args),

    /// Replay a captured GPU capability description through a decoder session
    Negotiate(negotiate::Args),

    /// Check whether the platform decode library can be loaded
    Probe(probe::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Modes(args) => modes::execute(args, cli.json),
        Commands::Negotiate(args) => negotiate::execute(args, cli.json),
        Commands::Probe(args) => probe::execute(args, cli.json),
    };

    result_to_exit_code(result)
}

/// Initialize env_logger based on verbosity flags
fn init_logging(verbose: bool, quiet: bool) {
    let env = env_logger::Env::default();

    let env = if quiet {
        env.default_filter_or("error")
    } else if verbose {
        env.default_filter_or("debug")
    } else {
        env.default_filter_or("info")
    };

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .init();

    log::debug!("Logging initialized");
}
