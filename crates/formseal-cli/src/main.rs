//! Formseal CLI - encryption at rest for a single form record
//!
//! Stdout carries JSON responses only; diagnostics and logs go to stderr.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod input;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{misc, record, slot};
use crate::constants::{DEFAULT_LOG_FILTER, QUIET_LOG_FILTER};
use crate::errors::exit_code_for;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let ctx = AppContext::new(&cli);
    if let Err(e) = run(&ctx, &cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }
}

fn init_tracing(quiet: bool) {
    let fallback = if quiet {
        QUIET_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Seal(args) => record::handle_seal(ctx, args),
        Commands::Open(args) => record::handle_open(ctx, args),
        Commands::Save(args) => slot::handle_save(ctx, args),
        Commands::Load => slot::handle_load(ctx),
        Commands::Status => slot::handle_status(ctx),
        Commands::Completions { shell } => misc::handle_completions(*shell),
    }
}
