//! Chie CLI - an encrypted personal journal with tasks and calendar events
//!
//! This is the command-line interface for Chie. It provides a user-friendly
//! interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;
mod ui;

use clap::Parser;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{event, export, init, journal, misc, recover, status, task};
use crate::errors::exit_code_for;

fn main() {
    logging::init_logging();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code_for(&e));
    }
}

fn run(ctx: &AppContext<'_>, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => init::handle_init(ctx, args),
        Commands::Journal(command) => journal::handle_journal(ctx, command),
        Commands::Task(command) => task::handle_task(ctx, command),
        Commands::Event(command) => event::handle_event(ctx, command),
        Commands::Export(args) => export::handle_export(ctx, args),
        Commands::Recover(args) => recover::handle_recover(ctx, args),
        Commands::Status(args) => status::handle_status(ctx, args),
        Commands::Completions { shell } => misc::handle_completions(*shell),
    }
}
