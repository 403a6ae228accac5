//! Main entry point for the rigtool CLI

mod cli;
mod commands;
mod utils;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use rig_anim::diagnostics::{self, DEFAULT_CAPACITY};
use std::io;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG still wins over the verbosity flags
    let logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
            .build();
    let max_level = logger.filter();
    diagnostics::init(Some(Box::new(logger)), DEFAULT_CAPACITY)?;
    log::set_max_level(max_level);

    // Execute command
    match cli.command {
        Commands::Clip { command } => commands::clip::execute(command),
        Commands::Sm { command } => commands::sm::execute(command),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
