//! Main entry point for the ips-patcher CLI

mod cli;
mod commands;
mod context;
mod utils;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Set verbosity
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    // Execute command
    match cli.command {
        Commands::List { source } => commands::patches::execute_list(&source.into()),
        Commands::Info { patch } => commands::patches::execute_info(&patch),
        Commands::Conflicts { source, limit } => {
            commands::conflicts::execute(&source.into(), limit)
        }
        Commands::Apply(args) => commands::apply::execute(args),
        Commands::Identify { rom } => commands::rom::execute_identify(&rom),
        Commands::Selection { source, command } => {
            commands::selection::execute(&source.into(), command)
        }
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
