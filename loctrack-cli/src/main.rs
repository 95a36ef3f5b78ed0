//! loctrack CLI - Command-line interface
//!
//! This binary drives the loctrack library: it runs a tracking session and
//! prints samples as they arrive, and manages the configuration file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "loctrack")]
#[command(version = loctrack::VERSION)]
#[command(about = "Background location tracking from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start tracking and print samples until Ctrl-C
    Run(RunArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
