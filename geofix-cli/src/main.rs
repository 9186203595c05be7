//! geofix CLI - Command-line interface
//!
//! This binary drives the geofix location coordinator against a simulated
//! platform and manages the configuration file.

mod commands;
mod error;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::locate::LocateArgs;

#[derive(Parser)]
#[command(name = "geofix")]
#[command(version, about = "Acquire device location from GPS and network sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one location acquisition session and print each update
    Locate(LocateArgs),

    /// View or modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Locate(args) => commands::locate::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
