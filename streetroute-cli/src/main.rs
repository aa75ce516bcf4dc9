//! StreetRoute CLI - Command-line interface
//!
//! Turns a recorded GPX track into a sequence of street-level images.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::RouteArgs;
use commands::config::ConfigCommands;
use commands::export::ExportArgs;
use commands::view::ViewArgs;

#[derive(Parser)]
#[command(name = "streetroute")]
#[command(version = streetroute::VERSION)]
#[command(about = "Street-level imagery along recorded GPS tracks", long_about = None)]
struct Cli {
    /// Log at debug level and mirror log events to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and sample a track, and print its viewpoints
    Inspect(RouteArgs),

    /// Load every viewpoint of a track and export the images
    Export(ExportArgs),

    /// Resolve one viewpoint, prefetch its neighbors and save its image
    View(ViewArgs),

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect(args) => commands::inspect::run(args, cli.verbose),
        Commands::Export(args) => commands::export::run(args, cli.verbose),
        Commands::View(args) => commands::view::run(args, cli.verbose),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
