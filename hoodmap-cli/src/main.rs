//! hoodmap CLI - inspect neighborhood overlays from the command line.
//!
//! Loads the configured datasets into an in-memory map engine and reports
//! what the overlay panel and the engine would show.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use hoodmap::engine::BaseMap;

use commands::config::ConfigCommands;
use error::CliError;
use runner::{CliRunner, Overrides};

#[derive(Parser)]
#[command(name = "hoodmap")]
#[command(version = hoodmap::VERSION)]
#[command(about = "Neighborhood street, school and isochrone overlays", long_about = None)]
struct Cli {
    /// Dataset location (http(s) base URL or directory), overriding config.ini
    #[arg(long, global = true)]
    source: Option<String>,

    /// Base map style: osm, light, dark or none
    #[arg(long, global = true)]
    basemap: Option<BaseMap>,

    /// Enable debug-level logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print amenity statistics per neighborhood
    Stats,

    /// Print the layer panel, optionally after toggling keys
    Layers {
        /// Toggle a key before printing, e.g. --toggle nb__dtn__bike=off
        #[arg(long = "toggle", value_name = "KEY=on|off")]
        toggles: Vec<String>,

        /// Also list every engine layer with its visibility
        #[arg(long)]
        engine: bool,
    },

    /// List the available base maps
    Basemaps,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let overrides = Overrides {
        source: cli.source,
        base_map: cli.basemap,
        debug: cli.debug,
    };

    match cli.command {
        Commands::Stats => commands::stats::run(&CliRunner::new(overrides)?),
        Commands::Layers { toggles, engine } => {
            commands::layers::run(&CliRunner::new(overrides)?, &toggles, engine)
        }
        Commands::Basemaps => {
            for base in BaseMap::ALL {
                let marker = if base == BaseMap::default() { " (default)" } else { "" };
                println!("{:<6} {}{}", base.id(), base.name(), marker);
            }
            Ok(())
        }
        Commands::Config { command } => commands::config::run(command),
    }
}
