//! Tilefolio CLI - print web-map imagery as a paper-sized grid atlas.

mod commands;
mod error;

use std::process;

use clap::{Parser, Subcommand};

use commands::export::ExportArgs;
use commands::plan::PlanArgs;

#[derive(Parser)]
#[command(name = "tilefolio")]
#[command(version)]
#[command(about = "Split a map area into paper-shaped pages and export them as a PDF atlas")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in imagery sources
    Basemaps,

    /// Show the grid, each page's zoom level and the expected tile downloads
    Plan(PlanArgs),

    /// Download the tiles and write one PDF page per grid cell
    Export(ExportArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Basemaps => commands::basemaps::run().map(|()| 0),
        Commands::Plan(args) => commands::plan::run(args).map(|()| 0),
        Commands::Export(args) => commands::export::run(args),
    };

    match result {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => e.exit(),
    }
}
