//! Plan command - preview a grid, its zoom levels and tile counts.

use clap::Args;
use console::style;
use tilefolio::grid::Grid;
use tilefolio::provider::BasemapSource;
use tilefolio::zoom::{base_size, resolve_zoom, zoom_options, ResolutionMode, MAX_PAGE_SIDE};

use super::common::{
    build_grid, load_config, resolve_paper, resolve_resolution, resolve_source, GridArgs,
};
use crate::error::CliError;

/// Arguments for the plan command.
#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub grid: GridArgs,
}

/// Run the plan command.
pub fn run(args: PlanArgs) -> Result<(), CliError> {
    let config = load_config(args.grid.config.as_deref())?;
    let grid = build_grid(&args.grid, &config)?;
    let source = resolve_source(args.grid.basemap, None, None, &config)?;
    let resolution = resolve_resolution(args.grid.resolution, &config);

    let paper = if args.grid.exact {
        "exact bbox".to_string()
    } else {
        resolve_paper(&args.grid, &config).to_string()
    };

    println!("Grid:       {} x {} ({})", grid.rows(), grid.cols(), paper);
    if let Some(summary) = grid.summary() {
        println!("Size:       {}", summary);
    }
    println!("Basemap:    {} (native zoom {})", source.name, source.max_native_zoom);
    println!(
        "Resolution: {} (page side {} px)",
        resolution,
        MAX_PAGE_SIDE.min(base_size(resolution, grid.len()))
    );
    println!();

    print_cells(&grid, &source, resolution);
    println!();
    print_zoom_options(&grid, &source, resolution);

    Ok(())
}

fn print_cells(grid: &Grid, source: &BasemapSource, resolution: ResolutionMode) {
    println!("{}", style("Cells (row 1 is the southern edge)").bold());
    for cell in grid.cells() {
        let zoom = resolve_zoom(&cell.bbox, source, None, resolution, grid.len());
        println!("  {:<10} z{:<3} {}", cell.label(), zoom, cell.bbox);
    }
}

fn print_zoom_options(grid: &Grid, source: &BasemapSource, resolution: ResolutionMode) {
    println!("{}", style("Zoom options (export --zoom)").bold());
    for option in zoom_options(grid, source, resolution) {
        println!(
            "  {:<5} z{:<3} ~{} tiles",
            option.label, option.zoom, option.estimated_tiles
        );
    }
}
