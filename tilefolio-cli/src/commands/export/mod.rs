//! Export command - render every grid cell to one page of a PDF.

mod progress;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use console::style;
use tilefolio::document::PdfPageSink;
use tilefolio::export::{ExportJob, ExportOrchestrator, ExportStatus};
use tilefolio::logging::init_logging;
use tilefolio::mosaic::TileMosaicRenderer;
use tilefolio::provider::AsyncReqwestClient;
use tilefolio::zoom::{base_size, MAX_PAGE_SIDE};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::level_filters::LevelFilter;

use self::progress::ProgressObserver;
use super::common::{build_grid, load_config, resolve_resolution, resolve_source, GridArgs};
use crate::error::CliError;

/// Exit status when the export stopped on an error.
pub const EXIT_FAILED: i32 = 1;

/// Exit status after Ctrl-C (128 + SIGINT).
pub const EXIT_CANCELLED: i32 = 130;

/// Arguments for the export command.
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Fixed zoom level; still capped per cell at auto+2 and native+2
    #[arg(long, allow_negative_numbers = true)]
    pub zoom: Option<i32>,

    /// Custom XYZ tile URL containing {z}, {x} and {y}
    #[arg(long, value_name = "URL")]
    pub template: Option<String>,

    /// Highest zoom the custom template serves natively
    #[arg(long, requires = "template")]
    pub max_native_zoom: Option<u8>,

    /// Output PDF (config default: map_grid.pdf)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Give up on a single tile after this many seconds (0 waits forever)
    #[arg(long, value_name = "SECS")]
    pub tile_timeout: Option<u64>,
}

/// Run the export command, returning the process exit status.
pub fn run(args: ExportArgs) -> Result<i32, CliError> {
    let config = load_config(args.grid.config.as_deref())?;
    let _logging = init_logging(
        &config.logging.directory,
        &config.logging.file,
        LevelFilter::WARN,
    )
    .map_err(CliError::LoggingInit)?;
    info!(version = env!("CARGO_PKG_VERSION"), "tilefolio export");

    let grid = build_grid(&args.grid, &config)?;
    let source = resolve_source(
        args.grid.basemap,
        args.template.as_deref(),
        args.max_native_zoom,
        &config,
    )?;
    let resolution = resolve_resolution(args.grid.resolution, &config);
    let output = args.output.unwrap_or_else(|| config.export.output.clone());
    let tile_timeout = args
        .tile_timeout
        .or(config.download.tile_timeout)
        .map(Duration::from_secs);

    let client =
        AsyncReqwestClient::with_settings(config.download.timeout, &config.download.user_agent)?;
    let orchestrator =
        ExportOrchestrator::new(TileMosaicRenderer::new(client).with_tile_timeout(tile_timeout));

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if !handler_token.is_cancelled() {
            eprintln!();
            eprintln!("Cancelling after the current page...");
        }
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let total = grid.len();
    println!("Tilefolio Export v{}", env!("CARGO_PKG_VERSION"));
    println!("=======================");
    println!();
    println!("Pages:      {} ({} x {})", total, grid.rows(), grid.cols());
    println!("Basemap:    {}", source.name);
    println!(
        "Resolution: {} (page side {} px)",
        resolution,
        MAX_PAGE_SIDE.min(base_size(resolution, total))
    );
    if let Some(zoom) = args.zoom {
        println!("Zoom:       {} (requested)", zoom);
    }
    println!("Output:     {}", output.display());
    println!();

    let job = ExportJob::new(grid.into_cells(), source)
        .with_resolution(resolution)
        .with_zoom_override(args.zoom)
        .with_cancellation(cancel);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let observer = ProgressObserver::new(total);
    let mut sink = PdfPageSink::new(output);
    let status = runtime.block_on(orchestrator.run(job, &mut sink, &observer))?;

    report(&status, sink.path());
    Ok(exit_code(&status))
}

/// Maps a terminal status to the process exit status.
pub fn exit_code(status: &ExportStatus) -> i32 {
    match status {
        ExportStatus::Completed { .. } => 0,
        ExportStatus::Failed { .. } => EXIT_FAILED,
        ExportStatus::Cancelled => EXIT_CANCELLED,
    }
}

fn report(status: &ExportStatus, output: &Path) {
    println!();
    match status {
        ExportStatus::Completed { pages } => {
            println!(
                "{} {} pages to {}",
                style("Saved").green().bold(),
                pages,
                output.display()
            );
        }
        ExportStatus::Cancelled => {
            println!(
                "{} {} was not written",
                style("Cancelled.").yellow().bold(),
                output.display()
            );
        }
        ExportStatus::Failed { pages, reason } => {
            println!("{} {}", style("Export failed:").red().bold(), reason);
            if *pages > 0 {
                println!(
                    "Saved the {} pages rendered before the failure to {}",
                    pages,
                    output.display()
                );
            } else {
                println!("Nothing was saved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&ExportStatus::Completed { pages: 4 }), 0);
        assert_eq!(exit_code(&ExportStatus::Cancelled), EXIT_CANCELLED);
        assert_eq!(
            exit_code(&ExportStatus::Failed {
                pages: 3,
                reason: "cell r1_c4 failed to render".to_string(),
            }),
            EXIT_FAILED
        );
    }
}
