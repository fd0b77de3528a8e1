//! Tilefolio - paper-sized map atlases built from web-map tiles
//!
//! This library partitions a geographic viewport into a grid of
//! paper-proportioned cells and renders every cell to its own PDF page by
//! fetching and stitching raster tiles from a basemap provider.
//!
//! # Pipeline
//!
//! ```text
//! viewport + PaperSpec ──► grid::Grid ──► export::ExportJob
//!                                              │
//!                      ┌───────────────────────┘  (one cell at a time)
//!                      ▼
//!      zoom::resolve_zoom ──► mosaic::TileMosaicRenderer ──► document::PageSink
//!                                   │
//!                                   └─ provider::AsyncHttpClient (all tiles of a cell in parallel)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tilefolio::coord::GeoBBox;
//! use tilefolio::document::PdfPageSink;
//! use tilefolio::export::{ExportJob, ExportOrchestrator, NoopObserver};
//! use tilefolio::grid::{Grid, PaperSpec};
//! use tilefolio::provider::{AsyncReqwestClient, Basemap};
//! use tilefolio::zoom::ResolutionMode;
//!
//! let viewport = GeoBBox::from_corners(135.9, 35.2, 136.2, 35.5)?;
//! let grid = Grid::partition(&viewport, 2, 3, PaperSpec::a4_landscape());
//! let job = ExportJob::new(grid.into_cells(), Basemap::Esri.source())
//!     .with_resolution(ResolutionMode::High);
//!
//! let orchestrator = ExportOrchestrator::with_mosaic(AsyncReqwestClient::new()?);
//! let mut sink = PdfPageSink::new("atlas.pdf");
//! let status = orchestrator.run(job, &mut sink, &NoopObserver).await?;
//! println!("{}", status);
//! ```

pub mod config;
pub mod coord;
pub mod document;
pub mod export;
pub mod grid;
pub mod logging;
pub mod mosaic;
pub mod provider;
pub mod zoom;
