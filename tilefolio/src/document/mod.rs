//! Output documents.
//!
//! A [`PageSink`] collects one page per rendered cell and writes the finished
//! document on [`PageSink::finish`]. [`PdfPageSink`] is the real
//! implementation; the export orchestrator only sees the trait.

mod pdf;

pub use pdf::PdfPageSink;

use std::fmt;
use std::path::PathBuf;

use image::RgbaImage;
use thiserror::Error;

/// Page orientation, derived from the raster's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    /// Width >= height
    Landscape,
    Portrait,
}

impl PageOrientation {
    pub fn of(width: u32, height: u32) -> Self {
        if width >= height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        }
    }
}

impl fmt::Display for PageOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageOrientation::Landscape => "landscape",
            PageOrientation::Portrait => "portrait",
        })
    }
}

/// Description of a page that was added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 0-based position in the document
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub orientation: PageOrientation,
}

/// Errors from building or writing a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot add a {width}x{height} page")]
    EmptyPage { width: u32, height: u32 },

    #[error("failed to compress page image: {0}")]
    Encode(#[source] std::io::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF serialisation failed: {0}")]
    Pdf(String),

    #[error("document already finished")]
    Finished,
}

/// Destination for rendered pages.
///
/// Pages are kept in insertion order. Nothing reaches the output until
/// [`finish`](PageSink::finish); [`discard`](PageSink::discard) drops all
/// pages without writing.
pub trait PageSink: Send {
    /// Appends a page sized exactly to `image`, with the image as its only
    /// content.
    fn add_page(&mut self, image: &RgbaImage) -> Result<PageInfo, DocumentError>;

    /// Pages added so far.
    fn page_count(&self) -> usize;

    /// Writes the document and returns the number of pages saved.
    fn finish(&mut self) -> Result<usize, DocumentError>;

    /// Drops every page; the output is never touched.
    fn discard(&mut self);
}
