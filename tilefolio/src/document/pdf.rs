//! PDF page sink built on lopdf.
//!
//! Each page is a MediaBox of the raster's pixel size (one PDF unit per
//! pixel) holding a single full-bleed image XObject. Images are stored as
//! 8-bit DeviceRGB compressed with Flate; transparency (blank tiles) is
//! flattened onto white.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use super::{DocumentError, PageInfo, PageOrientation, PageSink};

const IMAGE_NAME: &str = "Im0";

/// Writes pages to a PDF file.
///
/// Image streams are compressed as pages arrive; the page tree and the file
/// are only produced on [`finish`](PageSink::finish).
pub struct PdfPageSink {
    path: PathBuf,
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    finished: bool,
}

impl PdfPageSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            path: path.into(),
            doc,
            pages_id,
            page_ids: Vec::new(),
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&mut self) -> Result<(), DocumentError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(self.page_ids.len() as i64),
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let write_error = |source| DocumentError::Write {
            path: self.path.clone(),
            source,
        };
        let file = File::create(&self.path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save_to(&mut writer)
            .map_err(|e| DocumentError::Pdf(e.to_string()))?;
        writer.flush().map_err(write_error)?;
        Ok(())
    }
}

impl PageSink for PdfPageSink {
    fn add_page(&mut self, image: &RgbaImage) -> Result<PageInfo, DocumentError> {
        if self.finished {
            return Err(DocumentError::Finished);
        }
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DocumentError::EmptyPage { width, height });
        }

        let compressed = deflate(&flatten_onto_white(image)).map_err(DocumentError::Encode)?;
        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(i64::from(width)),
                "Height" => Object::Integer(i64::from(height)),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "FlateDecode",
            },
            compressed,
        )
        .with_compression(false);
        let image_id = self.doc.add_object(image_stream);

        let content = format!("q {} 0 0 {} 0 0 cm /{} Do Q", width, height, IMAGE_NAME);
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(i64::from(width)),
                Object::Integer(i64::from(height)),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
        });
        self.page_ids.push(page_id);

        let info = PageInfo {
            index: self.page_ids.len() - 1,
            width,
            height,
            orientation: PageOrientation::of(width, height),
        };
        debug!(
            page = info.index + 1,
            width,
            height,
            orientation = %info.orientation,
            "Page added"
        );
        Ok(info)
    }

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Writes the PDF. A document without pages writes nothing.
    fn finish(&mut self) -> Result<usize, DocumentError> {
        if self.finished {
            return Err(DocumentError::Finished);
        }
        self.finished = true;

        let pages = self.page_ids.len();
        if pages == 0 {
            info!(path = %self.path.display(), "No pages to save, skipping PDF");
            return Ok(0);
        }

        self.write_document()?;
        info!(path = %self.path.display(), pages, "PDF saved");
        Ok(pages)
    }

    fn discard(&mut self) {
        debug!(pages = self.page_ids.len(), "Discarding pages");
        self.doc = Document::with_version("1.5");
        self.pages_id = self.doc.new_object_id();
        self.page_ids.clear();
        self.finished = true;
    }
}

/// Drops alpha by compositing every pixel over white.
fn flatten_onto_white(image: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        rgb.extend_from_slice(&[blend(r), blend(g), blend(b)]);
    }
    rgb
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
