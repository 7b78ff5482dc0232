//! PDF page rasterization.
//!
//! The trait is the seam the relay pipeline depends on; `PdfiumRasterizer`
//! binds the system pdfium library at call time. Tests inject fakes instead
//! of shipping real PDFs.

use std::io::Cursor;

use {
    image::ImageFormat,
    pdfium_render::prelude::{PdfRenderConfig, Pdfium},
    tracing::debug,
};

use crate::error::{Error, Result};

/// Target width for rendered pages; tall pages scale proportionally.
pub const PAGE_RENDER_WIDTH: i32 = 1024;

/// JPEG bytes for one rendered page.
pub type PageJpeg = Vec<u8>;

/// Renders every page of a PDF to JPEG, in page order.
pub trait PdfRasterizer: Send + Sync {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<PageJpeg>>;
}

/// Rasterizer backed by the system pdfium library.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumRasterizer;

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PdfRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<PageJpeg>> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| Error::external("failed to bind pdfium", e))?;
        let pdfium = Pdfium::new(bindings);

        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| Error::external("failed to open pdf", e))?;

        let config = PdfRenderConfig::new().set_target_width(PAGE_RENDER_WIDTH);
        let mut pages = Vec::new();

        for page in document.pages().iter() {
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| Error::external("failed to render pdf page", e))?;

            let mut jpeg = Vec::new();
            bitmap
                .as_image()
                .to_rgb8()
                .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
                .map_err(|e| Error::external("failed to encode page jpeg", e))?;
            pages.push(jpeg);
        }

        if pages.is_empty() {
            return Err(Error::invalid_input("pdf contains no pages"));
        }

        debug!(pages = pages.len(), "pdf rasterized");
        Ok(pages)
    }
}
