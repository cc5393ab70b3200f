// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Page rasteriser — renders PDF pages to bitmaps via pdfium, one page
// at a time. At 300 DPI a single Letter page is ~8 MB of pixels, so the
// caller iterates `0..page_count()` and only one bitmap is ever alive.

use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tagwerk_core::error::TagwerkError;
use tracing::{debug, info, instrument};

/// Points per inch in PDF coordinate space.
const POINTS_PER_INCH: f32 = 72.0;

/// One rendered page.
pub struct PageBitmap {
    /// 0-based page index, stable in document order.
    pub index: usize,
    pub image: DynamicImage,
    /// Density the page was rendered at.
    pub dpi: u32,
}

/// Renders the pages of one PDF on demand.
///
/// The document is re-loaded from the owned byte buffer for every
/// render, so the rasteriser carries no self-referential borrows; the
/// parse cost is negligible next to rendering.
pub struct PageRasterizer {
    pdfium: Pdfium,
    bytes: Vec<u8>,
    page_count: usize,
    dpi: u32,
    source: String,
}

impl PageRasterizer {
    /// Open a PDF for rendering at the given density.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), dpi))]
    pub fn open(path: impl AsRef<Path>, dpi: u32) -> Result<Self, TagwerkError> {
        let path_ref = path.as_ref();
        let bytes = std::fs::read(path_ref).map_err(|err| {
            TagwerkError::Pdf(format!("failed to read {}: {}", path_ref.display(), err))
        })?;

        let pdfium = bind_pdfium()?;
        let page_count = {
            let document = pdfium
                .load_pdf_from_byte_slice(&bytes, None)
                .map_err(|err| {
                    TagwerkError::Pdf(format!(
                        "failed to parse {}: {}",
                        path_ref.display(),
                        err
                    ))
                })?;
            document.pages().len() as usize
        };

        info!(pages = page_count, "PDF opened for rasterisation");

        Ok(Self {
            pdfium,
            bytes,
            page_count,
            dpi,
            source: path_ref.display().to_string(),
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Render a single page (0-based) to a bitmap at the configured DPI.
    #[instrument(skip(self), fields(index, source = %self.source))]
    pub fn render_page(&self, index: usize) -> Result<PageBitmap, TagwerkError> {
        if index >= self.page_count {
            return Err(TagwerkError::Raster(format!(
                "page index {} out of range ({} pages in {})",
                index, self.page_count, self.source
            )));
        }

        let document = self
            .pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(|err| {
                TagwerkError::Pdf(format!("failed to re-parse {}: {}", self.source, err))
            })?;

        let page = document.pages().get(index as u16).map_err(|err| {
            TagwerkError::Raster(format!(
                "cannot access page {} of {}: {}",
                index, self.source, err
            ))
        })?;

        let scale = self.dpi as f32 / POINTS_PER_INCH;
        let width_px = (page.width().value * scale).round() as i32;
        let height_px = (page.height().value * scale).round() as i32;

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width_px)
                    .set_maximum_height(height_px),
            )
            .map_err(|err| {
                TagwerkError::Raster(format!(
                    "failed to render page {} of {}: {}",
                    index, self.source, err
                ))
            })?;

        let image = bitmap.as_image();
        debug!(
            index,
            width = image.width(),
            height = image.height(),
            "Page rendered"
        );

        Ok(PageBitmap {
            index,
            image,
            dpi: self.dpi,
        })
    }
}

/// Bind the pdfium library: system install first, then a copy sitting
/// next to the executable.
fn bind_pdfium() -> Result<Pdfium, TagwerkError> {
    let bindings = Pdfium::bind_to_system_library()
        .or_else(|_| Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./")))
        .map_err(|err| {
            TagwerkError::Raster(format!("failed to bind pdfium library: {}", err))
        })?;
    Ok(Pdfium::new(bindings))
}
