// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Document writer — accumulates layout rows into a printpdf document
// and persists it once.
//
// printpdf 0.8 uses a data-oriented API: documents are built by
// constructing `PdfPage` structs containing `Vec<Op>` operation lists,
// then serialised via `PdfDocument::save()`. Each appended row becomes
// one output page of the configured geometry, which is exactly the
// original "row, then page break" sequencing.

use std::path::Path;

use image::DynamicImage;
use printpdf::{
    BuiltinFont, Color, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions,
    PdfWarnMsg, Point, Polygon, PolygonRing, Pt, RawImage, RawImageData, RawImageFormat, Rgb,
    TextItem, WindingOrder, XObjectId, XObjectTransform,
};
use tagwerk_core::PageGeometry;
use tagwerk_core::error::TagwerkError;
use tracing::{debug, info, instrument};

use crate::layout::{LayoutRow, Placement, SerialRun, SymbolCell};

const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

/// Room left under the text baseline inside its box, as a fraction of
/// the font size (Helvetica descent is ~0.21 em).
const DESCENT_FACTOR: f32 = 0.25;

/// Writes assembled rows into a single output document.
///
/// The page geometry is applied once at construction and the reference
/// image is registered once as a shared XObject; `append_row` only
/// accumulates in-memory pages. `save` serialises and writes exactly
/// once, so a failed run leaves no partial file.
pub struct DocumentWriter {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    geometry: PageGeometry,
    reference_id: XObjectId,
    reference_px: (u32, u32),
}

impl DocumentWriter {
    /// Create a writer with the document-wide geometry and the shared
    /// reference image.
    #[instrument(skip_all, fields(title))]
    pub fn new(title: &str, geometry: PageGeometry, reference: &DynamicImage) -> Self {
        let mut doc = PdfDocument::new(title);
        let reference_px = (reference.width(), reference.height());
        let reference_id = doc.add_image(&raw_image(reference));

        info!(
            page_w_in = geometry.width_in,
            page_h_in = geometry.height_in,
            ref_w = reference_px.0,
            ref_h = reference_px.1,
            "Output document started"
        );

        Self {
            doc,
            pages: Vec::new(),
            geometry,
            reference_id,
            reference_px,
        }
    }

    /// Number of rows appended so far.
    pub fn row_count(&self) -> usize {
        self.pages.len()
    }

    /// Append one row as a new output page.
    pub fn append_row(&mut self, row: LayoutRow) {
        let mut ops: Vec<Op> = Vec::new();

        // Reference image, shared XObject registered at construction.
        ops.push(self.place_image(self.reference_id.clone(), self.reference_px, row.reference));

        match row.symbol {
            SymbolCell::Crop { image, placement } => {
                let crop_px = (image.width(), image.height());
                let crop_id = self.doc.add_image(&raw_image(&image));
                ops.push(self.place_image(crop_id, crop_px, placement));
            }
            SymbolCell::Fallback { text, placement } => {
                let font_size = row.serial.style.font_size_pt;
                ops.push(Op::SetFillColor {
                    col: rgb_color([0, 0, 0]),
                });
                ops.extend(self.text_ops(&text, placement, font_size));
            }
        }

        ops.extend(self.serial_ops(&row.serial));

        let (page_w, page_h) = self.page_dimensions();
        self.pages.push(PdfPage::new(page_w, page_h, ops));
        debug!(rows = self.pages.len(), "Row appended");
    }

    /// Serialise the document and write it to `path`.
    ///
    /// Consumes the writer; the file is written in one shot at the end
    /// of the run.
    #[instrument(skip(self), fields(path = %path.as_ref().display(), rows = self.pages.len()))]
    pub fn save(self, path: impl AsRef<Path>) -> Result<(), TagwerkError> {
        let mut doc = self.doc;
        doc.with_pages(self.pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);

        std::fs::write(path.as_ref(), &bytes).map_err(|err| {
            TagwerkError::Output(format!(
                "cannot write {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;

        info!(
            bytes = bytes.len(),
            "Output document written to {}",
            path.as_ref().display()
        );
        Ok(())
    }

    // -- Op construction ------------------------------------------------------

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        (
            Mm(self.geometry.width_in * MM_PER_INCH),
            Mm(self.geometry.height_in * MM_PER_INCH),
        )
    }

    /// Place a registered image XObject into an absolute box.
    ///
    /// With `dpi = 72` the image's native size equals its pixel count in
    /// points, so the scale factors are simply target / native. Width
    /// and height scale independently: symbol crops are forced to the
    /// configured box like the original layout did.
    fn place_image(&self, id: XObjectId, px: (u32, u32), placement: Placement) -> Op {
        let target_w_pt = placement.width_in * POINTS_PER_INCH;
        let target_h_pt = placement.height_in * POINTS_PER_INCH;
        let scale_x = if px.0 == 0 {
            1.0
        } else {
            target_w_pt / px.0 as f32
        };
        let scale_y = if px.1 == 0 {
            1.0
        } else {
            target_h_pt / px.1 as f32
        };

        Op::UseXobject {
            id,
            transform: XObjectTransform {
                translate_x: Some(Pt(placement.x_in * POINTS_PER_INCH)),
                translate_y: Some(Pt(self.bottom_pt(placement))),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(POINTS_PER_INCH),
                rotate: None,
            },
        }
    }

    /// The styled serial run: solid fill box, then white Helvetica text.
    fn serial_ops(&self, serial: &SerialRun) -> Vec<Op> {
        let mut ops = Vec::new();

        ops.push(Op::SetFillColor {
            col: rgb_color(serial.style.fill),
        });
        ops.push(Op::DrawPolygon {
            polygon: self.box_polygon(serial.placement),
        });
        ops.push(Op::SetFillColor {
            col: rgb_color(serial.style.foreground),
        });
        ops.extend(self.text_ops(&serial.text, serial.placement, serial.style.font_size_pt));

        ops
    }

    fn text_ops(&self, text: &str, placement: Placement, font_size_pt: f32) -> Vec<Op> {
        let baseline_pt = self.bottom_pt(placement) + font_size_pt * DESCENT_FACTOR;
        vec![
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point {
                    x: Pt(placement.x_in * POINTS_PER_INCH),
                    y: Pt(baseline_pt),
                },
            },
            Op::SetFontSizeBuiltinFont {
                size: Pt(font_size_pt),
                font: BuiltinFont::Helvetica,
            },
            Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(text.to_string())],
                font: BuiltinFont::Helvetica,
            },
            Op::EndTextSection,
        ]
    }

    /// Filled rectangle for a placement box.
    fn box_polygon(&self, placement: Placement) -> Polygon {
        let left = Pt(placement.x_in * POINTS_PER_INCH);
        let right = Pt((placement.x_in + placement.width_in) * POINTS_PER_INCH);
        let bottom = Pt(self.bottom_pt(placement));
        let top = Pt(self.bottom_pt(placement) + placement.height_in * POINTS_PER_INCH);

        let corner = |x: Pt, y: Pt| LinePoint {
            p: Point { x, y },
            bezier: false,
        };

        Polygon {
            rings: vec![PolygonRing {
                points: vec![
                    corner(left, bottom),
                    corner(right, bottom),
                    corner(right, top),
                    corner(left, top),
                ],
            }],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        }
    }

    /// Convert a top-left-origin placement to the PDF bottom-left y of
    /// its lower edge, in points.
    fn bottom_pt(&self, placement: Placement) -> f32 {
        (self.geometry.height_in - placement.y_in - placement.height_in) * POINTS_PER_INCH
    }
}

/// Pack a decoded image into printpdf's raw RGB8 form.
fn raw_image(image: &DynamicImage) -> RawImage {
    let rgb = image.to_rgb8();
    RawImage {
        pixels: RawImageData::U8(rgb.as_raw().clone()),
        width: image.width() as usize,
        height: image.height() as usize,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    }
}

fn rgb_color(rgb: [u8; 3]) -> Color {
    Color::Rgb(Rgb {
        r: rgb[0] as f32 / 255.0,
        g: rgb[1] as f32 / 255.0,
        b: rgb[2] as f32 / 255.0,
        icc_profile: None,
    })
}
