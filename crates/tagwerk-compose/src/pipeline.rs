// SPDX-License-Identifier: PMPL-1.0-or-later
//
// The page-to-artifact pipeline: rasterise each batch page, locate and
// crop its symbol, issue a serial, assemble the row, append it to the
// output document, and persist once at the end.
//
// Strictly sequential by design — serial issuance and row appending
// both depend on page order, so pages are processed one at a time and
// only one bitmap is alive at any moment.

use std::path::PathBuf;

use tagwerk_core::error::{Result, TagwerkError};
use tagwerk_core::RunConfig;
use tagwerk_document::{ImageNormalizer, PageRasterizer, SymbolLocator};
use tracing::{info, instrument, warn};

use crate::layout::LayoutAssembler;
use crate::serial::SerialIssuer;
use crate::writer::DocumentWriter;

/// Summary of one completed compose run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeReport {
    /// Rows produced (one per source page).
    pub pages: usize,
    /// Pages whose row embeds a symbol crop (the rest carry the
    /// fallback label).
    pub symbols_found: usize,
    pub output_path: PathBuf,
}

/// Run the full pipeline described by `config`.
///
/// Fatal failures (unusable reference image, unparsable PDF,
/// unwritable output) abort before or without writing anything. A page
/// with no decodable symbol only degrades that page's row.
#[instrument(skip_all, fields(
    pdf = %config.pdf_path.display(),
    output = %config.output_path.display(),
    dpi = config.dpi,
))]
pub fn compose_run(config: &RunConfig) -> Result<ComposeReport> {
    // Reference image first: without it no row can be built.
    let reference_path = ImageNormalizer::normalize(&config.reference_image_path)?;
    let reference = image::open(&reference_path).map_err(|err| {
        TagwerkError::ReferenceImage(format!(
            "cannot decode {}: {}",
            reference_path.display(),
            err
        ))
    })?;

    let rasterizer = PageRasterizer::open(&config.pdf_path, config.dpi)?;

    let title = config
        .output_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Tagwerk".to_string());

    let assembler = LayoutAssembler::new(
        config.layout.clone(),
        (reference.width(), reference.height()),
    );
    let mut serial = SerialIssuer::new(&config.serial);
    let mut writer = DocumentWriter::new(&title, config.layout.geometry, &reference);

    let mut symbols_found = 0usize;
    for index in 0..rasterizer.page_count() {
        let page = rasterizer.render_page(index)?;

        let matches = SymbolLocator::locate(&page.image);
        let first = matches.into_iter().next();
        let crop = first
            .as_ref()
            .and_then(|found| SymbolLocator::crop(&page.image, found.rect));
        if crop.is_some() {
            symbols_found += 1;
        } else if first.is_some() {
            warn!(
                page = index,
                "Symbol decoded but its crop was empty, row gets the fallback label"
            );
        } else {
            warn!(page = index, "No symbol decoded, row gets the fallback label");
        }

        let serial_text = serial.next();
        writer.append_row(assembler.assemble(crop, &serial_text));
    }

    let pages = writer.row_count();
    writer.save(&config.output_path)?;

    info!(
        pages,
        symbols_found,
        "Compose complete: {}",
        config.output_path.display()
    );

    Ok(ComposeReport {
        pages,
        symbols_found,
        output_path: config.output_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma, RgbImage};
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};
    use qrcode::QrCode;
    use tagwerk_document::PdfPreprocessor;

    fn write_reference(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("ref.png");
        DynamicImage::ImageRgb8(RgbImage::from_pixel(294, 146, image::Rgb([180, 40, 40])))
            .save(&path)
            .unwrap();
        path
    }

    /// Build a three-page US Letter batch: page one carries text and a
    /// QR symbol, page two is blank, page three carries text only.
    fn write_batch_pdf(path: &std::path::Path, payload: &str) {
        let code = QrCode::new(payload.as_bytes()).unwrap();
        let qr: GrayImage = code.render::<Luma<u8>>().min_dimensions(240, 240).build();
        let (qr_w, qr_h) = qr.dimensions();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let qr_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => qr_w as i64,
                "Height" => qr_h as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            qr.into_raw(),
        ));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => qr_id },
        });

        // 216pt (3in) symbol at the left edge, clear of the crop band.
        let contents = [
            "q 216 0 0 216 72 400 cm /Im1 Do Q BT /F1 12 Tf 72 720 Td (first) Tj ET".to_string(),
            String::new(),
            "BT /F1 12 Tf 72 720 Td (third) Tj ET".to_string(),
        ];
        let mut kids: Vec<Object> = Vec::new();
        for content in contents {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 3,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    /// Full run over a cleaned batch: the blank page is dropped by the
    /// preprocessor, then each surviving page becomes one output page —
    /// a symbol crop on the first row and the fallback label on the
    /// second.
    #[test]
    fn cleaned_batch_composes_one_row_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch.pdf");
        write_batch_pdf(&batch, "E2E-TICKET");

        let cleaned = dir.path().join("cleaned.pdf");
        let clean = PdfPreprocessor::new(1.0).clean(&batch, &cleaned).unwrap();
        assert_eq!(clean.kept_pages, 2);
        assert_eq!(clean.removed_pages, 1);

        let config = RunConfig {
            pdf_path: cleaned,
            reference_image_path: write_reference(dir.path()),
            output_path: dir.path().join("tags.pdf"),
            dpi: 150,
            ..RunConfig::default()
        };

        let report = match compose_run(&config) {
            Ok(report) => report,
            Err(TagwerkError::Raster(_)) => {
                eprintln!("pdfium library not available, skipping end-to-end test");
                return;
            }
            Err(err) => panic!("compose failed: {err}"),
        };

        assert_eq!(report.pages, 2);
        assert_eq!(report.symbols_found, 1);
        assert!(config.output_path.exists());

        let output = Document::load(&config.output_path).unwrap();
        assert_eq!(output.get_pages().len(), 2);
    }

    #[test]
    fn bad_reference_image_aborts_before_any_page_work() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.dat");
        std::fs::write(&reference, b"not an image").unwrap();

        let config = RunConfig {
            pdf_path: dir.path().join("missing.pdf"),
            reference_image_path: reference,
            output_path: dir.path().join("out.pdf"),
            ..RunConfig::default()
        };

        // The reference image is checked first, so the missing PDF is
        // never even touched.
        let result = compose_run(&config);
        assert!(matches!(result, Err(TagwerkError::ReferenceImage(_))));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn missing_source_pdf_is_fatal_with_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            pdf_path: dir.path().join("missing.pdf"),
            reference_image_path: write_reference(dir.path()),
            output_path: dir.path().join("out.pdf"),
            ..RunConfig::default()
        };

        let result = compose_run(&config);
        assert!(matches!(result, Err(TagwerkError::Pdf(_))));
        assert!(!config.output_path.exists());
    }
}
