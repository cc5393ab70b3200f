// SPDX-License-Identifier: PMPL-1.0-or-later
//
// PDF preprocessor — drops blank pages and crops a fixed width from the
// right edge of every retained page, using the `lopdf` crate.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use tagwerk_core::error::TagwerkError;
use tracing::{debug, info, instrument, warn};

/// Points per inch in PDF coordinate space.
const POINTS_PER_INCH: f32 = 72.0;

/// Outcome of one preprocessing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    /// Pages kept (and cropped) in the output.
    pub kept_pages: usize,
    /// Blank pages removed.
    pub removed_pages: usize,
}

/// Removes blank pages from a batch PDF and crops each remaining page.
///
/// A page is blank iff text extraction succeeds and yields nothing but
/// whitespace; a page whose text cannot be extracted is kept. Cropping
/// subtracts `crop_width_in` inches from the right edge of the page's
/// effective `/MediaBox`; left, top, and bottom edges are untouched.
/// Page order is preserved.
pub struct PdfPreprocessor {
    /// Width removed from the right edge, in inches.
    crop_width_in: f32,
}

impl PdfPreprocessor {
    pub fn new(crop_width_in: f32) -> Self {
        Self { crop_width_in }
    }

    /// Clean `input` into `output`.
    ///
    /// Fails before writing anything if the input cannot be parsed; the
    /// output file is written in one shot at the end, so a failed run
    /// never leaves a partial document behind.
    #[instrument(skip_all, fields(
        input = %input.as_ref().display(),
        output = %output.as_ref().display(),
        crop_width_in = self.crop_width_in,
    ))]
    pub fn clean(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<CleanReport, TagwerkError> {
        let input_ref = input.as_ref();
        info!("Preprocessing PDF: {}", input_ref.display());

        let mut doc = Document::load(input_ref).map_err(|err| {
            TagwerkError::Pdf(format!("failed to open {}: {}", input_ref.display(), err))
        })?;

        let pages = doc.get_pages();
        let total = pages.len();
        let crop_pts = self.crop_width_in * POINTS_PER_INCH;

        let mut blank_numbers: Vec<u32> = Vec::new();
        for (&page_num, &page_id) in &pages {
            match doc.extract_text(&[page_num]) {
                Ok(text) if text.trim().is_empty() => {
                    debug!(page_num, "Blank page, will remove");
                    blank_numbers.push(page_num);
                }
                Ok(_) => crop_right_edge(&mut doc, page_id, crop_pts)?,
                Err(err) => {
                    // Only a provably empty page may be removed.
                    warn!(page_num, %err, "Text extraction failed, keeping page");
                    crop_right_edge(&mut doc, page_id, crop_pts)?;
                }
            }
        }

        if !blank_numbers.is_empty() {
            doc.delete_pages(&blank_numbers);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(|err| {
            TagwerkError::Pdf(format!("failed to serialise cleaned PDF: {}", err))
        })?;
        std::fs::write(output.as_ref(), &bytes)?;

        let report = CleanReport {
            kept_pages: total - blank_numbers.len(),
            removed_pages: blank_numbers.len(),
        };
        info!(
            kept = report.kept_pages,
            removed = report.removed_pages,
            "Preprocessing complete"
        );
        Ok(report)
    }
}

/// Shrink the page's `/MediaBox` by `crop_pts` points from the right edge.
///
/// The effective box is resolved through `/Parent` inheritance, then the
/// cropped box is written directly on the page dictionary (overriding any
/// inherited value).
fn crop_right_edge(
    doc: &mut Document,
    page_id: ObjectId,
    crop_pts: f32,
) -> Result<(), TagwerkError> {
    let [llx, lly, urx, ury] = effective_media_box(doc, page_id)?;

    let new_urx = urx - crop_pts;
    if new_urx <= llx {
        warn!(
            ?page_id,
            urx, crop_pts, "Crop width exceeds page width, leaving page uncropped"
        );
        return Ok(());
    }

    let boxed = Object::Array(vec![
        Object::Real(llx),
        Object::Real(lly),
        Object::Real(new_urx),
        Object::Real(ury),
    ]);

    match doc.get_object_mut(page_id) {
        Ok(Object::Dictionary(dict)) => {
            dict.set("MediaBox", boxed);
            Ok(())
        }
        _ => Err(TagwerkError::Pdf(format!(
            "page object {:?} is not a dictionary",
            page_id
        ))),
    }
}

/// Resolve a page's effective `/MediaBox`, walking `/Parent` links for
/// inherited values. Returns `[llx, lly, urx, ury]`.
fn effective_media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4], TagwerkError> {
    let mut current = page_id;
    loop {
        let dict = match doc.get_object(current) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => {
                return Err(TagwerkError::Pdf(format!(
                    "object {:?} in page tree is not a dictionary",
                    current
                )));
            }
        };

        if let Ok(media_box) = dict.get(b"MediaBox") {
            // The box itself may be an indirect reference.
            let resolved = match media_box {
                Object::Reference(id) => doc.get_object(*id).map_err(|err| {
                    TagwerkError::Pdf(format!("cannot resolve /MediaBox reference: {}", err))
                })?,
                other => other,
            };
            return parse_rectangle(resolved);
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current = *parent_id,
            _ => {
                return Err(TagwerkError::Pdf(format!(
                    "page {:?} has no /MediaBox (direct or inherited)",
                    page_id
                )));
            }
        }
    }
}

/// Parse a PDF rectangle array of four numbers.
fn parse_rectangle(object: &Object) -> Result<[f32; 4], TagwerkError> {
    let array = object
        .as_array()
        .map_err(|_| TagwerkError::Pdf("/MediaBox is not an array".to_string()))?;
    if array.len() != 4 {
        return Err(TagwerkError::Pdf(format!(
            "/MediaBox has {} entries, expected 4",
            array.len()
        )));
    }

    let mut values = [0f32; 4];
    for (slot, entry) in values.iter_mut().zip(array.iter()) {
        *slot = entry
            .as_float()
            .map_err(|_| TagwerkError::Pdf("/MediaBox entry is not numeric".to_string()))?;
    }
    Ok(values)
}
