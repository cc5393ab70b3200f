// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Symbol locator — finds machine-readable symbols (QR codes) on a page
// bitmap and crops them out.

use image::DynamicImage;
use tagwerk_core::types::{SymbolMatch, SymbolRect};
use tracing::{debug, instrument};

/// Locates and crops QR symbols on page bitmaps.
///
/// Matches are returned sorted leftmost-then-topmost by bounding
/// rectangle, so "take the first" is deterministic regardless of the
/// decoder's internal enumeration order.
pub struct SymbolLocator;

impl SymbolLocator {
    /// Scan a bitmap for decodable symbols.
    ///
    /// Grids that are detected but fail to decode are skipped. An empty
    /// result is not an error — the caller renders the fallback label
    /// for that page.
    #[instrument(skip(bitmap), fields(width = bitmap.width(), height = bitmap.height()))]
    pub fn locate(bitmap: &DynamicImage) -> Vec<SymbolMatch> {
        let luma = bitmap.to_luma8();
        let (bitmap_width, bitmap_height) = luma.dimensions();

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            bitmap_width as usize,
            bitmap_height as usize,
            |x, y| luma.get_pixel(x as u32, y as u32).0[0],
        );
        let grids = prepared.detect_grids();
        debug!(detected = grids.len(), "Symbol grids detected");

        let mut matches: Vec<SymbolMatch> = Vec::new();
        for grid in &grids {
            let Some(rect) = corners_to_rect(&grid.bounds, bitmap_width, bitmap_height) else {
                continue;
            };
            match grid.decode() {
                Ok((_meta, payload)) => matches.push(SymbolMatch { payload, rect }),
                Err(err) => {
                    debug!(%err, ?rect, "Grid detected but failed to decode, skipping");
                }
            }
        }

        // Deterministic pick-first order: leftmost, then topmost.
        matches.sort_by_key(|m| (m.rect.left, m.rect.top));
        matches
    }

    /// Crop a located symbol out of its page bitmap.
    ///
    /// The rectangle is intersected with the bitmap bounds first;
    /// returns `None` when nothing remains.
    pub fn crop(bitmap: &DynamicImage, rect: SymbolRect) -> Option<DynamicImage> {
        let clamped = rect.clamp_to(bitmap.width(), bitmap.height())?;
        Some(bitmap.crop_imm(clamped.left, clamped.top, clamped.width, clamped.height))
    }
}

/// Axis-aligned hull of the grid's four corner points, clamped to the
/// bitmap. Corner coordinates can fall slightly outside the bitmap for
/// symbols touching an edge.
fn corners_to_rect(
    corners: &[rqrr::Point; 4],
    bitmap_width: u32,
    bitmap_height: u32,
) -> Option<SymbolRect> {
    let min_x = corners.iter().map(|p| p.x).min()?.max(0) as u32;
    let min_y = corners.iter().map(|p| p.y).min()?.max(0) as u32;
    let max_x = corners.iter().map(|p| p.x).max()?.max(0) as u32;
    let max_y = corners.iter().map(|p| p.y).max()?.max(0) as u32;

    if max_x <= min_x || max_y <= min_y {
        return None;
    }

    SymbolRect::new(min_x, min_y, max_x - min_x, max_y - min_y)
        .clamp_to(bitmap_width, bitmap_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use qrcode::QrCode;

    /// Render a QR code for `payload` and paste it onto a white canvas
    /// at (x, y).
    fn page_with_qr(canvas_w: u32, canvas_h: u32, payload: &str, x: u32, y: u32) -> GrayImage {
        let mut canvas = GrayImage::from_pixel(canvas_w, canvas_h, Luma([255u8]));
        paste_qr(&mut canvas, payload, x, y);
        canvas
    }

    fn paste_qr(canvas: &mut GrayImage, payload: &str, x: u32, y: u32) {
        let code = QrCode::new(payload.as_bytes()).unwrap();
        let qr: GrayImage = code
            .render::<Luma<u8>>()
            .min_dimensions(160, 160)
            .build();
        image::imageops::replace(canvas, &qr, x as i64, y as i64);
    }

    #[test]
    fn finds_single_symbol_with_payload_and_bounds() {
        let page = DynamicImage::ImageLuma8(page_with_qr(800, 600, "TICKET-001", 300, 150));
        let matches = SymbolLocator::locate(&page);

        assert_eq!(matches.len(), 1);
        let found = &matches[0];
        assert_eq!(found.payload, "TICKET-001");
        // The rect must sit within the bitmap and around the paste offset.
        assert!(found.rect.left + found.rect.width <= 800);
        assert!(found.rect.top + found.rect.height <= 600);
        assert!(found.rect.left >= 280 && found.rect.left <= 400);
        assert!(found.rect.top >= 130 && found.rect.top <= 250);
    }

    #[test]
    fn blank_bitmap_yields_no_matches() {
        let page =
            DynamicImage::ImageLuma8(GrayImage::from_pixel(400, 300, Luma([255u8])));
        assert!(SymbolLocator::locate(&page).is_empty());
    }

    #[test]
    fn leftmost_symbol_wins_the_tie_break() {
        let mut canvas = GrayImage::from_pixel(1000, 400, Luma([255u8]));
        paste_qr(&mut canvas, "RIGHT", 600, 100);
        paste_qr(&mut canvas, "LEFT", 50, 100);
        let page = DynamicImage::ImageLuma8(canvas);

        let matches = SymbolLocator::locate(&page);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].payload, "LEFT");
        assert_eq!(matches[1].payload, "RIGHT");
    }

    #[test]
    fn crop_returns_symbol_sized_image() {
        let page = DynamicImage::ImageLuma8(page_with_qr(800, 600, "CROP-ME", 200, 200));
        let matches = SymbolLocator::locate(&page);
        let rect = matches[0].rect;

        let crop = SymbolLocator::crop(&page, rect).unwrap();
        assert_eq!(crop.width(), rect.width);
        assert_eq!(crop.height(), rect.height);
    }

    #[test]
    fn crop_outside_bounds_is_none() {
        let page =
            DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 100, Luma([255u8])));
        let rect = SymbolRect::new(200, 200, 50, 50);
        assert!(SymbolLocator::crop(&page, rect).is_none());
    }
}
