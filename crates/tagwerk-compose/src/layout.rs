// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Layout assembler — turns one page's artifacts (symbol crop, serial
// text) into a fixed-geometry row of absolute placements.
//
// Assembly is pure: it builds an in-memory `LayoutRow` and touches no
// files and no shared state. All coordinates are inches from the page's
// top-left corner; the writer converts to PDF points in one place.

use image::DynamicImage;
use tagwerk_core::{LayoutConfig, SerialPlacement, SerialStyle};

/// Vertical gap between a cell's content and the serial line, inches.
const SERIAL_LEADING_IN: f32 = 0.05;

/// Average Helvetica glyph width is roughly 0.50 * font_size.
const HELVETICA_AVG_GLYPH_EM: f32 = 0.50;

/// Line box height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Absolute placement in inches from the page's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_in: f32,
    pub y_in: f32,
    pub width_in: f32,
    pub height_in: f32,
}

/// Content of a row's symbol cell.
pub enum SymbolCell {
    /// The cropped symbol bitmap at a fixed size.
    Crop {
        image: DynamicImage,
        placement: Placement,
    },
    /// Literal fallback label when no symbol decoded on the page.
    Fallback { text: String, placement: Placement },
}

/// The styled serial run.
#[derive(Debug, Clone)]
pub struct SerialRun {
    pub text: String,
    pub placement: Placement,
    pub style: SerialStyle,
}

/// One assembled row: reference slot, symbol cell, serial run.
///
/// Every source page produces exactly one `LayoutRow`, in page order.
pub struct LayoutRow {
    /// Where the shared reference image goes (the image itself is owned
    /// by the writer and registered once for the whole document).
    pub reference: Placement,
    pub symbol: SymbolCell,
    pub serial: SerialRun,
}

/// Builds `LayoutRow`s from a declarative `LayoutConfig`.
pub struct LayoutAssembler {
    config: LayoutConfig,
    /// Reference image pixel dimensions, for aspect-ratio height.
    reference_px: (u32, u32),
}

impl LayoutAssembler {
    pub fn new(config: LayoutConfig, reference_px: (u32, u32)) -> Self {
        Self {
            config,
            reference_px,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Assemble one row.
    ///
    /// `symbol_crop` is the first located symbol's crop, or `None` when
    /// the page had no decodable symbol (the cell then renders the
    /// configured fallback text).
    pub fn assemble(&self, symbol_crop: Option<DynamicImage>, serial: &str) -> LayoutRow {
        let margin = self.config.geometry.margin_in;

        let reference = self.reference_placement(margin);

        // Second column starts where the reference column ends.
        let cell_x = margin + self.config.reference_width_in;
        let symbol = match symbol_crop {
            Some(image) => SymbolCell::Crop {
                image,
                placement: Placement {
                    x_in: cell_x,
                    y_in: margin,
                    width_in: self.config.symbol_width_in,
                    height_in: self.config.symbol_height_in,
                },
            },
            None => {
                let style = &self.config.serial_style;
                SymbolCell::Fallback {
                    text: self.config.fallback_text.clone(),
                    placement: text_box(
                        cell_x,
                        margin,
                        &self.config.fallback_text,
                        style.font_size_pt,
                    ),
                }
            }
        };

        let serial_text = format!("{}{}", self.config.serial_style.label, serial);
        let serial_placement = match self.config.serial_placement {
            SerialPlacement::BelowSymbol => {
                // Own line directly below the symbol cell.
                let y = margin + self.config.symbol_height_in + SERIAL_LEADING_IN;
                text_box(
                    cell_x,
                    y,
                    &serial_text,
                    self.config.serial_style.font_size_pt,
                )
            }
            SerialPlacement::InlineAfterReference => {
                // Same line as the reference image, bottom-aligned.
                let x = reference.x_in + reference.width_in + SERIAL_LEADING_IN;
                let line_h =
                    self.config.serial_style.font_size_pt / POINTS_PER_INCH * LINE_HEIGHT_FACTOR;
                let y = reference.y_in + reference.height_in - line_h;
                text_box(x, y, &serial_text, self.config.serial_style.font_size_pt)
            }
        };

        LayoutRow {
            reference,
            symbol,
            serial: SerialRun {
                text: serial_text,
                placement: serial_placement,
                style: self.config.serial_style.clone(),
            },
        }
    }

    fn reference_placement(&self, margin: f32) -> Placement {
        let width = self.config.reference_width_in;
        let height = self.config.reference_height_in.unwrap_or_else(|| {
            let (px_w, px_h) = self.reference_px;
            if px_w == 0 {
                width
            } else {
                width * px_h as f32 / px_w as f32
            }
        });
        Placement {
            x_in: margin,
            y_in: margin,
            width_in: width,
            height_in: height,
        }
    }
}

/// Estimated bounding box for a single Helvetica text line.
fn text_box(x_in: f32, y_in: f32, text: &str, font_size_pt: f32) -> Placement {
    let width_in =
        text.chars().count() as f32 * HELVETICA_AVG_GLYPH_EM * font_size_pt / POINTS_PER_INCH;
    let height_in = font_size_pt / POINTS_PER_INCH * LINE_HEIGHT_FACTOR;
    Placement {
        x_in,
        y_in,
        width_in,
        height_in,
    }
}
