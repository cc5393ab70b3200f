// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Run configuration.
//
// Everything that varies between batches is data here: input/output
// paths, rendering DPI, serial numbering, and the full row layout.
// The two historically observed sheet layouts are the `stacked()` and
// `inline()` presets of `LayoutConfig` — one declarative structure,
// not two code paths.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output page geometry, applied once for the whole document.
///
/// All values are inches; the writer converts to PDF points (72 pt/in)
/// in one place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_in: f32,
    pub height_in: f32,
    /// Uniform margin applied to all four edges.
    pub margin_in: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // One tag row per page: 6.5" x 1.8" with 0.1" margins.
        Self {
            width_in: 6.5,
            height_in: 1.8,
            margin_in: 0.1,
        }
    }
}

/// Serial numbering for one run: `{prefix}{value:0pad}` per page,
/// advancing by `step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    pub prefix: String,
    pub start: u64,
    pub step: u64,
    /// Zero-padded width of the numeric part.
    pub pad_width: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            start: 2001,
            step: 1001,
            pad_width: 5,
        }
    }
}

/// Where the serial run sits within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerialPlacement {
    /// On its own line directly below the symbol crop.
    BelowSymbol,
    /// Appended inline after the reference image, on the same line.
    InlineAfterReference,
}

/// Visual style of the serial run — the removable "tag sticker" look:
/// small white text over a solid fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialStyle {
    pub font_size_pt: f32,
    /// Text colour, RGB.
    pub foreground: [u8; 3],
    /// Solid background fill behind the run, RGB.
    pub fill: [u8; 3],
    /// Literal text prepended to the formatted serial.
    pub label: String,
}

impl Default for SerialStyle {
    fn default() -> Self {
        Self {
            font_size_pt: 8.0,
            foreground: [255, 255, 255],
            fill: [255, 0, 0],
            label: "SR: ".to_string(),
        }
    }
}

/// Declarative row layout: column widths, symbol crop size, serial
/// placement and styling. Fixed absolute placements — columns never
/// resize to content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub geometry: PageGeometry,
    /// Width of the reference image column.
    pub reference_width_in: f32,
    /// Fixed reference image height; `None` preserves the aspect ratio.
    pub reference_height_in: Option<f32>,
    pub symbol_width_in: f32,
    pub symbol_height_in: f32,
    pub serial_placement: SerialPlacement,
    pub serial_style: SerialStyle,
    /// Literal text rendered in the symbol cell when no symbol decodes.
    pub fallback_text: String,
}

impl LayoutConfig {
    /// Serial on its own line below the symbol crop; reference image
    /// keeps its aspect ratio.
    pub fn stacked() -> Self {
        Self {
            geometry: PageGeometry::default(),
            reference_width_in: 2.94,
            reference_height_in: None,
            symbol_width_in: 1.2,
            symbol_height_in: 1.2,
            serial_placement: SerialPlacement::BelowSymbol,
            serial_style: SerialStyle::default(),
            fallback_text: "No QR code found".to_string(),
        }
    }

    /// Serial appended after the reference image on the same line;
    /// reference image at a fixed height, larger symbol crop.
    pub fn inline() -> Self {
        Self {
            geometry: PageGeometry::default(),
            reference_width_in: 2.94,
            reference_height_in: Some(1.46),
            symbol_width_in: 1.62,
            symbol_height_in: 1.62,
            serial_placement: SerialPlacement::InlineAfterReference,
            serial_style: SerialStyle {
                font_size_pt: 11.0,
                label: " Serial Number: ".to_string(),
                ..SerialStyle::default()
            },
            fallback_text: "No QR code found".to_string(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::stacked()
    }
}

/// Full configuration for one compose run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Source batch PDF (one tag row produced per page).
    pub pdf_path: PathBuf,
    /// Reference image repeated in every row.
    pub reference_image_path: PathBuf,
    /// Destination for the composed document.
    pub output_path: PathBuf,
    /// Rasterisation density for symbol location.
    pub dpi: u32,
    pub serial: SerialConfig,
    pub layout: LayoutConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            pdf_path: PathBuf::new(),
            reference_image_path: PathBuf::new(),
            output_path: PathBuf::new(),
            dpi: 300,
            serial: SerialConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_is_one_row_page() {
        let geom = PageGeometry::default();
        assert!((geom.width_in - 6.5).abs() < f32::EPSILON);
        assert!((geom.height_in - 1.8).abs() < f32::EPSILON);
        assert!((geom.margin_in - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn presets_differ_only_in_data() {
        let stacked = LayoutConfig::stacked();
        let inline = LayoutConfig::inline();

        assert_eq!(stacked.serial_placement, SerialPlacement::BelowSymbol);
        assert_eq!(
            inline.serial_placement,
            SerialPlacement::InlineAfterReference
        );
        assert_eq!(stacked.reference_height_in, None);
        assert_eq!(inline.reference_height_in, Some(1.46));
        assert!(inline.symbol_width_in > stacked.symbol_width_in);
        // Same page geometry and fallback for both.
        assert_eq!(stacked.geometry, inline.geometry);
        assert_eq!(stacked.fallback_text, inline.fallback_text);
    }

    #[test]
    fn run_config_round_trips_through_json() {
        let config = RunConfig {
            pdf_path: PathBuf::from("batch.pdf"),
            reference_image_path: PathBuf::from("ref.png"),
            output_path: PathBuf::from("out.pdf"),
            dpi: 300,
            serial: SerialConfig {
                prefix: "DESIMANDI".into(),
                ..SerialConfig::default()
            },
            layout: LayoutConfig::stacked(),
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
