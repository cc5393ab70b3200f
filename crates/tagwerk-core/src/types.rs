// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Core domain types shared across the Tagwerk pipeline.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding rectangle of a located symbol, in the pixel
/// coordinate space of the page bitmap it was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRect {
    /// Left edge, pixels from the bitmap's left border.
    pub left: u32,
    /// Top edge, pixels from the bitmap's top border.
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl SymbolRect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Intersect this rectangle with a bitmap of `bitmap_width` x
    /// `bitmap_height` pixels. Returns `None` when nothing remains.
    pub fn clamp_to(&self, bitmap_width: u32, bitmap_height: u32) -> Option<SymbolRect> {
        if self.left >= bitmap_width || self.top >= bitmap_height {
            return None;
        }
        let width = self.width.min(bitmap_width - self.left);
        let height = self.height.min(bitmap_height - self.top);
        if width == 0 || height == 0 {
            return None;
        }
        Some(SymbolRect {
            left: self.left,
            top: self.top,
            width,
            height,
        })
    }
}

/// One decoded machine-readable symbol on a page bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    /// Decoded payload text.
    pub payload: String,
    /// Bounding rectangle in page-bitmap pixel space.
    pub rect: SymbolRect,
}
