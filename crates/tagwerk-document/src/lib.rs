// SPDX-License-Identifier: PMPL-1.0-or-later
//
// tagwerk-document — Document processing for the Tagwerk composer.
//
// Provides PDF preprocessing (blank-page removal and right-edge
// cropping), on-demand page rasterisation via pdfium, reference-image
// format normalisation, and QR symbol location/cropping.

pub mod image;
pub mod pdf;

// Re-export the primary structs so callers can use `tagwerk_document::PageRasterizer` etc.
pub use image::normalize::ImageNormalizer;
pub use image::symbol::SymbolLocator;
pub use pdf::preprocess::{CleanReport, PdfPreprocessor};
pub use pdf::raster::{PageBitmap, PageRasterizer};
