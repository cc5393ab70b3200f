// SPDX-License-Identifier: PMPL-1.0-or-later
//
// PDF module — preprocessing (blank-page removal, edge cropping) and
// page rasterisation.

pub mod preprocess;
pub mod raster;

pub use preprocess::{CleanReport, PdfPreprocessor};
pub use raster::{PageBitmap, PageRasterizer};
