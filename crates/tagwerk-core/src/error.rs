// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Unified error types for Tagwerk.

use thiserror::Error;

/// Top-level error type for all Tagwerk operations.
///
/// The variants map onto the run-level failure classes: a bad reference
/// image, an unparsable source PDF, a rasterisation failure, and an
/// unwritable output are all fatal for the whole run. A page with no
/// decodable symbol is deliberately *not* an error — that page's row
/// degrades to the fallback label and the run continues.
#[derive(Debug, Error)]
pub enum TagwerkError {
    // -- Reference image --
    #[error("reference image unusable: {0}")]
    ReferenceImage(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("page rasterisation failed: {0}")]
    Raster(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Output --
    #[error("output document failed: {0}")]
    Output(String),

    // -- Passthrough --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TagwerkError>;
