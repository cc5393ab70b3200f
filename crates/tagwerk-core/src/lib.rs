// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Tagwerk — Core types, errors, and run configuration shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::{
    LayoutConfig, PageGeometry, RunConfig, SerialConfig, SerialPlacement, SerialStyle,
};
pub use error::{Result, TagwerkError};
pub use types::*;
