// SPDX-License-Identifier: PMPL-1.0-or-later
//
// tagwerk-compose — Serial issuance, row layout, and output document
// writing for the Tagwerk composer, plus the sequential pipeline that
// ties them to the document crate.

pub mod layout;
pub mod pipeline;
pub mod serial;
pub mod writer;

pub use layout::{LayoutAssembler, LayoutRow, Placement, SerialRun, SymbolCell};
pub use pipeline::{ComposeReport, compose_run};
pub use serial::SerialIssuer;
pub use writer::DocumentWriter;
