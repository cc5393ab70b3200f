// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Image module — reference-image normalisation and symbol location.

pub mod normalize;
pub mod symbol;

pub use normalize::ImageNormalizer;
pub use symbol::SymbolLocator;
