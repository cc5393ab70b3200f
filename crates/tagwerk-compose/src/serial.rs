// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Serial issuer — a run-scoped counter producing one formatted serial
// per page.

use tagwerk_core::SerialConfig;

/// Issues monotonically increasing formatted serials.
///
/// Owned by the pipeline and passed by `&mut`; never global state.
/// `next()` must be called exactly once per page, in page order — the
/// issuer is single-threaded by construction.
#[derive(Debug, Clone)]
pub struct SerialIssuer {
    prefix: String,
    value: u64,
    step: u64,
    pad_width: usize,
}

impl SerialIssuer {
    pub fn new(config: &SerialConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            value: config.start,
            step: config.step,
            pad_width: config.pad_width,
        }
    }

    /// Format the current serial and advance the counter.
    pub fn next(&mut self) -> String {
        let formatted = format!(
            "{}{:0width$}",
            self.prefix,
            self.value,
            width = self.pad_width
        );
        self.value += self.step;
        formatted
    }

    /// Value the next call to [`SerialIssuer::next`] will format.
    pub fn peek_value(&self) -> u64 {
        self.value
    }
}
