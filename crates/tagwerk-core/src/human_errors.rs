// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Human-readable error messages for batch operators.
//
// Every technical error is mapped to plain English with a clear
// suggestion, so a failed overnight batch tells the operator what to
// fix rather than dumping a library error.

use crate::error::TagwerkError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The run cannot continue — fix the input or destination and rerun.
    Fatal,
    /// Affects a single page only; the run keeps going.
    PageLocal,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `TagwerkError` into a `HumanError`.
pub fn humanize_error(err: &TagwerkError) -> HumanError {
    match err {
        TagwerkError::ReferenceImage(detail) => HumanError {
            message: format!("The reference image can't be used ({detail})."),
            suggestion: "Check that the file is a readable image (PNG, JPEG, BMP, or GIF) \
                         and not corrupted. Nothing was written."
                .into(),
            severity: Severity::Fatal,
        },

        TagwerkError::Pdf(detail) => HumanError {
            message: format!("The PDF could not be processed ({detail})."),
            suggestion: "Make sure the file is a valid, non-encrypted PDF. \
                         Try re-exporting it from the source application."
                .into(),
            severity: Severity::Fatal,
        },

        TagwerkError::Raster(detail) => HumanError {
            message: format!("Pages could not be rendered to images ({detail})."),
            suggestion: "A pdfium library must be installed on this machine \
                         (or placed next to the tagwerk executable)."
                .into(),
            severity: Severity::Fatal,
        },

        TagwerkError::Image(detail) => HumanError {
            message: format!("An image operation failed ({detail})."),
            suggestion: "This usually means a corrupted page render or crop. \
                         Try a lower --dpi value."
                .into(),
            severity: Severity::PageLocal,
        },

        TagwerkError::Output(detail) => HumanError {
            message: format!("The output document could not be written ({detail})."),
            suggestion: "Check that the destination folder exists, is writable, \
                         and has free disk space. No partial file was left behind."
                .into(),
            severity: Severity::Fatal,
        },

        TagwerkError::Io(detail) => HumanError {
            message: format!("A file could not be read or written ({detail})."),
            suggestion: "Check the path spelling and file permissions.".into(),
            severity: Severity::Fatal,
        },

        TagwerkError::Serialization(detail) => HumanError {
            message: format!("The run configuration file is invalid ({detail})."),
            suggestion: "Fix the JSON syntax or regenerate the config file.".into(),
            severity: Severity::Fatal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_stay_fatal() {
        let err = TagwerkError::Output("disk full".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Fatal);
        assert!(human.message.contains("disk full"));
        assert!(!human.suggestion.is_empty());
    }

    #[test]
    fn image_errors_are_page_local() {
        let err = TagwerkError::Image("bad crop".into());
        assert_eq!(humanize_error(&err).severity, Severity::PageLocal);
    }
}
