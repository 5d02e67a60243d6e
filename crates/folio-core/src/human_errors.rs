// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operator-facing error messages.
//
// Every technical error is mapped to a short explanation and a concrete next
// step, printed in the batch summary so the operator can decide whether to
// re-run a chapter, fix its inputs, or move on.

use crate::error::FolioError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth re-running as-is (engine hiccup, interrupted write).
    Transient,
    /// The operator must fix something first (missing folder, models, config).
    ActionRequired,
    /// Re-running will not help (corrupt input, unsupported build).
    Permanent,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transient => "retry",
            Self::ActionRequired => "action required",
            Self::Permanent => "permanent",
        }
    }
}

/// A readable error with a plain summary and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary.
    pub message: String,
    /// What the operator should try next.
    pub suggestion: String,
    /// Whether re-running the same command may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `FolioError` into a `HumanError` for the run summary.
pub fn humanize_error(err: &FolioError) -> HumanError {
    match err {
        // -- Page errors --
        FolioError::OcrError(detail) => humanize_ocr_error(detail),

        FolioError::ImageError(_) => HumanError {
            message: "A page photo could not be read.".into(),
            suggestion: "Re-export the photo as JPEG or PNG and run the chapter again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Chapter errors --
        FolioError::ChapterFolderMissing(path) => HumanError {
            message: "The chapter's photo folder does not exist.".into(),
            suggestion: format!(
                "Create {} (named like `01_Chapter_Photos`) or point --root at the right directory.",
                path.display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::NoImages(path) => HumanError {
            message: "The chapter folder has no page photos.".into(),
            suggestion: format!(
                "Add .jpg, .jpeg, .png, or .tiff files to {} and run the chapter again.",
                path.display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::InvalidChapter(detail) => HumanError {
            message: "That chapter number isn't valid.".into(),
            suggestion: format!("Use a chapter number between 1 and 99. (Got: {detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Input / configuration --
        FolioError::InvalidAnalysis(detail) => HumanError {
            message: "The analysis document has the wrong shape.".into(),
            suggestion: format!(
                "Check that `sections` and each section's `content` are JSON arrays. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::Config(detail) => HumanError {
            message: "The configuration is invalid.".into(),
            suggestion: format!("Fix the config file or command-line flags. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        FolioError::Worker(_) => HumanError {
            message: "A page worker stopped unexpectedly.".into(),
            suggestion: "Run the chapter again; finished pages are kept and skipped.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Storage --
        FolioError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file couldn't be found.".into(),
                suggestion: "Check the paths passed on the command line.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Folio doesn't have permission to read or write a file.".into(),
                suggestion: "Check permissions on the photo and output directories.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, check free disk space.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        FolioError::Serialization(_) => HumanError {
            message: "A JSON document could not be parsed or written.".into(),
            suggestion: "Check the input file is valid JSON; delete any half-written output and re-run.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Build features --
        FolioError::FeatureUnavailable(feature) => HumanError {
            message: "This build can't do that.".into(),
            suggestion: format!("Rebuild with `--features {feature}`."),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Parse OCR-engine error details into readable messages.
fn humanize_ocr_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("model not found") || lower.contains("failed to load") {
        HumanError {
            message: "The OCR models are missing or damaged.".into(),
            suggestion: "Download the detection and recognition models and pass their directory with --models.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("image source") || lower.contains("preprocessing") {
        HumanError {
            message: "The OCR engine couldn't use this page photo.".into(),
            suggestion: "Try a different --profile or a smaller --max-width.".into(),
            retriable: false,
            severity: Severity::Permanent,
        }
    } else {
        HumanError {
            message: "Text recognition failed on a page.".into(),
            suggestion: format!("Run the chapter again; if it keeps failing, re-photograph the page. (Detail: {detail})"),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}
