// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: page enhancement, text detection, and per-page
// structuring of OCR output.

pub mod detector;
pub mod enhance;
pub mod pipeline;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use detector::TextDetector;
pub use enhance::PageEnhancer;
pub use pipeline::{PagePipeline, unreadable_page};

#[cfg(feature = "ocr")]
pub use ocr::OcrsDetector;
