// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document: page-image side of Folio.
//
// Provides image preparation (downscale, contrast, sharpness, grayscale), the
// `TextDetector` capability with an `ocrs` implementation behind the `ocr`
// feature, the per-page extraction pipeline, and source fingerprints for
// resumable runs.

pub mod image;
pub mod integrity;
pub mod scan;

pub use image::processor::ImageProcessor;
pub use integrity::{hash_bytes, matches_hash};
pub use scan::detector::TextDetector;
pub use scan::enhance::PageEnhancer;
pub use scan::pipeline::{PagePipeline, unreadable_page};

#[cfg(feature = "ocr")]
pub use scan::ocr::{OcrConfig, OcrsDetector};
