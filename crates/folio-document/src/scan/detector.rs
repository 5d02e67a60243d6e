// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text detector capability: the seam between the page pipeline and an OCR
// engine.

use folio_core::error::Result;
use folio_structure::RawDetection;
use image::DynamicImage;

/// Something that can find text lines in a page image.
///
/// A detector handle is used sequentially; parallel workers each build their
/// own. Candidates are returned in whatever order the engine emits them and
/// are validated downstream, so implementations need not filter anything.
pub trait TextDetector: Send {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>>;
}

impl<T: TextDetector + ?Sized> TextDetector for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>> {
        (**self).detect(image)
    }
}
