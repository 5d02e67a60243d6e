// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page pipeline: decode, enhance, detect, then structure one page image
// into a `PageRecord`.

use std::path::Path;
use std::time::Instant;

use folio_core::ExtractionSettings;
use folio_core::error::Result;
use folio_structure::{PageRecord, StructuredPage, structure_page};
use tracing::{info, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::scan::detector::TextDetector;
use crate::scan::enhance::PageEnhancer;

/// Runs one detector over page images.
///
/// Processing a page never fails: decode or engine errors produce a zero-line
/// record carrying the error text, so a chapter run can carry on.
pub struct PagePipeline<'a, D: TextDetector + ?Sized> {
    detector: &'a D,
    enhancer: PageEnhancer,
    threshold: f64,
}

impl<'a, D: TextDetector + ?Sized> PagePipeline<'a, D> {
    pub fn new(detector: &'a D, enhancer: PageEnhancer, threshold: f64) -> Self {
        Self {
            detector,
            enhancer,
            threshold,
        }
    }

    /// Settings stamped onto every record this pipeline produces.
    pub fn settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            confidence_threshold: self.threshold,
            enhance_profile: self.enhancer.profile(),
            max_width: self.enhancer.max_width(),
        }
    }

    /// Process already-read image bytes whose hash the caller computed.
    #[instrument(skip_all, fields(image = %file_name(path), engine = self.detector.name()))]
    pub fn process_bytes(&self, path: &Path, bytes: &[u8], source_hash: String) -> PageRecord {
        let started = Instant::now();
        let image_path = path.display().to_string();
        let image_name = file_name(path);

        match self.structure(&image_name, bytes) {
            Ok(page) => {
                let elapsed = elapsed_ms(started);
                info!(
                    lines = page.line_count(),
                    skipped = page.skipped.total(),
                    mean_confidence = page.mean_confidence,
                    elapsed_ms = elapsed,
                    "Page extracted"
                );
                PageRecord::from_page(&image_path, &page, Some(source_hash), elapsed)
                    .with_settings(&self.settings())
            }
            Err(err) => {
                let elapsed = elapsed_ms(started);
                warn!(error = %err, elapsed_ms = elapsed, "Page extraction failed");
                PageRecord::failed(&image_path, &image_name, Some(source_hash), elapsed, err.to_string())
                    .with_settings(&self.settings())
            }
        }
    }

    fn structure(&self, image_name: &str, bytes: &[u8]) -> Result<StructuredPage> {
        let image = ImageProcessor::from_bytes(bytes)?.into_dynamic();
        let prepared = self.enhancer.enhance(image);
        let candidates = self.detector.detect(&prepared)?;
        Ok(structure_page(image_name, candidates, self.threshold))
    }
}

/// Zero-line record for a page image that could not be read at all.
pub fn unreadable_page(path: &Path, err: &std::io::Error) -> PageRecord {
    warn!(path = %path.display(), error = %err, "Page image unreadable");
    PageRecord::failed(
        &path.display().to_string(),
        &file_name(path),
        None,
        0,
        format!("failed to read {}: {}", path.display(), err),
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
