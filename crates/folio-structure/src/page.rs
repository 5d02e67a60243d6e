// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page structuring: normalize → order → classify for one image.

use folio_core::PageLines;
use tracing::debug;

use crate::classify::classify_lines;
use crate::normalize::{RawDetection, SkipCounts, normalize};
use crate::order::order_detections;

/// Ordered, classified lines for one image plus what was discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPage {
    pub page: PageLines,
    pub skipped: SkipCounts,
    pub mean_confidence: f64,
}

impl StructuredPage {
    pub fn line_count(&self) -> usize {
        self.page.lines.len()
    }
}

pub fn structure_page(
    image_name: &str,
    candidates: impl IntoIterator<Item = RawDetection>,
    threshold: f64,
) -> StructuredPage {
    let report = normalize(candidates, threshold);
    let mean_confidence = report.mean_confidence();
    let lines = classify_lines(order_detections(report.detections));

    debug!(
        image = image_name,
        lines = lines.len(),
        headings = lines.iter().filter(|l| l.is_heading).count(),
        skipped = %report.skipped,
        "Page structured"
    );

    StructuredPage {
        page: PageLines {
            image_name: image_name.to_owned(),
            lines,
        },
        skipped: report.skipped,
        mean_confidence,
    }
}
