// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page enhancement: profile-driven preparation of a page photograph before
// text detection.

use folio_core::EnhanceProfile;
use image::DynamicImage;
use tracing::{debug, instrument};

use crate::image::processor::ImageProcessor;

const ENHANCED_CONTRAST: f32 = 1.5;
const ENHANCED_SHARPNESS: f32 = 1.2;
const GRAYSCALE_CONTRAST: f32 = 1.8;

/// Prepares page photographs for OCR according to an [`EnhanceProfile`].
///
/// Every profile first downscales to `max_width`; large phone photos slow the
/// detector down without improving recognition.
#[derive(Debug, Clone, Copy)]
pub struct PageEnhancer {
    profile: EnhanceProfile,
    max_width: u32,
}

impl PageEnhancer {
    pub fn new(profile: EnhanceProfile, max_width: u32) -> Self {
        Self { profile, max_width }
    }

    pub fn profile(&self) -> EnhanceProfile {
        self.profile
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    #[instrument(skip_all, fields(profile = ?self.profile, max_width = self.max_width))]
    pub fn enhance(&self, image: DynamicImage) -> DynamicImage {
        let processor = ImageProcessor::from_dynamic(image).fit_width(self.max_width);
        let processor = match self.profile {
            EnhanceProfile::Basic => processor,
            EnhanceProfile::Enhanced => processor
                .adjust_contrast(ENHANCED_CONTRAST)
                .sharpen(ENHANCED_SHARPNESS),
            EnhanceProfile::Grayscale => processor.grayscale().adjust_contrast(GRAYSCALE_CONTRAST),
        };
        debug!(
            width = processor.width(),
            height = processor.height(),
            "Page enhanced"
        );
        processor.into_dynamic()
    }
}
