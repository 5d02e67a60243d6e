// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for page preparation in the folio-document crate.
// Runs each enhance profile over a synthetic phone-sized page photo.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use folio_core::EnhanceProfile;
use folio_document::PageEnhancer;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Enhance a 3000x2000 synthetic page down to the default 2000px width.
///
/// The page is light paper with dark horizontal bands standing in for text
/// lines, so contrast and sharpening have real edges to work on.
fn bench_enhance_profiles(c: &mut Criterion) {
    let page = RgbImage::from_fn(3000, 2000, |_, y| {
        if (y / 12) % 4 == 0 {
            Rgb([40u8, 40, 45])
        } else {
            Rgb([225u8, 220, 210])
        }
    });
    let page = DynamicImage::ImageRgb8(page);

    for profile in [
        EnhanceProfile::Basic,
        EnhanceProfile::Enhanced,
        EnhanceProfile::Grayscale,
    ] {
        let enhancer = PageEnhancer::new(profile, 2000);
        c.bench_function(&format!("enhance {profile:?} (3000x2000)"), |b| {
            b.iter(|| black_box(enhancer.enhance(black_box(page.clone()))));
        });
    }
}

criterion_group!(benches, bench_enhance_profiles);
criterion_main!(benches);
