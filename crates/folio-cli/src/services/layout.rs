// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// On-disk layout of a digitization project: where a chapter's photos live and
// where its extraction outputs go.

use std::path::{Path, PathBuf};

use folio_core::ChapterNumber;
use folio_core::error::{FolioError, Result};
use tracing::debug;

/// Page photo extensions, compared case-insensitively.
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];

/// Default output folder name under the photo root.
pub const DEFAULT_OUTPUT_DIR: &str = "ExtractedText";

/// Photo root plus output root.
///
/// ```text
/// <root>/03_Chapter_Photos/IMG_0001.JPG
/// <out>/Chapter_03/IMG_0001.txt
/// <out>/Chapter_03/IMG_0001_extracted.json
/// <out>/Chapter_03/chapter_03_combined.{txt,json}
/// <out>/Chapter_03/module_03.json
/// ```
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    output_root: PathBuf,
}

impl ProjectLayout {
    /// `output_root` defaults to `<root>/ExtractedText`.
    pub fn new(root: impl Into<PathBuf>, output_root: Option<PathBuf>) -> Self {
        let root = root.into();
        let output_root = output_root.unwrap_or_else(|| root.join(DEFAULT_OUTPUT_DIR));
        Self { root, output_root }
    }

    pub fn photos_dir(&self, chapter: ChapterNumber) -> PathBuf {
        self.root.join(format!("{}_Chapter_Photos", chapter.padded()))
    }

    pub fn chapter_output_dir(&self, chapter: ChapterNumber) -> PathBuf {
        self.output_root.join(format!("Chapter_{}", chapter.padded()))
    }

    /// Page photos for a chapter, sorted by filename.
    pub fn discover_images(&self, chapter: ChapterNumber) -> Result<Vec<PathBuf>> {
        let dir = self.photos_dir(chapter);
        if !dir.is_dir() {
            return Err(FolioError::ChapterFolderMissing(dir));
        }

        let mut images: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_page_image(path))
            .collect();
        if images.is_empty() {
            return Err(FolioError::NoImages(dir));
        }
        images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!(chapter = chapter.get(), count = images.len(), dir = %dir.display(), "Page images found");
        Ok(images)
    }
}

fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Per-page output file paths inside a chapter output directory.
pub fn page_text_path(chapter_dir: &Path, image: &Path) -> PathBuf {
    chapter_dir.join(format!("{}.txt", stem(image)))
}

pub fn page_record_path(chapter_dir: &Path, image: &Path) -> PathBuf {
    chapter_dir.join(format!("{}_extracted.json", stem(image)))
}

pub fn combined_text_path(chapter_dir: &Path, chapter: ChapterNumber) -> PathBuf {
    chapter_dir.join(format!("chapter_{}_combined.txt", chapter.padded()))
}

pub fn combined_json_path(chapter_dir: &Path, chapter: ChapterNumber) -> PathBuf {
    chapter_dir.join(format!("chapter_{}_combined.json", chapter.padded()))
}

pub fn module_path(dir: &Path, chapter: ChapterNumber) -> PathBuf {
    dir.join(format!("module_{}.json", chapter.padded()))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
