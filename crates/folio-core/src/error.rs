// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Page errors (recovered per image) --
    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Chapter errors (fatal for one chapter run) --
    #[error("chapter folder not found: {}", .0.display())]
    ChapterFolderMissing(PathBuf),

    #[error("no page images found in {}", .0.display())]
    NoImages(PathBuf),

    #[error("invalid chapter number: {0}")]
    InvalidChapter(String),

    // -- Input / configuration --
    #[error("invalid analysis document: {0}")]
    InvalidAnalysis(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("page worker failed: {0}")]
    Worker(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Build features --
    #[error("feature `{0}` is not enabled in this build")]
    FeatureUnavailable(&'static str),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
