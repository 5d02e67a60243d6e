// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR text detector backed by `ocrs`, a pure-Rust engine whose neural network
// models run on `rten`.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature:
//
// ```toml
// folio-document = { path = "crates/folio-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine needs two model files in one directory:
//
// - **Detection model** (`text-detection.rten`): locates text regions.
// - **Recognition model** (`text-recognition.rten`): decodes each line.
//
// Running `ocrs-cli` once downloads them to `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is also the default lookup location.

use std::path::{Path, PathBuf};

use folio_core::BoundingBox;
use folio_core::error::{FolioError, Result};
use folio_structure::RawDetection;
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams, TextItem};
use rten::Model;
use tracing::{debug, info, instrument};

use crate::scan::detector::TextDetector;

/// `ocrs` reports no per-line score; recognised lines are taken at face value.
const OCRS_LINE_CONFIDENCE: f64 = 1.0;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Model file locations for an [`OcrsDetector`].
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expects `dir` to contain `text-detection.rten` and `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Model directory from the pipeline config, or the default cache.
    pub fn from_model_dir(dir: Option<&Path>) -> Self {
        dir.map(Self::from_dir).unwrap_or_default()
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for (kind, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(FolioError::OcrError(format!(
                    "{kind} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Line-level text detector over the `ocrs` engine.
///
/// Loading models is the expensive step; build one detector per worker and
/// reuse it for every page that worker handles.
pub struct OcrsDetector {
    engine: OcrsEngine,
}

impl OcrsDetector {
    /// # Performance
    ///
    /// `ocrs` and `rten` must be compiled in release mode; debug builds are
    /// 10-100x slower.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: &OcrConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR models");
        let detection_model = load_model(&config.detection_model_path, "detection")?;
        let recognition_model = load_model(&config.recognition_model_path, "recognition")?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| FolioError::OcrError(format!("failed to initialise OCR engine: {}", err)))?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }
}

fn load_model(path: &Path, kind: &str) -> Result<Model> {
    Model::load_file(path).map_err(|err| {
        FolioError::OcrError(format!(
            "failed to load {kind} model from {}: {}",
            path.display(),
            err
        ))
    })
}

impl TextDetector for OcrsDetector {
    fn name(&self) -> &str {
        "ocrs"
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            FolioError::OcrError(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| FolioError::OcrError(format!("OCR preprocessing failed: {}", err)))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| FolioError::OcrError(format!("word detection failed: {}", err)))?;
        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        debug!(
            words = word_rects.len(),
            lines = line_rects.len(),
            "Text lines located"
        );

        let lines = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| FolioError::OcrError(format!("line recognition failed: {}", err)))?;

        let detections: Vec<RawDetection> = lines
            .iter()
            .flatten()
            .map(|line| {
                let rect = line.bounding_rect();
                let bbox = BoundingBox::from_rect(
                    f64::from(rect.left()),
                    f64::from(rect.top()),
                    f64::from(rect.right()),
                    f64::from(rect.bottom()),
                );
                RawDetection::new(bbox.0.to_vec(), line.to_string(), OCRS_LINE_CONFIDENCE)
            })
            .collect();

        debug!(candidates = detections.len(), "OCR recognition complete");
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_dir() {
        let config = OcrConfig::from_dir("/tmp/my-models");
        assert_eq!(
            config.detection_model_path,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            config.recognition_model_path,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );
    }

    #[test]
    fn default_config_ends_with_model_filenames() {
        let config = OcrConfig::from_model_dir(None);
        assert!(config.detection_model_path.ends_with(DETECTION_MODEL_FILENAME));
        assert!(config.recognition_model_path.ends_with(RECOGNITION_MODEL_FILENAME));
    }

    #[test]
    fn missing_models_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let err = OcrConfig::from_dir(dir.path()).validate().unwrap_err();
        assert!(matches!(err, FolioError::OcrError(ref msg) if msg.contains("not found")));
        assert!(OcrsDetector::new(&OcrConfig::from_dir(dir.path())).is_err());
    }
}
