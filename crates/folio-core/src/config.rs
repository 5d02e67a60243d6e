// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::types::EnhanceProfile;

/// Detections at or below this confidence are discarded.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Page photos wider than this are downscaled before OCR.
pub const DEFAULT_MAX_WIDTH: u32 = 2000;

/// Settings for a chapter-processing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Retention threshold; a detection is kept only if `confidence > threshold`.
    pub confidence_threshold: f64,
    /// Maximum page width (pixels) handed to the OCR engine.
    pub max_width: u32,
    /// Pre-processing applied after resizing.
    pub enhance_profile: EnhanceProfile,
    /// Independent page workers, each owning its own OCR engine.
    pub workers: usize,
    /// Skip pages whose extraction output already matches the source image.
    pub resume: bool,
    /// Directory holding the OCR model files (engine default when unset).
    pub model_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_width: DEFAULT_MAX_WIDTH,
            enhance_profile: EnhanceProfile::Enhanced,
            workers: 1,
            resume: true,
            model_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// The subset of settings that shapes a page's extraction output.
    pub fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            confidence_threshold: self.confidence_threshold,
            enhance_profile: self.enhance_profile,
            max_width: self.max_width,
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(FolioError::Config(format!(
                "confidence threshold {} is outside 0.0..=1.0",
                self.confidence_threshold
            )));
        }
        if self.max_width == 0 {
            return Err(FolioError::Config("max width must be positive".into()));
        }
        if self.workers == 0 {
            return Err(FolioError::Config("at least one worker is required".into()));
        }
        Ok(())
    }
}

/// Settings a stored page extraction was produced with.
///
/// Rendered as a stable one-line stamp (`threshold=0.5;profile=enhanced;maxWidth=2000`)
/// that is stored with each page record and compared as text on resume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionSettings {
    pub confidence_threshold: f64,
    pub enhance_profile: EnhanceProfile,
    pub max_width: u32,
}

impl fmt::Display for ExtractionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "threshold={};profile={};maxWidth={}",
            self.confidence_threshold,
            self.enhance_profile.as_str(),
            self.max_width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.max_width, 2000);
        assert_eq!(config.workers, 1);
        assert!(config.resume);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, r#"{ "workers": 3, "enhanceProfile": "grayscale" }"#).unwrap();

        let config = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.enhance_profile, EnhanceProfile::Grayscale);
        assert_eq!(config.max_width, DEFAULT_MAX_WIDTH);
        assert_eq!(config.confidence_threshold, DEFAULT_CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn invalid_values_rejected() {
        let config = PipelineConfig {
            confidence_threshold: 1.5,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(FolioError::Config(_))));

        let config = PipelineConfig {
            workers: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn extraction_stamp_tracks_output_shaping_settings() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.extraction_settings().to_string(),
            "threshold=0.5;profile=enhanced;maxWidth=2000"
        );

        let stricter = PipelineConfig {
            confidence_threshold: 0.92,
            workers: 4,
            ..PipelineConfig::default()
        };
        assert_eq!(
            stricter.extraction_settings().to_string(),
            "threshold=0.92;profile=enhanced;maxWidth=2000"
        );

        // Worker count and resume do not change what a page extracts to.
        let parallel = PipelineConfig {
            workers: 8,
            resume: false,
            ..PipelineConfig::default()
        };
        assert_eq!(parallel.extraction_settings(), config.extraction_settings());
    }
}
