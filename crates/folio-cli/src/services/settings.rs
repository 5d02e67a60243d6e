// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run settings: the JSON config file (if any) with command-line overrides
// layered on top.

use std::path::{Path, PathBuf};

use folio_core::error::Result;
use folio_core::{EnhanceProfile, PipelineConfig};
use tracing::{debug, info};

/// Flags that override config-file values when given.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub workers: Option<usize>,
    pub profile: Option<EnhanceProfile>,
    pub max_width: Option<u32>,
    pub model_dir: Option<PathBuf>,
    pub no_resume: bool,
}

pub fn resolve_config(config_path: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    let mut config = match config_path {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            PipelineConfig::from_json_file(path)?
        }
        None => PipelineConfig::default(),
    };

    if let Some(workers) = overrides.workers {
        config.workers = workers;
    }
    if let Some(profile) = overrides.profile {
        config.enhance_profile = profile;
    }
    if let Some(max_width) = overrides.max_width {
        config.max_width = max_width;
    }
    if let Some(dir) = &overrides.model_dir {
        config.model_dir = Some(dir.clone());
    }
    if overrides.no_resume {
        config.resume = false;
    }

    config.validate()?;
    debug!(?config, "Settings resolved");
    Ok(config)
}
