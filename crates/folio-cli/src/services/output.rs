// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output writing: every file lands via a `.tmp` sibling and a rename, so an
// interrupted run never leaves a half-written file under the final name.

use std::path::{Path, PathBuf};

use folio_core::error::Result;
use folio_structure::PageRecord;
use serde::Serialize;
use tracing::{debug, warn};

pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = tmp_sibling(path);
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    debug!(path = %path.display(), bytes = contents.len(), "File written");
    Ok(())
}

/// Pretty-printed UTF-8 JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes())
}

/// Load a previously written page record. Missing or unreadable records are
/// treated as absent.
pub fn read_page_record(path: &Path) -> Option<PageRecord> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Ignoring unreadable page record");
            None
        }
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
