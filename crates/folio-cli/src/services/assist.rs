// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assisted mode: turn an upstream chapter analysis into a module file.

use std::path::{Path, PathBuf};

use folio_core::ChapterNumber;
use folio_core::error::Result;
use folio_structure::{Analysis, assemble_analysis, module_to_json};
use tracing::{info, instrument};

use super::layout::module_path;
use super::output::write_atomic;

/// Default output folder for assisted-mode modules.
pub const DEFAULT_MODULES_DIR: &str = "Modules";

/// Read `analysis_path`, assemble, and write `<out_dir>/module_<NN>.json`.
#[instrument(skip_all, fields(chapter = chapter.get(), analysis = %analysis_path.display()))]
pub fn assemble_file(chapter: ChapterNumber, analysis_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    let json = std::fs::read_to_string(analysis_path)?;
    let analysis = Analysis::from_json(&json)?;
    let module = assemble_analysis(chapter, &analysis);

    let path = module_path(out_dir, chapter);
    write_atomic(&path, module_to_json(&module)?.as_bytes())?;
    info!(
        title = %module.title,
        category = module.category.as_str(),
        sections = module.sections.len(),
        blocks = module.block_count(),
        path = %path.display(),
        "Module written"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::FolioError;

    #[test]
    fn writes_module_from_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = dir.path().join("chapter_08_analysis.json");
        std::fs::write(
            &analysis,
            r#"{
                "chapterTitle": "Evacuation Guidelines",
                "sections": [{ "title": "", "content": [{ "type": "warning", "content": "Do not move a spine patient" }] }]
            }"#,
        )
        .unwrap();

        let chapter = ChapterNumber::new(8).unwrap();
        let path = assemble_file(chapter, &analysis, &dir.path().join("Modules")).unwrap();
        assert!(path.ends_with("Modules/module_08.json"));

        let module: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(module["category"], "evacuation");
        assert_eq!(module["orderIndex"], 8);
        assert_eq!(module["sections"][0]["title"], "Section 1");
        assert_eq!(module["sections"][0]["content"][0]["type"], "warning");
    }

    #[test]
    fn structurally_invalid_analysis_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let analysis = dir.path().join("bad.json");
        std::fs::write(&analysis, r#"{ "sections": 42 }"#).unwrap();

        let chapter = ChapterNumber::new(1).unwrap();
        let err = assemble_file(chapter, &analysis, dir.path()).unwrap_err();
        assert!(matches!(err, FolioError::InvalidAnalysis(_)));
        assert!(!dir.path().join("module_01.json").exists());
    }

    #[test]
    fn missing_analysis_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let chapter = ChapterNumber::new(1).unwrap();
        let err = assemble_file(chapter, &dir.path().join("nope.json"), dir.path()).unwrap_err();
        assert!(matches!(err, FolioError::Io(_)));
    }
}
