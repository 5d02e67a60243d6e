// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch runs: several chapters in sequence. A failing chapter is logged and
// recorded; the batch carries on and reports everything at the end.

use std::fmt::Write as _;

use folio_core::ChapterNumber;
use folio_core::error::{FolioError, Result};
use folio_core::human_errors::humanize_error;
use tracing::{error, info};

use super::chapter::{ChapterReport, DetectorFactory, RunOptions, run_chapter};
use super::layout::ProjectLayout;

/// Parse a chapter selection such as `1-9`, `3`, or `1-3,7,10-12`.
///
/// Duplicates are dropped; the result keeps ascending order.
pub fn parse_chapters(selection: &str) -> Result<Vec<ChapterNumber>> {
    let mut chapters = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: ChapterNumber = start.parse()?;
                let end: ChapterNumber = end.parse()?;
                if start > end {
                    return Err(FolioError::InvalidChapter(format!(
                        "range `{part}` runs backwards"
                    )));
                }
                for n in start.get()..=end.get() {
                    chapters.push(ChapterNumber::new(n)?);
                }
            }
            None => chapters.push(part.parse()?),
        }
    }
    if chapters.is_empty() {
        return Err(FolioError::InvalidChapter(format!("empty selection `{selection}`")));
    }
    chapters.sort();
    chapters.dedup();
    Ok(chapters)
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub completed: Vec<ChapterReport>,
    pub failed: Vec<(ChapterNumber, FolioError)>,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Operator-facing summary, one line per chapter plus a hint per failure.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let total = self.completed.len() + self.failed.len();
        let _ = writeln!(out, "Processed {} of {} chapters", self.completed.len(), total);

        for report in &self.completed {
            let _ = writeln!(
                out,
                "  ok    chapter {:>2}: {}/{} pages, {} lines ({} reused)",
                report.chapter.get(),
                report.successful,
                report.total_images,
                report.total_lines,
                report.reused
            );
        }
        for (chapter, err) in &self.failed {
            let human = humanize_error(err);
            let _ = writeln!(
                out,
                "  FAIL  chapter {:>2}: {} [{}]\n        {}",
                chapter.get(),
                human.message,
                human.severity.label(),
                human.suggestion
            );
        }
        out
    }
}

/// Run each chapter in turn, collecting successes and failures.
pub async fn run_batch(
    chapters: &[ChapterNumber],
    layout: &ProjectLayout,
    options: &RunOptions,
    factory: DetectorFactory,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for &chapter in chapters {
        match run_chapter(chapter, layout, options, factory.clone()).await {
            Ok(report) => summary.completed.push(report),
            Err(err) => {
                error!(chapter = chapter.get(), error = %err, "Chapter failed");
                summary.failed.push((chapter, err));
            }
        }
    }
    info!(
        completed = summary.completed.len(),
        failed = summary.failed.len(),
        "Batch complete"
    );
    summary
}
