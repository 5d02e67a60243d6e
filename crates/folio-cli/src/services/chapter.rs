// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Chapter runner: extracts every page photo of one chapter, writes per-page
// and combined outputs, and assembles the chapter's module.
//
// Pages are spread over `workers` blocking tasks. Each worker owns its own
// detector (built lazily from the factory, so a fully resumed chapter never
// loads models) and pulls jobs from a shared queue. Results are re-sorted by
// page index before anything order-sensitive happens. If one worker fails, the
// others stop at their next job and are awaited before the error is returned.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use folio_core::error::{FolioError, Result};
use folio_core::{ChapterNumber, ExtractionSettings, PipelineConfig};
use folio_document::{
    PageEnhancer, PagePipeline, TextDetector, hash_bytes, matches_hash, unreadable_page,
};
use folio_structure::{ChapterRecord, PageRecord, assemble_pages, module_to_json};
use folio_structure::serialize::render_combined_text;
use tracing::{debug, info, instrument, warn};

use super::layout::{self, ProjectLayout};
use super::output::{read_page_record, write_atomic, write_json};

/// Builds one detector per worker.
pub type DetectorFactory = Arc<dyn Fn() -> Result<Box<dyn TextDetector>> + Send + Sync>;

/// What a chapter run needs besides the project layout.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PipelineConfig,
    /// Module title; `"Module {n}"` when absent or blank.
    pub title: Option<String>,
    /// Topic text fed to category resolution.
    pub topic: String,
}

/// Outcome of one chapter run.
#[derive(Debug, Clone)]
pub struct ChapterReport {
    pub chapter: ChapterNumber,
    pub total_images: usize,
    pub successful: usize,
    pub reused: usize,
    pub total_lines: usize,
    pub module_path: PathBuf,
    pub elapsed: Duration,
}

struct PageJob {
    index: usize,
    path: PathBuf,
}

struct PageResult {
    index: usize,
    record: PageRecord,
    reused: bool,
}

/// Extract one chapter end to end.
#[instrument(skip_all, fields(chapter = chapter.get()))]
pub async fn run_chapter(
    chapter: ChapterNumber,
    layout: &ProjectLayout,
    options: &RunOptions,
    factory: DetectorFactory,
) -> Result<ChapterReport> {
    let started = Instant::now();
    let images = layout.discover_images(chapter)?;
    let out_dir = layout.chapter_output_dir(chapter);
    std::fs::create_dir_all(&out_dir)?;

    let config = &options.config;
    let workers = config.workers.clamp(1, images.len());
    info!(
        images = images.len(),
        workers,
        profile = ?config.enhance_profile,
        resume = config.resume,
        output = %out_dir.display(),
        "Chapter extraction starting"
    );

    let queue: Arc<Mutex<VecDeque<PageJob>>> = Arc::new(Mutex::new(
        images
            .into_iter()
            .enumerate()
            .map(|(index, path)| PageJob { index, path })
            .collect(),
    ));
    let context = Arc::new(WorkerContext {
        out_dir: out_dir.clone(),
        enhancer: PageEnhancer::new(config.enhance_profile, config.max_width),
        settings: config.extraction_settings(),
        resume: config.resume,
        factory,
        stop: AtomicBool::new(false),
    });

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let queue = Arc::clone(&queue);
            let context = Arc::clone(&context);
            tokio::task::spawn_blocking(move || context.drain(worker, &queue))
        })
        .collect();

    let mut results = Vec::new();
    let mut first_error = None;
    for handle in handles {
        let outcome = handle
            .await
            .map_err(|err| FolioError::Worker(format!("worker task panicked: {}", err)))
            .and_then(|batch| batch);
        match outcome {
            Ok(batch) => results.extend(batch),
            Err(err) => {
                context.stop.store(true, Ordering::SeqCst);
                first_error.get_or_insert(err);
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }
    results.sort_by_key(|result| result.index);

    let title = options.title.clone();
    let topic = options.topic.clone();
    let report = tokio::task::spawn_blocking(move || {
        finish_chapter(chapter, &out_dir, results, title.as_deref(), &topic, started)
    })
    .await
    .map_err(|err| FolioError::Worker(format!("finishing task panicked: {}", err)))??;

    info!(
        images = report.total_images,
        successful = report.successful,
        reused = report.reused,
        lines = report.total_lines,
        elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
        module = %report.module_path.display(),
        "Chapter extraction complete"
    );
    Ok(report)
}

struct WorkerContext {
    out_dir: PathBuf,
    enhancer: PageEnhancer,
    settings: ExtractionSettings,
    resume: bool,
    factory: DetectorFactory,
    /// Set once any worker fails; the others finish their current page and exit.
    stop: AtomicBool,
}

impl WorkerContext {
    /// Process jobs until the queue is empty or another worker has failed.
    fn drain(&self, worker: usize, queue: &Mutex<VecDeque<PageJob>>) -> Result<Vec<PageResult>> {
        let outcome = self.drain_queue(worker, queue);
        if let Err(err) = &outcome {
            warn!(worker, error = %err, "Worker failed; stopping the chapter");
            self.stop.store(true, Ordering::SeqCst);
        }
        outcome
    }

    fn drain_queue(&self, worker: usize, queue: &Mutex<VecDeque<PageJob>>) -> Result<Vec<PageResult>> {
        let mut detector: Option<Box<dyn TextDetector>> = None;
        let mut results = Vec::new();

        while !self.stop.load(Ordering::SeqCst) {
            let job = queue
                .lock()
                .map_err(|_| FolioError::Worker("page queue lock poisoned".into()))?
                .pop_front();
            let Some(job) = job else { break };
            results.push(self.process(worker, job, &mut detector)?);
        }

        debug!(worker, pages = results.len(), "Worker finished");
        Ok(results)
    }

    fn process(
        &self,
        worker: usize,
        job: PageJob,
        detector: &mut Option<Box<dyn TextDetector>>,
    ) -> Result<PageResult> {
        let record_path = layout::page_record_path(&self.out_dir, &job.path);

        let bytes = match std::fs::read(&job.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                let record = unreadable_page(&job.path, &err);
                self.write_page(&job.path, &record_path, &record)?;
                return Ok(PageResult {
                    index: job.index,
                    record,
                    reused: false,
                });
            }
        };

        if self.resume {
            if let Some(stored) = reusable_record(&record_path, &bytes, &self.settings) {
                debug!(worker, image = %stored.image_name, "Reusing stored extraction");
                return Ok(PageResult {
                    index: job.index,
                    record: stored,
                    reused: true,
                });
            }
        }

        let engine = match detector.take() {
            Some(engine) => engine,
            None => (self.factory)()?,
        };
        let pipeline =
            PagePipeline::new(engine.as_ref(), self.enhancer, self.settings.confidence_threshold);
        let record = pipeline.process_bytes(&job.path, &bytes, hash_bytes(&bytes));
        *detector = Some(engine);
        self.write_page(&job.path, &record_path, &record)?;

        Ok(PageResult {
            index: job.index,
            record,
            reused: false,
        })
    }

    fn write_page(&self, image: &Path, record_path: &Path, record: &PageRecord) -> Result<()> {
        write_atomic(
            &layout::page_text_path(&self.out_dir, image),
            record.text.as_bytes(),
        )?;
        write_json(record_path, record)
    }
}

/// A stored record counts only when it succeeded against the same image bytes
/// under the same extraction settings.
fn reusable_record(path: &Path, bytes: &[u8], settings: &ExtractionSettings) -> Option<PageRecord> {
    let stored = read_page_record(path)?;
    if stored.error.is_some() {
        return None;
    }
    if !stored
        .source_hash
        .as_deref()
        .is_some_and(|hash| matches_hash(bytes, hash))
    {
        debug!(image = %stored.image_name, "Source image changed since last extraction");
        return None;
    }
    if !stored.extracted_with(settings) {
        debug!(
            image = %stored.image_name,
            stored = stored.settings.as_deref().unwrap_or("none"),
            current = %settings,
            "Extraction settings changed since last extraction"
        );
        return None;
    }
    Some(stored)
}

fn finish_chapter(
    chapter: ChapterNumber,
    out_dir: &Path,
    results: Vec<PageResult>,
    title: Option<&str>,
    topic: &str,
    started: Instant,
) -> Result<ChapterReport> {
    let reused = results.iter().filter(|r| r.reused).count();
    let records: Vec<PageRecord> = results.into_iter().map(|r| r.record).collect();

    write_atomic(
        &layout::combined_text_path(out_dir, chapter),
        render_combined_text(chapter, &records).as_bytes(),
    )?;

    let pages: Vec<_> = records.iter().map(PageRecord::to_page_lines).collect();
    let module = assemble_pages(chapter, title, topic, &pages);
    let module_path = layout::module_path(out_dir, chapter);
    write_atomic(&module_path, module_to_json(&module)?.as_bytes())?;

    let record = ChapterRecord::new(chapter, records);
    write_json(&layout::combined_json_path(out_dir, chapter), &record)?;

    Ok(ChapterReport {
        chapter,
        total_images: record.total_images,
        successful: record.successful_extractions,
        reused,
        total_lines: record.total_lines(),
        module_path,
        elapsed: started.elapsed(),
    })
}
