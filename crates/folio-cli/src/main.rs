// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio: reference-manual digitization.
//
// Entry point. Parses the command line, initialises logging, resolves run
// settings, and dispatches to the chapter, batch, or assisted-mode services.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use folio_core::error::Result;
use folio_core::human_errors::humanize_error;
use folio_core::{ChapterNumber, EnhanceProfile, PipelineConfig};
use tracing::{error, info};

use services::assist::{DEFAULT_MODULES_DIR, assemble_file};
use services::batch::{parse_chapters, run_batch};
use services::chapter::{DetectorFactory, RunOptions, run_chapter};
use services::layout::ProjectLayout;
use services::settings::{Overrides, resolve_config};

/// OCR reference-manual page photos and assemble them into viewer-ready
/// module JSON.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON settings file (missing fields take defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, global = true, action = ArgAction::SetTrue)]
    debug: bool,

    /// Page workers per chapter, each with its own OCR engine
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Pre-processing profile: basic, enhanced, or grayscale
    #[arg(long, global = true)]
    profile: Option<EnhanceProfile>,

    /// Downscale page photos wider than this many pixels
    #[arg(long = "max-width", global = true)]
    max_width: Option<u32>,

    /// Directory holding text-detection.rten and text-recognition.rten
    #[arg(long, global = true)]
    models: Option<PathBuf>,

    /// Re-process every page even if a matching extraction exists
    #[arg(long = "no-resume", global = true, action = ArgAction::SetTrue)]
    no_resume: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// OCR one chapter's photos and assemble its module
    Extract {
        /// Chapter number (1-99)
        chapter: ChapterNumber,

        /// Folder containing the `NN_Chapter_Photos` folders
        #[arg(long)]
        root: PathBuf,

        /// Output folder [default: <root>/ExtractedText]
        #[arg(long)]
        out: Option<PathBuf>,

        /// Module title [default: "Module <chapter>"]
        #[arg(long)]
        title: Option<String>,

        /// Topic used to pick the module category
        #[arg(long, default_value = "")]
        topic: String,
    },

    /// OCR several chapters in sequence, continuing past failures
    ExtractAll {
        /// Folder containing the `NN_Chapter_Photos` folders
        #[arg(long)]
        root: PathBuf,

        /// Chapters to process, e.g. `1-9` or `2,4,7-8`
        #[arg(long, default_value = "1-9")]
        chapters: String,

        /// Output folder [default: <root>/ExtractedText]
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Build a module from an upstream section/block analysis
    Assemble {
        /// Chapter number (1-99)
        chapter: ChapterNumber,

        /// Analysis JSON file
        analysis: PathBuf,

        /// Output folder
        #[arg(long, default_value = DEFAULT_MODULES_DIR)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            let human = humanize_error(&err);
            error!(error = %err, "folio failed");
            eprintln!("error: {}\n  {}\n  hint: {}", err, human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let overrides = Overrides {
        workers: args.workers,
        profile: args.profile,
        max_width: args.max_width,
        model_dir: args.models,
        no_resume: args.no_resume,
    };
    let config = resolve_config(args.config.as_deref(), &overrides)?;

    match args.command {
        Command::Extract {
            chapter,
            root,
            out,
            title,
            topic,
        } => {
            let factory = detector_factory(&config)?;
            let layout = ProjectLayout::new(root, out);
            let options = RunOptions {
                config,
                title,
                topic,
            };
            let report = run_chapter(chapter, &layout, &options, factory).await?;
            println!(
                "Chapter {}: {}/{} pages, {} lines ({} reused) -> {}",
                report.chapter.get(),
                report.successful,
                report.total_images,
                report.total_lines,
                report.reused,
                report.module_path.display()
            );
            Ok(ExitCode::SUCCESS)
        }

        Command::ExtractAll {
            root,
            chapters,
            out,
        } => {
            let chapters = parse_chapters(&chapters)?;
            let factory = detector_factory(&config)?;
            let layout = ProjectLayout::new(root, out);
            let options = RunOptions {
                config,
                ..RunOptions::default()
            };
            info!(chapters = chapters.len(), "Batch extraction starting");
            let summary = run_batch(&chapters, &layout, &options, factory).await;
            print!("{}", summary.render());
            Ok(if summary.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Assemble {
            chapter,
            analysis,
            out,
        } => {
            let path = assemble_file(chapter, &analysis, &out)?;
            println!("Module {} -> {}", chapter.get(), path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// One `ocrs` engine per worker, loaded from the configured model directory.
#[cfg(feature = "ocr")]
fn detector_factory(config: &PipelineConfig) -> Result<DetectorFactory> {
    use folio_document::{OcrConfig, OcrsDetector, TextDetector};
    use std::sync::Arc;

    let ocr_config = OcrConfig::from_model_dir(config.model_dir.as_deref());
    ocr_config.validate()?;
    Ok(Arc::new(move || -> Result<Box<dyn TextDetector>> {
        Ok(Box::new(OcrsDetector::new(&ocr_config)?))
    }))
}

#[cfg(not(feature = "ocr"))]
fn detector_factory(_config: &PipelineConfig) -> Result<DetectorFactory> {
    Err(folio_core::FolioError::FeatureUnavailable("ocr"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_extract_with_global_flags() {
        let args = Args::try_parse_from([
            "folio", "extract", "3", "--root", "/book", "--workers", "4", "--profile", "grayscale",
            "--no-resume",
        ])
        .unwrap();
        assert_eq!(args.workers, Some(4));
        assert_eq!(args.profile, Some(EnhanceProfile::Grayscale));
        assert!(args.no_resume);
        match args.command {
            Command::Extract { chapter, topic, .. } => {
                assert_eq!(chapter.get(), 3);
                assert_eq!(topic, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_chapter() {
        assert!(Args::try_parse_from(["folio", "assemble", "0", "a.json"]).is_err());
        assert!(Args::try_parse_from(["folio", "extract", "100", "--root", "."]).is_err());
    }

    #[cfg(not(feature = "ocr"))]
    #[tokio::test]
    async fn raw_mode_needs_the_ocr_feature() {
        let args = Args::try_parse_from(["folio", "extract", "1", "--root", "/nonexistent"]).unwrap();
        let err = run(args).await.unwrap_err();
        assert!(matches!(err, folio_core::FolioError::FeatureUnavailable("ocr")));
    }
}
