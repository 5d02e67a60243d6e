// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-structure: turns noisy OCR detections, or a pre-tagged analysis, into
// the module → section → content block tree consumed by the viewer.
//
// Stages run strictly in order: normalize → order → classify → assemble →
// serialize. Every stage is a pure function; nothing here touches the
// filesystem or the OCR engine.

pub mod analysis;
pub mod assemble;
pub mod classify;
pub mod normalize;
pub mod order;
pub mod page;
pub mod serialize;
pub mod vocabulary;

pub use analysis::Analysis;
pub use assemble::{assemble_analysis, assemble_pages};
pub use classify::{Classification, classify_text, is_heading, is_list_item};
pub use normalize::{LineOutcome, NormalizeReport, RawDetection, SkipCounts, SkipReason, normalize};
pub use order::{PositionedDetection, order_detections};
pub use page::{StructuredPage, structure_page};
pub use serialize::{ChapterRecord, PageRecord, PersistedModule, module_to_json};
pub use vocabulary::{resolve_category, resolve_content_type};
