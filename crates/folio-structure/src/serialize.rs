// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Serialization adapter: maps the document tree onto the persisted module
// schema, and owns the raw-mode diagnostic records (per-page and per-chapter).

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use folio_core::error::Result;
use folio_core::{
    BlockMetadata, BlockType, BoundingBox, ChapterNumber, ContentBlock, Detection,
    ExtractionSettings, Module, ModuleCategory, OrderedLine, PageLines, Section,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::classify::{Classification, classify_text};
use crate::page::StructuredPage;

// -- Persisted module ---------------------------------------------------------

/// Borrowed view of a [`Module`] in the viewer's schema.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedModule<'a> {
    pub module_title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_subtitle: Option<&'a str>,
    pub category: ModuleCategory,
    pub order_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_image_names: Option<&'a [String]>,
    pub sections: Vec<PersistedSection<'a>>,
    pub image_inventory: &'a [Value],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSection<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<&'a str>,
    pub order_index: u32,
    pub content: Vec<PersistedBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedBlock<'a> {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: &'a str,
    pub order_index: u32,
    /// Table data or list items, JSON-encoded as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_image_names: Option<&'a [String]>,
}

impl<'a> PersistedModule<'a> {
    pub fn from_module(module: &'a Module) -> Result<Self> {
        Ok(Self {
            module_title: &module.title,
            module_subtitle: module.subtitle.as_deref(),
            category: module.category,
            order_index: module.order_index,
            page_image_names: module.page_image_names.as_deref(),
            sections: module
                .sections
                .iter()
                .map(PersistedSection::from_section)
                .collect::<Result<_>>()?,
            image_inventory: &module.image_inventory,
        })
    }
}

impl<'a> PersistedSection<'a> {
    fn from_section(section: &'a Section) -> Result<Self> {
        Ok(Self {
            title: &section.title,
            subtitle: section.subtitle.as_deref(),
            order_index: section.order_index,
            content: section
                .blocks
                .iter()
                .map(PersistedBlock::from_block)
                .collect::<Result<_>>()?,
        })
    }
}

impl<'a> PersistedBlock<'a> {
    fn from_block(block: &'a ContentBlock) -> Result<Self> {
        Ok(Self {
            block_type: block.block_type,
            content: &block.content,
            order_index: block.order_index,
            metadata: block.metadata.as_ref().map(encode_metadata).transpose()?,
            page_image_names: block.page_image_names.as_deref(),
        })
    }
}

/// Tables encode their data verbatim; lists encode `{"items": [...]}`.
pub fn encode_metadata(metadata: &BlockMetadata) -> Result<String> {
    let encoded = match metadata {
        BlockMetadata::Table(data) => serde_json::to_string(data)?,
        BlockMetadata::Items(items) => serde_json::to_string(&json!({ "items": items }))?,
    };
    Ok(encoded)
}

/// Pretty-printed module JSON, as written to `module_<NN>.json`.
pub fn module_to_json(module: &Module) -> Result<String> {
    Ok(serde_json::to_string_pretty(&PersistedModule::from_module(module)?)?)
}

// -- Raw-mode page records ----------------------------------------------------

/// One line of a page record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredLine {
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    pub text: String,
    pub confidence: f64,
    pub y_position: f64,
    #[serde(default)]
    pub is_heading: bool,
    #[serde(default)]
    pub is_list_item: bool,
}

impl From<&OrderedLine> for StructuredLine {
    fn from(line: &OrderedLine) -> Self {
        Self {
            bounding_box: line.detection.bounding_box,
            text: line.detection.text.clone(),
            confidence: line.detection.confidence,
            y_position: line.y_position,
            is_heading: line.is_heading,
            is_list_item: line.is_list_item,
        }
    }
}

impl StructuredLine {
    /// Roles are recomputed from the text; the stored flags are informational.
    fn to_ordered_line(&self) -> OrderedLine {
        let Classification {
            role,
            is_heading,
            is_list_item,
        } = classify_text(&self.text);
        OrderedLine {
            detection: Detection {
                bounding_box: self.bounding_box,
                text: self.text.clone(),
                confidence: self.confidence,
            },
            y_position: self.y_position,
            role,
            is_heading,
            is_list_item,
        }
    }
}

/// Per-image extraction result, written as `<stem>_extracted.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub image_path: String,
    pub image_name: String,
    pub text: String,
    pub line_count: usize,
    pub structured_text: Vec<StructuredLine>,
    /// SHA-256 of the source image bytes, hex-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    /// The [`ExtractionSettings`] stamp the page was extracted with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<String>,
    #[serde(default)]
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageRecord {
    pub fn from_page(
        image_path: &str,
        page: &StructuredPage,
        source_hash: Option<String>,
        elapsed_ms: u64,
    ) -> Self {
        let lines = &page.page.lines;
        Self {
            image_path: image_path.to_owned(),
            image_name: page.page.image_name.clone(),
            text: lines.iter().map(OrderedLine::text).collect::<Vec<_>>().join("\n"),
            line_count: lines.len(),
            structured_text: lines.iter().map(StructuredLine::from).collect(),
            source_hash,
            settings: None,
            elapsed_ms,
            error: None,
        }
    }

    /// A zero-line record for an image that could not be processed.
    pub fn failed(
        image_path: &str,
        image_name: &str,
        source_hash: Option<String>,
        elapsed_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            image_path: image_path.to_owned(),
            image_name: image_name.to_owned(),
            text: String::new(),
            line_count: 0,
            structured_text: Vec::new(),
            source_hash,
            settings: None,
            elapsed_ms,
            error: Some(error.into()),
        }
    }

    pub fn with_settings(mut self, settings: &ExtractionSettings) -> Self {
        self.settings = Some(settings.to_string());
        self
    }

    /// Whether this record was produced with exactly `settings`.
    pub fn extracted_with(&self, settings: &ExtractionSettings) -> bool {
        self.settings.as_deref() == Some(settings.to_string().as_str())
    }

    pub fn is_successful(&self) -> bool {
        self.line_count > 0
    }

    /// Rebuild the ordered lines, e.g. when a stored record is reused.
    pub fn to_page_lines(&self) -> PageLines {
        PageLines {
            image_name: self.image_name.clone(),
            lines: self
                .structured_text
                .iter()
                .map(StructuredLine::to_ordered_line)
                .collect(),
        }
    }
}

// -- Raw-mode chapter records -------------------------------------------------

const BANNER_WIDTH: usize = 70;

/// Combined per-chapter record, written as `chapter_<NN>_combined.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRecord {
    pub chapter: String,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_images: usize,
    pub successful_extractions: usize,
    pub extractions: Vec<PageRecord>,
}

impl ChapterRecord {
    pub fn new(chapter: ChapterNumber, extractions: Vec<PageRecord>) -> Self {
        Self {
            chapter: format!("Chapter {}", chapter.padded()),
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            total_images: extractions.len(),
            successful_extractions: extractions.iter().filter(|r| r.is_successful()).count(),
            extractions,
        }
    }

    pub fn total_lines(&self) -> usize {
        self.extractions.iter().map(|r| r.line_count).sum()
    }
}

/// Human-readable chapter text, written as `chapter_<NN>_combined.txt`.
pub fn render_combined_text(chapter: ChapterNumber, pages: &[PageRecord]) -> String {
    let rule = "─".repeat(BANNER_WIDTH);
    let mut out = format!(
        "CHAPTER {} - COMBINED EXTRACTED TEXT\n{}\n\n",
        chapter.get(),
        "=".repeat(BANNER_WIDTH)
    );
    for page in pages {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\n{rule}\nSOURCE: {}\nLINES: {}\n{rule}\n\n{}\n\n",
            page.image_name, page.line_count, page.text
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{EnhanceProfile, LineRole, PipelineConfig};

    use crate::normalize::RawDetection;
    use crate::page::structure_page;

    fn block(block_type: BlockType, metadata: Option<BlockMetadata>) -> ContentBlock {
        ContentBlock {
            block_type,
            content: "body".into(),
            order_index: 1,
            metadata,
            page_image_names: None,
        }
    }

    fn module_with(blocks: Vec<ContentBlock>) -> Module {
        Module {
            title: "Module 3".into(),
            subtitle: None,
            category: ModuleCategory::General,
            order_index: 3,
            page_image_names: None,
            sections: vec![Section {
                title: "Section 1".into(),
                subtitle: None,
                order_index: 1,
                blocks,
            }],
            image_inventory: Vec::new(),
        }
    }

    #[test]
    fn absent_fields_are_omitted() {
        let module = module_with(vec![block(BlockType::Paragraph, None)]);
        let value: Value = serde_json::from_str(&module_to_json(&module).unwrap()).unwrap();

        assert_eq!(value["moduleTitle"], "Module 3");
        assert_eq!(value["category"], "general");
        assert!(value.get("moduleSubtitle").is_none());
        assert!(value.get("pageImageNames").is_none());
        assert_eq!(value["imageInventory"], json!([]));

        let section = &value["sections"][0];
        assert!(section.get("subtitle").is_none());
        let content = &section["content"][0];
        assert_eq!(content["type"], "paragraph");
        assert_eq!(content["orderIndex"], 1);
        assert!(content.get("metadata").is_none());
        assert!(content.get("pageImageNames").is_none());
    }

    #[test]
    fn metadata_is_encoded_as_string() {
        let module = module_with(vec![
            block(
                BlockType::Table,
                Some(BlockMetadata::Table(json!({ "headers": ["Sign", "Value"] }))),
            ),
            block(
                BlockType::BulletList,
                Some(BlockMetadata::Items(vec![json!("one"), json!("two")])),
            ),
        ]);
        let value: Value = serde_json::from_str(&module_to_json(&module).unwrap()).unwrap();
        let content = &value["sections"][0]["content"];

        assert_eq!(content[0]["metadata"], r#"{"headers":["Sign","Value"]}"#);
        assert_eq!(content[1]["metadata"], r#"{"items":["one","two"]}"#);
        assert_eq!(content[1]["type"], "bulletList");
    }

    #[test]
    fn empty_table_data_encodes_as_empty_object() {
        let encoded = encode_metadata(&BlockMetadata::Table(json!({}))).unwrap();
        assert_eq!(encoded, "{}");
    }

    fn sample_page() -> StructuredPage {
        let band = |top: f64| vec![[0.0, top], [90.0, top], [90.0, top + 10.0], [0.0, top + 10.0]];
        structure_page(
            "IMG_0042.JPG",
            vec![
                RawDetection::new(band(40.0), "1. Check pulse", 0.9),
                RawDetection::new(band(10.0), "CIRCULATION", 0.97),
            ],
            0.5,
        )
    }

    #[test]
    fn page_record_round_trips_lines() {
        let page = sample_page();
        let record = PageRecord::from_page("/photos/IMG_0042.JPG", &page, Some("ab12".into()), 840);

        assert_eq!(record.text, "CIRCULATION\n1. Check pulse");
        assert_eq!(record.line_count, 2);
        assert!(record.is_successful());

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"box\""));
        assert!(json.contains("\"yPosition\""));
        assert!(!json.contains("\"error\""));

        let back: PageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_page_lines(), page.page);
    }

    #[test]
    fn stored_role_flags_are_recomputed_on_reload() {
        let record = PageRecord::from_page("/p/IMG_0042.JPG", &sample_page(), None, 1);
        let mut value = serde_json::to_value(&record).unwrap();
        // A record written by a classifier that saw neither line as structural.
        for line in value["structuredText"].as_array_mut().unwrap() {
            line["isHeading"] = json!(false);
            line["isListItem"] = json!(false);
        }
        let stored: PageRecord = serde_json::from_value(value).unwrap();

        let lines = stored.to_page_lines().lines;
        assert_eq!(lines[0].role, LineRole::Heading);
        assert!(lines[0].is_heading);
        // "1. Check pulse" matches both rules; heading takes precedence.
        assert_eq!(lines[1].role, LineRole::Heading);
        assert!(lines[1].is_heading);
        assert!(lines[1].is_list_item);
    }

    #[test]
    fn settings_stamp_is_stored_and_compared() {
        let config = PipelineConfig::default();
        let record = PageRecord::from_page("/p/a.jpg", &sample_page(), None, 1);
        assert!(!record.extracted_with(&config.extraction_settings()));
        assert!(!serde_json::to_string(&record).unwrap().contains("\"settings\""));

        let record = record.with_settings(&config.extraction_settings());
        let back: PageRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(
            back.settings.as_deref(),
            Some("threshold=0.5;profile=enhanced;maxWidth=2000")
        );
        assert!(back.extracted_with(&config.extraction_settings()));

        let stricter = PipelineConfig {
            confidence_threshold: 0.92,
            ..PipelineConfig::default()
        };
        assert!(!back.extracted_with(&stricter.extraction_settings()));
        let other_profile = PipelineConfig {
            enhance_profile: EnhanceProfile::Grayscale,
            ..PipelineConfig::default()
        };
        assert!(!back.extracted_with(&other_profile.extraction_settings()));
    }

    #[test]
    fn failed_record_has_no_lines() {
        let record = PageRecord::failed("/p/x.jpg", "x.jpg", None, 12, "decode error");
        assert!(!record.is_successful());
        assert_eq!(record.text, "");
        assert!(record.to_page_lines().lines.is_empty());
    }

    #[test]
    fn chapter_record_counts_successes() {
        let chapter = ChapterNumber::new(2).unwrap();
        let ok = PageRecord::from_page("/p/a.jpg", &sample_page(), None, 1);
        let failed = PageRecord::failed("/p/b.jpg", "b.jpg", None, 1, "boom");
        let record = ChapterRecord::new(chapter, vec![ok, failed]);

        assert_eq!(record.chapter, "Chapter 02");
        assert_eq!(record.total_images, 2);
        assert_eq!(record.successful_extractions, 1);
        assert_eq!(record.total_lines(), 2);

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("runId").is_some());
        assert!(value.get("generatedAt").is_some());
    }

    #[test]
    fn combined_text_layout() {
        let chapter = ChapterNumber::new(4).unwrap();
        let record = PageRecord::from_page("/p/a.jpg", &sample_page(), None, 1);
        let text = render_combined_text(chapter, &[record]);

        assert!(text.starts_with("CHAPTER 4 - COMBINED EXTRACTED TEXT\n"));
        assert!(text.contains("SOURCE: IMG_0042.JPG\nLINES: 2\n"));
        assert!(text.contains("CIRCULATION\n1. Check pulse\n\n"));
        assert_eq!(text.matches(&"─".repeat(BANNER_WIDTH)).count(), 2);
    }
}
