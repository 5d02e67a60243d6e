// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Block/module assembler: builds the module → section → content block tree.
//
// Two entry points share the same invariants: sibling order indices are the
// 1-based input positions, titles are never empty, every type and category is
// drawn from the closed enums, and absent optional data stays `None`.

use folio_core::{BlockMetadata, BlockType, ChapterNumber, ContentBlock, Module, PageLines, Section};
use tracing::debug;

use crate::analysis::{Analysis, AnalysisBlock, AnalysisSection, ImageRef};
use crate::vocabulary::{line_block_type, resolve_category, resolve_content_type};

/// Build a module from an upstream analysis (assisted mode).
pub fn assemble_analysis(chapter: ChapterNumber, analysis: &Analysis) -> Module {
    let title = non_blank(analysis.chapter_title.as_deref())
        .map(str::to_owned)
        .unwrap_or_else(|| default_module_title(chapter));
    let category = resolve_category(analysis.topic.as_deref().unwrap_or_default(), &title);

    let sections: Vec<Section> = analysis
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| assemble_section(index, section))
        .collect();

    let module = Module {
        title,
        subtitle: analysis.subtitle.clone(),
        category,
        order_index: chapter.get(),
        page_image_names: image_names(&analysis.page_images),
        sections,
        image_inventory: analysis.image_inventory.clone(),
    };
    debug!(
        chapter = chapter.get(),
        sections = module.sections.len(),
        blocks = module.block_count(),
        category = module.category.as_str(),
        "Module assembled from analysis"
    );
    module
}

fn assemble_section(index: usize, raw: &AnalysisSection) -> Section {
    Section {
        title: non_blank(raw.title.as_deref())
            .map(str::to_owned)
            .unwrap_or_else(|| default_section_title(index)),
        subtitle: raw.subtitle.clone(),
        order_index: order_index(index),
        blocks: raw
            .content
            .iter()
            .enumerate()
            .map(|(index, block)| assemble_block(index, block))
            .collect(),
    }
}

fn assemble_block(index: usize, raw: &AnalysisBlock) -> ContentBlock {
    let content = raw.content.clone().unwrap_or_default();
    let block_type = resolve_content_type(raw.label.as_deref().unwrap_or("paragraph"), &content);

    let metadata = if block_type == BlockType::Table {
        Some(BlockMetadata::Table(
            raw.table_data
                .clone()
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        ))
    } else if block_type.is_list() && !raw.items.is_empty() {
        Some(BlockMetadata::Items(raw.items.clone()))
    } else {
        None
    };

    ContentBlock {
        block_type,
        content,
        order_index: order_index(index),
        metadata,
        page_image_names: image_names(&raw.images),
    }
}

/// Build a module from ordered, classified OCR lines (raw mode).
///
/// Each page becomes one section titled by its first heading line; each line
/// becomes one block tagged with the page's image name.
pub fn assemble_pages(
    chapter: ChapterNumber,
    title: Option<&str>,
    topic: &str,
    pages: &[PageLines],
) -> Module {
    let title = non_blank(title)
        .map(str::to_owned)
        .unwrap_or_else(|| default_module_title(chapter));
    let category = resolve_category(topic, &title);

    let sections: Vec<Section> = pages
        .iter()
        .enumerate()
        .map(|(index, page)| page_section(index, page))
        .collect();

    let page_names: Vec<ImageRef> = pages
        .iter()
        .map(|page| ImageRef {
            filename: Some(page.image_name.clone()),
        })
        .collect();

    let module = Module {
        title,
        subtitle: None,
        category,
        order_index: chapter.get(),
        page_image_names: image_names(&page_names),
        sections,
        image_inventory: Vec::new(),
    };
    debug!(
        chapter = chapter.get(),
        pages = pages.len(),
        blocks = module.block_count(),
        category = module.category.as_str(),
        "Module assembled from OCR lines"
    );
    module
}

fn page_section(index: usize, page: &PageLines) -> Section {
    let title = page
        .lines
        .iter()
        .find(|line| line.is_heading)
        .and_then(|line| non_blank(Some(line.text())))
        .map(|text| text.trim().to_owned())
        .unwrap_or_else(|| default_section_title(index));
    let image = non_blank(Some(&page.image_name)).map(|name| vec![name.to_owned()]);

    Section {
        title,
        subtitle: None,
        order_index: order_index(index),
        blocks: page
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| ContentBlock {
                block_type: line_block_type(line),
                content: line.text().to_owned(),
                order_index: order_index(index),
                metadata: None,
                page_image_names: image.clone(),
            })
            .collect(),
    }
}

/// Filenames in first-seen order without duplicates; `None` when empty.
fn image_names(refs: &[ImageRef]) -> Option<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for name in refs.iter().filter_map(|r| non_blank(r.filename.as_deref())) {
        if !names.iter().any(|seen| seen == name) {
            names.push(name.to_owned());
        }
    }
    (!names.is_empty()).then_some(names)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn order_index(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

fn default_module_title(chapter: ChapterNumber) -> String {
    format!("Module {}", chapter.get())
}

fn default_section_title(index: usize) -> String {
    format!("Section {}", index + 1)
}
