// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Controlled vocabularies: map free-text topic and type labels onto the
// closed category and block-type enums.
//
// Tables are ordered slices scanned front to back with substring containment;
// the first matching entry wins, so entry order is the tie-break for
// overlapping keys (e.g. "subheading" contains "heading").

use folio_core::{BlockType, LineRole, ModuleCategory, OrderedLine};

/// Topic keywords → module category.
pub const CATEGORY_TABLE: &[(&str, ModuleCategory)] = &[
    ("assessment", ModuleCategory::Assessment),
    ("patient assessment", ModuleCategory::Assessment),
    ("environmental", ModuleCategory::Environmental),
    ("environmental medicine", ModuleCategory::Environmental),
    ("medical", ModuleCategory::Medical),
    ("medical emergencies", ModuleCategory::Medical),
    ("trauma", ModuleCategory::Trauma),
    ("traumatic injuries", ModuleCategory::Trauma),
    ("backcountry", ModuleCategory::Minor),
    ("backcountry problems", ModuleCategory::Minor),
    ("micromedics", ModuleCategory::Medical),
    ("evacuation", ModuleCategory::Evacuation),
    ("communication", ModuleCategory::Communication),
    ("general", ModuleCategory::General),
];

/// Type-label synonyms → block type.
pub const CONTENT_TYPE_TABLE: &[(&str, BlockType)] = &[
    ("heading", BlockType::Heading),
    ("title", BlockType::Heading),
    ("subheading", BlockType::Subheading),
    ("subtitle", BlockType::Subheading),
    ("paragraph", BlockType::Paragraph),
    ("text", BlockType::Paragraph),
    ("bullet list", BlockType::BulletList),
    ("bulleted list", BlockType::BulletList),
    ("numbered list", BlockType::NumberedList),
    ("ordered list", BlockType::NumberedList),
    ("procedure", BlockType::Procedure),
    ("steps", BlockType::NumberedSteps),
    ("warning", BlockType::Warning),
    ("caution", BlockType::Warning),
    ("tip", BlockType::Tip),
    ("note", BlockType::Note),
    ("table", BlockType::Table),
    ("chart", BlockType::Table),
    ("definition", BlockType::Definition),
    ("example", BlockType::Example),
    ("scenario", BlockType::Scenario),
    ("image", BlockType::HeroImage),
    ("diagram", BlockType::HeroImage),
    ("illustration", BlockType::HeroImage),
];

const BULLET_GLYPHS: [char; 3] = ['-', '•', '*'];

/// Highest number recognised as a numbered-list opener (`19.`).
const MAX_LIST_NUMBER: u32 = 19;

fn first_match<T: Copy>(table: &[(&str, T)], haystack: &str) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| haystack.contains(key))
        .map(|(_, value)| *value)
}

/// Category from the module's topic and title; `General` when nothing matches.
pub fn resolve_category(topic: &str, title: &str) -> ModuleCategory {
    let combined = format!("{topic} {title}").to_lowercase();
    first_match(CATEGORY_TABLE, &combined).unwrap_or_default()
}

/// Block type from an upstream label, falling back to the content's shape.
pub fn resolve_content_type(label: &str, content: &str) -> BlockType {
    first_match(CONTENT_TYPE_TABLE, &label.to_lowercase())
        .unwrap_or_else(|| infer_content_shape(content))
}

/// Bullet glyph → bullet list; `1.` through `19.` → numbered list; otherwise
/// paragraph.
pub fn infer_content_shape(content: &str) -> BlockType {
    let trimmed = content.trim();
    if trimmed.starts_with(BULLET_GLYPHS) {
        BlockType::BulletList
    } else if (1..=MAX_LIST_NUMBER).any(|n| trimmed.starts_with(&format!("{n}."))) {
        BlockType::NumberedList
    } else {
        BlockType::Paragraph
    }
}

/// Block type for a raw-mode line.
///
/// List items that don't match a list shape (`a) ...`, `3) ...`) become
/// numbered lists when they open with a digit and bullet lists otherwise.
pub fn line_block_type(line: &OrderedLine) -> BlockType {
    match line.role {
        LineRole::Heading => BlockType::Heading,
        LineRole::PlainText => BlockType::Paragraph,
        LineRole::ListItem => match infer_content_shape(line.text()) {
            BlockType::Paragraph if line.text().starts_with(|c: char| c.is_ascii_digit()) => {
                BlockType::NumberedList
            }
            BlockType::Paragraph => BlockType::BulletList,
            shape => shape,
        },
    }
}
