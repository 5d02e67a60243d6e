// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: OCR detections, ordered lines, and the module → section →
// content block document tree.

use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// A 2-D point in image pixel coordinates, `[x, y]`.
pub type Point = [f64; 2];

/// Chapter number, 1..=99. Doubles as the module's `orderIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChapterNumber(u32);

impl ChapterNumber {
    pub const MAX: u32 = 99;

    pub fn new(value: u32) -> Result<Self, FolioError> {
        if (1..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(FolioError::InvalidChapter(format!(
                "{value} (expected 1..={})",
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Two-digit rendering used in folder and file names (`01`, `12`).
    pub fn padded(self) -> String {
        format!("{:02}", self.0)
    }
}

impl std::str::FromStr for ChapterNumber {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| FolioError::InvalidChapter(s.to_owned()))?;
        Self::new(value)
    }
}

impl std::fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quadrilateral around one detected text line, clockwise from top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBox(pub [Point; 4]);

impl BoundingBox {
    /// Build a box from exactly four finite points.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let corners: [Point; 4] = points.try_into().ok()?;
        if corners.iter().flatten().all(|c| c.is_finite()) {
            Some(Self(corners))
        } else {
            None
        }
    }

    /// Axis-aligned rectangle as a box (left, top, right, bottom).
    pub fn from_rect(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self([[left, top], [right, top], [right, bottom], [left, bottom]])
    }

    /// Arithmetic mean of the four corners' y-coordinates.
    pub fn mean_y(&self) -> f64 {
        self.0.iter().map(|p| p[1]).sum::<f64>() / 4.0
    }
}

/// One validated OCR line result.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    pub text: String,
    /// Recognition confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

/// Semantic role of a line of raw OCR text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineRole {
    Heading,
    ListItem,
    PlainText,
}

/// A detection placed in reading order and tagged with its role.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedLine {
    pub detection: Detection,
    /// Mean of the bounding box y-coordinates; the reading-order key.
    pub y_position: f64,
    pub role: LineRole,
    pub is_heading: bool,
    pub is_list_item: bool,
}

impl OrderedLine {
    pub fn text(&self) -> &str {
        &self.detection.text
    }
}

/// The ordered lines recovered from one page image.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLines {
    pub image_name: String,
    pub lines: Vec<OrderedLine>,
}

/// Content block types understood by the viewer application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Heading,
    Subheading,
    Paragraph,
    BulletList,
    NumberedList,
    Procedure,
    NumberedSteps,
    Warning,
    Tip,
    Note,
    Table,
    Definition,
    Example,
    Scenario,
    HeroImage,
}

impl BlockType {
    pub fn is_list(&self) -> bool {
        matches!(self, Self::BulletList | Self::NumberedList)
    }
}

/// Module categories shown as filters in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleCategory {
    Assessment,
    Environmental,
    Medical,
    Trauma,
    Minor,
    Evacuation,
    Communication,
    #[default]
    General,
}

impl ModuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assessment => "assessment",
            Self::Environmental => "environmental",
            Self::Medical => "medical",
            Self::Trauma => "trauma",
            Self::Minor => "minor",
            Self::Evacuation => "evacuation",
            Self::Communication => "communication",
            Self::General => "general",
        }
    }
}

/// Structured payload attached to table and list blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockMetadata {
    /// Tabular data exactly as supplied upstream.
    Table(serde_json::Value),
    /// Non-empty list items.
    Items(Vec<serde_json::Value>),
}

/// The smallest classified unit of document content.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    pub block_type: BlockType,
    pub content: String,
    /// 1-based position within the parent section.
    pub order_index: u32,
    pub metadata: Option<BlockMetadata>,
    /// Associated image filenames; `None` rather than an empty list.
    pub page_image_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub subtitle: Option<String>,
    /// 1-based position within the parent module.
    pub order_index: u32,
    pub blocks: Vec<ContentBlock>,
}

/// Structured representation of one chapter; the unit of persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub title: String,
    pub subtitle: Option<String>,
    pub category: ModuleCategory,
    /// The chapter number.
    pub order_index: u32,
    pub page_image_names: Option<Vec<String>>,
    pub sections: Vec<Section>,
    /// Image metadata passed through from the upstream analysis, untouched.
    pub image_inventory: Vec<serde_json::Value>,
}

impl Module {
    pub fn block_count(&self) -> usize {
        self.sections.iter().map(|s| s.blocks.len()).sum()
    }
}

/// Image pre-processing applied before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhanceProfile {
    /// Resize only.
    Basic,
    /// Resize, contrast ×1.5, sharpness ×1.2.
    #[default]
    Enhanced,
    /// Resize, grayscale, contrast ×1.8.
    Grayscale,
}

impl EnhanceProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Enhanced => "enhanced",
            Self::Grayscale => "grayscale",
        }
    }
}

impl std::str::FromStr for EnhanceProfile {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "enhanced" => Ok(Self::Enhanced),
            "grayscale" | "greyscale" => Ok(Self::Grayscale),
            other => Err(FolioError::Config(format!(
                "unknown enhance profile `{other}` (expected basic, enhanced, or grayscale)"
            ))),
        }
    }
}
