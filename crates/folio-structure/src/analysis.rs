// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assisted-mode input: the section/block analysis produced by an upstream
// semantic-tagging pass over a chapter's pages.
//
// Every field is optional: missing or `null` values fall back to defaults at
// assembly time. Only a structurally wrong document (e.g. `sections` that is
// not an array) is rejected.

use folio_core::error::{FolioError, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A chapter analysis.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Analysis {
    pub chapter_title: Option<String>,
    pub topic: Option<String>,
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub page_images: Vec<ImageRef>,
    #[serde(deserialize_with = "null_as_default")]
    pub sections: Vec<AnalysisSection>,
    /// Opaque image metadata, passed through to the module untouched.
    #[serde(deserialize_with = "null_as_default")]
    pub image_inventory: Vec<Value>,
}

impl Analysis {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| FolioError::InvalidAnalysis(err.to_string()))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| FolioError::InvalidAnalysis(err.to_string()))
    }
}

/// Reference to an image file; entries without a filename are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub content: Vec<AnalysisBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisBlock {
    /// Free-text type label, resolved through the content-type vocabulary.
    #[serde(rename = "type")]
    pub label: Option<String>,
    /// Block text. Non-string values are kept as their JSON text.
    #[serde(deserialize_with = "text_or_json")]
    pub content: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<Value>,
    pub table_data: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<ImageRef>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_or_json<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}
