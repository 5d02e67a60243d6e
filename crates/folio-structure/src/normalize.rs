// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection normalizer: validates raw OCR candidates and drops malformed,
// empty, and low-confidence lines.
//
// OCR output is noisy by nature: a bad line is expected signal loss, not an
// error, so nothing in this module fails. Each candidate is either kept or
// skipped with a reason, and the reasons are counted per image for logging.

use std::collections::BTreeMap;

use folio_core::{BoundingBox, Detection, Point};
use serde_json::{Map, Value};
use tracing::debug;

/// One OCR line candidate before validation. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetection {
    pub bounding_box: Option<Vec<Point>>,
    pub text: Option<String>,
    pub confidence: Option<f64>,
}

impl RawDetection {
    pub fn new(points: Vec<Point>, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            bounding_box: Some(points),
            text: Some(text.into()),
            confidence: Some(confidence),
        }
    }

    /// Read a candidate from engine JSON.
    ///
    /// Accepts the tuple shape `[box, [text, confidence]]` (confidence defaults
    /// to `1.0` when the engine omits it) and the object shape
    /// `{"box" | "boundingBox" | "bbox", "text", "confidence"}`. Anything else
    /// yields an empty candidate, which the normalizer then skips.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(parts) => Self::from_tuple(parts),
            Value::Object(map) => Self::from_object(map),
            _ => Self::default(),
        }
    }

    fn from_tuple(parts: &[Value]) -> Self {
        let [bbox, text_info, ..] = parts else {
            return Self::default();
        };
        let (text, confidence) = match text_info {
            Value::Array(info) => (
                info.first().and_then(Value::as_str).map(str::to_owned),
                match info.get(1) {
                    Some(value) => value.as_f64(),
                    None => Some(1.0),
                },
            ),
            _ => (None, None),
        };
        Self {
            bounding_box: parse_points(bbox),
            text,
            confidence,
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let bbox = ["box", "boundingBox", "bbox"]
            .iter()
            .find_map(|key| map.get(*key));
        Self {
            bounding_box: bbox.and_then(parse_points),
            text: map.get("text").and_then(Value::as_str).map(str::to_owned),
            confidence: map.get("confidence").and_then(Value::as_f64),
        }
    }
}

/// Parse a list of `[x, y]` pairs. A list containing a malformed point comes
/// back empty so it is reported as malformed rather than missing.
fn parse_points(value: &Value) -> Option<Vec<Point>> {
    let points = value.as_array()?;
    let parsed = points
        .iter()
        .map(|point| match point.as_array()?.as_slice() {
            [x, y] => Some([x.as_f64()?, y.as_f64()?]),
            _ => None,
        })
        .collect::<Option<Vec<Point>>>();
    Some(parsed.unwrap_or_default())
}

/// Why a candidate was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    MissingBoundingBox,
    /// Not exactly four finite points.
    MalformedBoundingBox,
    MissingText,
    /// Empty after trimming whitespace.
    EmptyText,
    MissingConfidence,
    /// NaN or outside `[0, 1]`.
    ConfidenceOutOfRange,
    /// At or below the retention threshold.
    BelowThreshold,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingBoundingBox => "missing_bounding_box",
            Self::MalformedBoundingBox => "malformed_bounding_box",
            Self::MissingText => "missing_text",
            Self::EmptyText => "empty_text",
            Self::MissingConfidence => "missing_confidence",
            Self::ConfidenceOutOfRange => "confidence_out_of_range",
            Self::BelowThreshold => "below_threshold",
        }
    }
}

/// Result of validating one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Kept(Detection),
    Skipped(SkipReason),
}

/// Validate a single candidate against the retention threshold.
///
/// A detection is kept only when it has a well-formed box, non-blank text, and
/// `confidence > threshold`.
pub fn evaluate(raw: RawDetection, threshold: f64) -> LineOutcome {
    let Some(points) = raw.bounding_box else {
        return LineOutcome::Skipped(SkipReason::MissingBoundingBox);
    };
    let Some(bounding_box) = BoundingBox::from_points(&points) else {
        return LineOutcome::Skipped(SkipReason::MalformedBoundingBox);
    };
    let Some(text) = raw.text else {
        return LineOutcome::Skipped(SkipReason::MissingText);
    };
    if text.trim().is_empty() {
        return LineOutcome::Skipped(SkipReason::EmptyText);
    }
    let Some(confidence) = raw.confidence else {
        return LineOutcome::Skipped(SkipReason::MissingConfidence);
    };
    if !(0.0..=1.0).contains(&confidence) {
        return LineOutcome::Skipped(SkipReason::ConfidenceOutOfRange);
    }
    if confidence <= threshold {
        return LineOutcome::Skipped(SkipReason::BelowThreshold);
    }
    LineOutcome::Kept(Detection {
        bounding_box,
        text,
        confidence,
    })
}

/// Per-reason counts of skipped candidates for one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipCounts(BTreeMap<SkipReason, usize>);

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        *self.0.entry(reason).or_default() += 1;
    }

    pub fn get(&self, reason: SkipReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkipReason, usize)> + '_ {
        self.0.iter().map(|(reason, count)| (*reason, *count))
    }
}

impl std::fmt::Display for SkipCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (reason, count) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", reason.as_str(), count)?;
            first = false;
        }
        Ok(())
    }
}

/// Kept detections for one image, in emission order, plus skip counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub detections: Vec<Detection>,
    pub skipped: SkipCounts,
}

impl NormalizeReport {
    /// Mean confidence of the kept detections (`0.0` when none were kept).
    pub fn mean_confidence(&self) -> f64 {
        if self.detections.is_empty() {
            return 0.0;
        }
        self.detections.iter().map(|d| d.confidence).sum::<f64>() / self.detections.len() as f64
    }
}

/// Validate all candidates from one image.
pub fn normalize(
    candidates: impl IntoIterator<Item = RawDetection>,
    threshold: f64,
) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    for raw in candidates {
        match evaluate(raw, threshold) {
            LineOutcome::Kept(detection) => report.detections.push(detection),
            LineOutcome::Skipped(reason) => report.skipped.record(reason),
        }
    }
    debug!(
        kept = report.detections.len(),
        skipped = report.skipped.total(),
        "Detections normalized"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(y: f64) -> Vec<Point> {
        vec![[0.0, y], [100.0, y], [100.0, y + 10.0], [0.0, y + 10.0]]
    }

    #[test]
    fn low_confidence_never_survives() {
        let confidences = [0.0, 0.1, 0.3, 0.49, 0.5, 0.51, 0.9, 1.0];
        let candidates = confidences
            .iter()
            .enumerate()
            .map(|(i, c)| RawDetection::new(square(i as f64 * 20.0), format!("line {i}"), *c));

        let report = normalize(candidates, 0.5);
        assert!(report.detections.iter().all(|d| d.confidence > 0.5));
        assert_eq!(report.detections.len(), 3);
        assert_eq!(report.skipped.get(SkipReason::BelowThreshold), 5);
    }

    #[test]
    fn malformed_candidates_are_dropped_not_failed() {
        let candidates = vec![
            RawDetection::default(),
            RawDetection {
                bounding_box: Some(vec![[0.0, 0.0], [1.0, 0.0]]),
                text: Some("short box".into()),
                confidence: Some(0.9),
            },
            RawDetection {
                bounding_box: Some(square(0.0)),
                text: None,
                confidence: Some(0.9),
            },
            RawDetection::new(square(0.0), "   ", 0.9),
            RawDetection {
                bounding_box: Some(square(0.0)),
                text: Some("unscored".into()),
                confidence: None,
            },
            RawDetection::from_value(&json!({
                "box": [[0, 0], [10, 0], [10, 5], [0, 5]],
                "text": "object without a score"
            })),
            RawDetection::new(square(0.0), "too sure", 1.7),
            RawDetection::new(square(0.0), "nan", f64::NAN),
            RawDetection::new(square(0.0), "kept", 0.8),
        ];

        let report = normalize(candidates, 0.5);
        assert_eq!(report.detections.len(), 1);
        assert_eq!(report.detections[0].text, "kept");
        assert_eq!(report.skipped.get(SkipReason::MissingBoundingBox), 1);
        assert_eq!(report.skipped.get(SkipReason::MalformedBoundingBox), 1);
        assert_eq!(report.skipped.get(SkipReason::MissingText), 1);
        assert_eq!(report.skipped.get(SkipReason::EmptyText), 1);
        assert_eq!(report.skipped.get(SkipReason::MissingConfidence), 2);
        assert_eq!(report.skipped.get(SkipReason::ConfidenceOutOfRange), 2);
        assert_eq!(report.skipped.total(), 8);
    }

    #[test]
    fn tuple_shape_parses() {
        let value = json!([[[0, 0], [10, 0], [10, 5], [0, 5]], ["CHAPTER 1", 0.97]]);
        let raw = RawDetection::from_value(&value);
        assert_eq!(raw.text.as_deref(), Some("CHAPTER 1"));
        assert_eq!(raw.confidence, Some(0.97));
        assert_eq!(raw.bounding_box.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn tuple_without_confidence_defaults_to_certain() {
        let value = json!([[[0, 0], [10, 0], [10, 5], [0, 5]], ["text only"]]);
        assert_eq!(RawDetection::from_value(&value).confidence, Some(1.0));
    }

    #[test]
    fn object_shape_parses_with_aliases() {
        let value = json!({
            "boundingBox": [[0, 0], [10, 0], [10, 5], [0, 5]],
            "text": "• Check airway",
            "confidence": 0.8
        });
        let raw = RawDetection::from_value(&value);
        assert!(matches!(evaluate(raw, 0.5), LineOutcome::Kept(_)));
    }

    #[test]
    fn wrong_shapes_become_skips() {
        let values = [
            json!("just a string"),
            json!([[[0, 0], [10, 0], [10, 5], [0, 5]], [42, 0.9]]),
            json!([[[0, "x"], [10, 0], [10, 5], [0, 5]], ["bad point", 0.9]]),
            json!({ "text": "no box", "confidence": 0.9 }),
        ];
        let report = normalize(values.iter().map(RawDetection::from_value), 0.5);
        assert!(report.detections.is_empty());
        assert_eq!(report.skipped.get(SkipReason::MissingBoundingBox), 2);
        assert_eq!(report.skipped.get(SkipReason::MissingText), 1);
        assert_eq!(report.skipped.get(SkipReason::MalformedBoundingBox), 1);
    }

    #[test]
    fn mean_confidence_of_kept_lines() {
        let report = normalize(
            vec![
                RawDetection::new(square(0.0), "a", 0.6),
                RawDetection::new(square(20.0), "b", 1.0),
                RawDetection::new(square(40.0), "c", 0.2),
            ],
            0.5,
        );
        assert!((report.mean_confidence() - 0.8).abs() < 1e-9);
        assert_eq!(NormalizeReport::default().mean_confidence(), 0.0);
    }

    #[test]
    fn skip_counts_display() {
        let mut counts = SkipCounts::default();
        counts.record(SkipReason::EmptyText);
        counts.record(SkipReason::BelowThreshold);
        counts.record(SkipReason::BelowThreshold);
        assert_eq!(counts.to_string(), "empty_text=1, below_threshold=2");
    }
}
