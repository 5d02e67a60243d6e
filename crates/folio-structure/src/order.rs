// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spatial orderer: recovers top-to-bottom reading order from detections the
// engine emits in arbitrary order.

use folio_core::Detection;

/// A detection paired with its vertical reading-order key.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedDetection {
    pub detection: Detection,
    /// Mean of the four bounding-box y-coordinates.
    pub y_position: f64,
}

/// Sort detections top-to-bottom by mean y.
///
/// The sort is stable: detections with equal `y_position` keep their emission
/// order.
pub fn order_detections(detections: Vec<Detection>) -> Vec<PositionedDetection> {
    let mut positioned: Vec<PositionedDetection> = detections
        .into_iter()
        .map(|detection| PositionedDetection {
            y_position: detection.bounding_box.mean_y(),
            detection,
        })
        .collect();
    positioned.sort_by(|a, b| a.y_position.total_cmp(&b.y_position));
    positioned
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::BoundingBox;

    fn detection(text: &str, top: f64, bottom: f64) -> Detection {
        Detection {
            bounding_box: BoundingBox::from_rect(0.0, top, 50.0, bottom),
            text: text.into(),
            confidence: 0.9,
        }
    }

    fn texts(lines: &[PositionedDetection]) -> Vec<&str> {
        lines.iter().map(|l| l.detection.text.as_str()).collect()
    }

    #[test]
    fn sorts_top_to_bottom() {
        let ordered = order_detections(vec![
            detection("bottom", 300.0, 320.0),
            detection("top", 10.0, 30.0),
            detection("middle", 150.0, 170.0),
        ]);
        assert_eq!(texts(&ordered), ["top", "middle", "bottom"]);
        assert_eq!(ordered[0].y_position, 20.0);
    }

    #[test]
    fn ties_keep_emission_order() {
        let ordered = order_detections(vec![
            detection("first", 100.0, 120.0),
            detection("above", 0.0, 10.0),
            detection("second", 105.0, 115.0),
            detection("third", 90.0, 130.0),
        ]);
        assert_eq!(texts(&ordered), ["above", "first", "second", "third"]);
    }

    #[test]
    fn sorting_sorted_input_is_a_no_op() {
        let once = order_detections(vec![
            detection("c", 50.0, 60.0),
            detection("a", 0.0, 10.0),
            detection("b", 50.0, 60.0),
        ]);
        let again = order_detections(once.iter().map(|p| p.detection.clone()).collect());
        assert_eq!(once, again);
    }

    #[test]
    fn empty_input() {
        assert!(order_detections(Vec::new()).is_empty());
    }
}
