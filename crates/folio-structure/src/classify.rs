// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line classifier: heading and list-item heuristics for raw OCR lines.

use std::sync::LazyLock;

use folio_core::{LineRole, OrderedLine};
use regex::Regex;

use crate::order::PositionedDetection;

/// Lines at least this many characters long are never headings by case alone.
const HEADING_MAX_CHARS: usize = 50;

/// Structural heading patterns, matched against the upper-cased line.
static UPPERCASED_HEADING_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^CHAPTER\s+\d+").expect("valid regex"),
        Regex::new(r"^SECTION\s+\d+").expect("valid regex"),
        Regex::new(r"^\d+\.\s+[A-Z]").expect("valid regex"),
    ]
});

/// Two or more consecutive fully-capitalized words, matched against the
/// original line.
static CAPITALIZED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,}\s+[A-Z]{2,}").expect("valid regex"));

static LIST_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^[•\-\*]\s+").expect("valid regex"),
        Regex::new(r"^\d+[\.\)]\s+").expect("valid regex"),
        Regex::new(r"^[a-z][\.\)]\s+").expect("valid regex"),
    ]
});

/// Role plus the two independent facets it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub role: LineRole,
    pub is_heading: bool,
    pub is_list_item: bool,
}

/// Whether a line reads like a heading. The first satisfied rule wins.
pub fn is_heading(text: &str) -> bool {
    if text.chars().count() < HEADING_MAX_CHARS && (is_upper_case(text) || is_title_case(text)) {
        return true;
    }
    let upper = text.to_uppercase();
    UPPERCASED_HEADING_PATTERNS.iter().any(|re| re.is_match(&upper)) || CAPITALIZED_RUN.is_match(text)
}

/// Whether a line starts like a bulleted, numbered, or lettered list item.
pub fn is_list_item(text: &str) -> bool {
    LIST_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Classify one line. Heading is checked before list item.
pub fn classify_text(text: &str) -> Classification {
    let is_heading = is_heading(text);
    let is_list_item = is_list_item(text);
    let role = if is_heading {
        LineRole::Heading
    } else if is_list_item {
        LineRole::ListItem
    } else {
        LineRole::PlainText
    };
    Classification {
        role,
        is_heading,
        is_list_item,
    }
}

/// Tag each ordered detection with its role.
pub fn classify_lines(positioned: Vec<PositionedDetection>) -> Vec<OrderedLine> {
    positioned
        .into_iter()
        .map(|p| {
            let Classification {
                role,
                is_heading,
                is_list_item,
            } = classify_text(&p.detection.text);
            OrderedLine {
                detection: p.detection,
                y_position: p.y_position,
                role,
                is_heading,
                is_list_item,
            }
        })
        .collect()
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// At least one cased character and no lower-case ones.
fn is_upper_case(text: &str) -> bool {
    text.chars().any(is_cased) && !text.chars().any(char::is_lowercase)
}

/// Every word starts upper-case and continues lower-case: upper-case letters
/// only follow uncased characters, lower-case letters only follow cased ones.
fn is_title_case(text: &str) -> bool {
    let mut seen_cased = false;
    let mut previous_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else {
            previous_cased = false;
        }
    }
    seen_cased
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_examples() {
        assert!(is_heading("CHAPTER 3"));
        assert!(is_heading("ASSESSMENT OVERVIEW"));
        assert!(is_heading("Patient Assessment System"));
        assert!(!is_heading("the patient should be assessed"));
        assert!(!is_heading("Check pulse first"));
    }

    #[test]
    fn structural_patterns_ignore_case() {
        assert!(is_heading("Chapter 12 begins with a long introduction to the topic at hand"));
        assert!(is_heading("section 4 covers splinting of long bones in the backcountry"));
        assert!(is_heading("3. treat for shock before moving the patient any further"));
    }

    #[test]
    fn long_upper_case_needs_a_pattern() {
        let long = "THIS LINE IS WRITTEN ENTIRELY IN CAPITALS AND IS VERY LONG";
        assert!(long.chars().count() >= HEADING_MAX_CHARS);
        // Still a heading through the consecutive-capitals pattern.
        assert!(is_heading(long));
        let long_single = "X".repeat(60);
        assert!(!is_heading(&long_single));
    }

    #[test]
    fn list_examples() {
        assert!(is_list_item("• Check airway"));
        assert!(is_list_item("1. Check pulse"));
        assert!(is_list_item("12) Reassess vitals"));
        assert!(is_list_item("- splint in position of function"));
        assert!(is_list_item("b) elevate the extremity"));
        assert!(!is_list_item("Check pulse first"));
        assert!(!is_list_item("•no space after bullet"));
        assert!(!is_list_item("B) capital letters are not list markers"));
    }

    #[test]
    fn heading_wins_over_list() {
        let c = classify_text("1. Check pulse");
        assert!(c.is_heading);
        assert!(c.is_list_item);
        assert_eq!(c.role, LineRole::Heading);

        let c = classify_text("• check airway and breathing");
        assert_eq!(c.role, LineRole::ListItem);
        assert!(!c.is_heading);

        assert_eq!(
            classify_text("the patient should be assessed").role,
            LineRole::PlainText
        );
    }

    #[test]
    fn case_predicates() {
        assert!(is_upper_case("CPR 30:2"));
        assert!(!is_upper_case("1234"));
        assert!(is_title_case("Heat Exhaustion"));
        assert!(is_title_case("Heat-Related Illness"));
        assert!(!is_title_case("CPR Basics"));
        assert!(!is_title_case("Heat exhaustion"));
        assert!(!is_title_case("42"));
    }
}
