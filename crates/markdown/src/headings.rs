use crate::anchor::make_anchor;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// ATX heading line: one to six `#` followed by at least one space and text.
pub static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading pattern"));

/// A heading with its derived citation anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading depth, 1..=6.
    pub level: usize,

    /// Trimmed heading text.
    pub text: String,

    /// Anchor derived from the text (includes the leading `#`).
    pub anchor: String,
}

/// Extract all headings in document order.
pub fn extract_headings(text: &str) -> Vec<Heading> {
    text.lines()
        .filter_map(|line| HEADING_RE.captures(line))
        .map(|caps| {
            let text = caps[2].trim().to_string();
            Heading {
                level: caps[1].len(),
                anchor: make_anchor(&text),
                text,
            }
        })
        .collect()
}

/// Lines strictly between a `##`-level heading and the next `## ` line.
///
/// The heading is matched case-insensitively against the full trimmed line
/// (e.g. `"## Required Files"`). Returns an empty vec when absent.
pub fn extract_section_lines(text: &str, heading_literal: &str) -> Vec<String> {
    let wanted = heading_literal.trim().to_lowercase();
    let mut out = Vec::new();
    let mut inside = false;
    for line in text.lines() {
        if inside {
            if line.starts_with("## ") {
                break;
            }
            out.push(line.to_string());
        } else if line.trim().to_lowercase() == wanted {
            inside = true;
        }
    }
    out
}
