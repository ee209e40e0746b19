use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `- [ ] (ID) text #tag1 #tag2` with `[x]`/`[X]` marking completion.
static TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- \[([ xX])\] \(([^)]+)\) (.+)$").expect("valid task pattern"));

/// `## Phase <name>` heading that opens a plan phase.
static PHASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##\s+Phase\s+(.+)$").expect("valid phase pattern"));

/// `## YYYY-MM-DD` date heading in a progress log.
static DATE_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##\s+(\d{4}-\d{2}-\d{2})").expect("valid date heading pattern"));

/// Parenthesized task ID mention, e.g. `(CORE-12)`.
static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([A-Z0-9-]+)\)").expect("valid mention pattern"));

/// A plan task line.
///
/// IDs are free-form and not guaranteed unique; consumers that key on them
/// use last-write-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub checked: bool,
    /// Trailing `#` tokens, in original order, still carrying the `#`.
    pub tags: Vec<String>,
    /// Most recent `## Phase <name>` heading above the task, if any.
    pub phase: Option<String>,
}

/// Task ID -> date of the last dated section mentioning it.
///
/// `None` means the log never dated the mention (or carries no valid date
/// headings at all, in which case the whole map degrades to undated).
pub type MentionMap = HashMap<String, Option<String>>;

/// Extract task lines top-to-bottom, tracking the current phase heading.
pub fn extract_tasks(text: &str) -> Vec<Task> {
    let mut tasks = Vec::new();
    let mut current_phase: Option<String> = None;
    for line in text.lines() {
        if let Some(caps) = PHASE_RE.captures(line) {
            current_phase = Some(caps[1].trim().to_string());
            continue;
        }
        let Some(caps) = TASK_RE.captures(line) else {
            continue;
        };
        let checked = caps[1].eq_ignore_ascii_case("x");
        let id = caps[2].trim().to_string();
        let rest = caps[3].trim();

        // Peel trailing #tags right-to-left, stopping at the first non-tag token.
        let mut parts: Vec<&str> = rest.split_whitespace().collect();
        let mut tags: Vec<String> = Vec::new();
        while parts.last().is_some_and(|tok| tok.starts_with('#')) {
            tags.insert(0, parts.pop().unwrap_or_default().to_string());
        }
        let text = parts.join(" ");

        tasks.push(Task {
            id,
            text,
            checked,
            tags,
            phase: current_phase.clone(),
        });
    }
    tasks
}

/// Build the mention map from a progress log.
///
/// `## YYYY-MM-DD` headings set the current date; every `(ID)` occurrence
/// maps to it, later sections overwriting earlier ones for the same ID. A
/// log with no valid date heading degrades every entry to `None` rather than
/// partially dating the map.
pub fn extract_progress_mentions(text: &str) -> MentionMap {
    let mut mentions: MentionMap = HashMap::new();
    let mut current_date: Option<String> = None;
    let mut has_valid_date = false;
    for line in text.lines() {
        if let Some(caps) = DATE_HEADING_RE.captures(line.trim()) {
            current_date = Some(caps[1].to_string());
            has_valid_date = true;
            continue;
        }
        for caps in MENTION_RE.captures_iter(line) {
            mentions.insert(caps[1].to_string(), current_date.clone());
        }
    }
    if !has_valid_date {
        for value in mentions.values_mut() {
            *value = None;
        }
    }
    mentions
}
