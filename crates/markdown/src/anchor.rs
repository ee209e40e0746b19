use crate::headings::HEADING_RE;

/// Derive a stable anchor from heading text.
///
/// Trim, lowercase, collapse whitespace runs into a single hyphen, then strip
/// everything outside `[a-z0-9-]`. The result keeps a leading `#` so it can
/// be used directly as a citation fragment.
pub fn make_anchor(heading: &str) -> String {
    let mut out = String::with_capacity(heading.len() + 1);
    out.push('#');
    let mut pending_hyphen = false;
    for ch in heading.trim().chars() {
        if ch.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        for lowered in ch.to_lowercase() {
            if lowered.is_ascii_lowercase() || lowered.is_ascii_digit() || lowered == '-' {
                if pending_hyphen {
                    out.push('-');
                    pending_hyphen = false;
                }
                out.push(lowered);
            }
        }
    }
    out
}

/// Text of the last heading at or before `line_idx`, scanning backward.
///
/// Level-agnostic: a `###` directly above a line wins over an `##` further
/// up, matching how citations name the closest enclosing section.
pub fn nearest_heading<'a>(lines: &[&'a str], line_idx: usize) -> Option<&'a str> {
    if lines.is_empty() {
        return None;
    }
    lines[..=line_idx.min(lines.len() - 1)]
        .iter()
        .rev()
        .find_map(|line| HEADING_RE.captures(line))
        .map(|caps| caps.get(2).map(|m| m.as_str().trim()).unwrap_or(""))
}

/// A ±`radius` line window around `line_idx`, clamped to the document.
pub fn excerpt_around(lines: &[&str], line_idx: usize, radius: usize) -> String {
    let start = line_idx.saturating_sub(radius);
    let end = (line_idx + radius + 1).min(lines.len());
    lines[start..end].join("\n")
}
