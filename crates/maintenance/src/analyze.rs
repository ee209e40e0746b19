use atlas_markdown::{MentionMap, Task};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Open tasks older than this many days since their last mention are stale.
pub const STALE_AFTER_DAYS: i64 = 14;

/// Component names the drift check looks for inside explainer documents.
pub const COMPONENT_VOCABULARY: [&str; 5] = ["Agent", "Vault", "Tunnel", "Git", "Cursor"];

/// `| /path | ...`: leading path-like token in the first cell of a
/// markdown table row.
static ENDPOINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|\s*(/[^|\s]+)\s*\|").expect("valid endpoint pattern"));

/// Backticked vault path inside a contract line.
static REQUIRED_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`(vault/[^`]+)`").expect("valid required-file pattern"));

/// `- vault/<dir>/` bullet inside the allowed-directories section.
static ALLOWED_DIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-\s+vault/([^/\s]+)/").expect("valid allowed-dir pattern"));

static WIKI_ANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[.+?\]\]").expect("valid wiki pattern"));
static TAG_ANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s#\w+").expect("valid tag pattern"));

/// Unchecked tasks not corroborated by the progress log within the staleness
/// window. No mention-map entry, an undated entry, or an unparseable date
/// all count as stale.
pub fn stale_tasks<'a>(
    tasks: &'a [Task],
    mentions: &MentionMap,
    today: NaiveDate,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| !task.checked)
        .filter(|task| {
            let Some(Some(raw)) = mentions.get(&task.id) else {
                return true;
            };
            let Ok(last) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
                return true;
            };
            (today - last).num_days() > STALE_AFTER_DAYS
        })
        .collect()
}

/// Endpoint paths from markdown table rows, first occurrence order.
pub fn parse_endpoint_names(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = ENDPOINT_RE.captures(line) {
            let endpoint = caps[1].to_string();
            if !out.contains(&endpoint) {
                out.push(endpoint);
            }
        }
    }
    out
}

/// `### ` subsection titles inside the `## Components` section.
pub fn parse_components(text: &str) -> Vec<String> {
    let mut components = Vec::new();
    let mut inside = false;
    for line in text.lines() {
        if line.trim().eq_ignore_ascii_case("## components") {
            inside = true;
            continue;
        }
        if inside && line.starts_with("## ") {
            break;
        }
        if inside {
            if let Some(title) = line.strip_prefix("### ") {
                components.push(title.trim().to_string());
            }
        }
    }
    components
}

/// Backticked `vault/...` paths under the contract's Required Files section.
pub fn parse_required_files(contract: &str) -> Vec<String> {
    atlas_markdown::extract_section_lines(contract, "## Required Files")
        .iter()
        .filter_map(|line| REQUIRED_FILE_RE.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Top-level directory names under the contract's Allowed Directories
/// section.
pub fn parse_allowed_dirs(contract: &str) -> Vec<String> {
    atlas_markdown::extract_section_lines(contract, "## Allowed Directories")
        .iter()
        .filter_map(|line| ALLOWED_DIR_RE.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// One warning per API endpoint that the architecture doc never declares.
pub fn endpoint_drift(api_contract: &str, architecture: &str) -> Vec<String> {
    let declared = parse_endpoint_names(architecture);
    parse_endpoint_names(api_contract)
        .into_iter()
        .filter(|endpoint| !declared.contains(endpoint))
        .map(|endpoint| {
            format!("- [WARN] API endpoint {endpoint} not found in ARCHITECTURE interfaces table")
        })
        .collect()
}

/// Warnings for vocabulary words an explainer uses without the architecture
/// doc declaring them as components (case-insensitive).
pub fn component_drift(declared_components: &[String], explainer_content: &str) -> Vec<String> {
    let declared_lower: Vec<String> = declared_components
        .iter()
        .map(|c| c.to_lowercase())
        .collect();
    COMPONENT_VOCABULARY
        .iter()
        .filter(|word| {
            explainer_content.contains(*word) && !declared_lower.contains(&word.to_lowercase())
        })
        .map(|word| {
            format!(
                "- [WARN] Explainers reference component '{word}' not listed in ARCHITECTURE \
                 Components"
            )
        })
        .collect()
}

/// Whether a note carries at least one wiki-link or `#tag`.
pub fn has_links_or_tags(content: &str) -> bool {
    WIKI_ANY_RE.is_match(content) || TAG_ANY_RE.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_markdown::{extract_progress_mentions, extract_tasks};
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn tasks_never_mentioned_are_stale() {
        let tasks = extract_tasks("- [ ] (A-1) one\n- [ ] (A-2) two\n");
        let mentions = extract_progress_mentions("## 2026-08-20\n- did (A-1)\n");
        let stale = stale_tasks(&tasks, &mentions, date("2026-08-28"));
        let ids: Vec<&str> = stale.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["A-2"]);
    }

    #[test]
    fn mentions_older_than_the_window_are_stale() {
        let tasks = extract_tasks("- [ ] (A-1) one\n");
        let recent = extract_progress_mentions("## 2026-08-14\n(A-1)\n");
        assert!(stale_tasks(&tasks, &recent, date("2026-08-28")).is_empty());
        let old = extract_progress_mentions("## 2026-08-13\n(A-1)\n");
        assert_eq!(stale_tasks(&tasks, &old, date("2026-08-28")).len(), 1);
    }

    #[test]
    fn undated_log_makes_every_open_task_stale() {
        let tasks = extract_tasks("- [ ] (A-1) one\n- [x] (A-2) done\n");
        let mentions = extract_progress_mentions("- touched (A-1) and (A-2)\n");
        let stale = stale_tasks(&tasks, &mentions, date("2026-08-28"));
        let ids: Vec<&str> = stale.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["A-1"]);
    }

    #[test]
    fn checked_tasks_are_never_stale() {
        let tasks = extract_tasks("- [x] (A-1) done\n");
        let stale = stale_tasks(&tasks, &MentionMap::new(), date("2026-08-28"));
        assert!(stale.is_empty());
    }

    #[test]
    fn endpoint_rows_are_parsed_and_deduplicated() {
        let md = "| /health | GET |\n| /find | POST |\n| /health | GET |\nplain\n";
        assert_eq!(parse_endpoint_names(md), vec!["/health", "/find"]);
    }

    #[test]
    fn endpoint_drift_warns_exactly_once_per_missing_endpoint() {
        let api = "| /health | GET |\n| /query | POST |\n| /find | POST |\n";
        let arch = "| /health | GET |\n";
        let warnings = endpoint_drift(api, arch);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("/query"));
        assert!(warnings[1].contains("/find"));
    }

    #[test]
    fn components_come_from_the_components_section_only() {
        let arch = "\
## Components

### Agent
### Vault

## Interfaces

### NotAComponent
";
        assert_eq!(parse_components(arch), vec!["Agent", "Vault"]);
    }

    #[test]
    fn component_drift_is_case_insensitive_on_declarations() {
        let declared = vec!["agent".to_string(), "VAULT".to_string()];
        let warnings = component_drift(&declared, "The Agent uses the Tunnel and the Vault.");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'Tunnel'"));
    }

    #[test]
    fn contract_sections_parse_required_and_allowed() {
        let contract = "\
## Allowed Directories
- vault/planning/
- vault/system/

## Required Files
- `vault/planning/now.md` must exist
- `vault/contracts/API_CONTRACT.md`
";
        assert_eq!(parse_allowed_dirs(contract), vec!["planning", "system"]);
        assert_eq!(
            parse_required_files(contract),
            vec!["vault/planning/now.md", "vault/contracts/API_CONTRACT.md"]
        );
    }

    #[test]
    fn link_and_tag_detection() {
        assert!(has_links_or_tags("see [[Other Note]]"));
        assert!(has_links_or_tags("tagged #idea"));
        assert!(!has_links_or_tags("# Heading only\nplain text"));
    }
}
