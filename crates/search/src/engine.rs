use crate::error::{Result, SearchError};
use atlas_markdown::{excerpt_around, make_anchor, nearest_heading, HEADING_RE};
use atlas_vault::{list_markdown_files, read_to_string_capped, VaultConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A scored match inside one document. At most one hit is recorded per
/// document: the scan stops at the first qualifying line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// 3 = filename match, 2 = heading match, 1 = body match.
    pub score: u8,

    /// Root-relative path with forward-slash separators.
    pub path: String,

    /// Derived anchor of the matched or nearest heading.
    pub anchor: Option<String>,

    /// ±1-line excerpt window around the matched line.
    pub quote: Option<String>,
}

/// Search the vault for a term, case-insensitively, substring-only.
///
/// Results are ordered by score descending then path ascending, truncated to
/// `min(max_results, config.max_results())`. Unreadable or oversized
/// candidates are skipped, never fatal.
pub fn search(config: &VaultConfig, term: &str, max_results: usize) -> Result<Vec<SearchHit>> {
    let term = term.trim();
    if term.is_empty() {
        return Err(SearchError::EmptyTerm);
    }
    let term_lower = term.to_lowercase();

    let mut hits = Vec::new();
    for rel in candidate_files(config) {
        let Ok(resolved) = config.resolve_repo(&rel) else {
            continue;
        };
        let content = match read_to_string_capped(resolved.as_path(), config.max_bytes()) {
            Ok(content) => content,
            Err(err) => {
                log::debug!("skipping {rel}: {err}");
                continue;
            }
        };
        if let Some(hit) = scan_document(&rel, &content, &term_lower) {
            hits.push(hit);
        }
    }

    hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.path.cmp(&b.path)));
    hits.truncate(max_results.min(config.max_results()));
    Ok(hits)
}

/// Scan one document for the first qualifying line.
fn scan_document(rel: &str, content: &str, term_lower: &str) -> Option<SearchHit> {
    let filename_hit = rel
        .rsplit('/')
        .next()
        .unwrap_or(rel)
        .to_lowercase()
        .contains(term_lower);

    let lines: Vec<&str> = content.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(caps) = HEADING_RE.captures(line) {
            let heading = caps[2].trim();
            if heading.to_lowercase().contains(term_lower) {
                return Some(SearchHit {
                    score: if filename_hit { 3 } else { 2 },
                    path: rel.to_string(),
                    anchor: Some(make_anchor(heading)),
                    quote: Some(excerpt_around(&lines, idx, 1)),
                });
            }
        }
        if line.to_lowercase().contains(term_lower) {
            return Some(SearchHit {
                score: if filename_hit { 3 } else { 1 },
                path: rel.to_string(),
                anchor: nearest_heading(&lines, idx).map(make_anchor),
                quote: Some(excerpt_around(&lines, idx, 1)),
            });
        }
    }

    filename_hit.then(|| SearchHit {
        score: 3,
        path: rel.to_string(),
        anchor: None,
        quote: None,
    })
}

/// Candidate documents: every `.md` under `vault/`, every `.md` under
/// `agent/` when present, plus repo-root yml/yaml/json files. Deduplicated,
/// root-relative, forward slashes.
fn candidate_files(config: &VaultConfig) -> Vec<String> {
    let root = config.repo_root();
    let mut absolute: Vec<PathBuf> = list_markdown_files(&config.vault_dir());

    let agent_dir = root.join("agent");
    if agent_dir.is_dir() {
        absolute.extend(list_markdown_files(&agent_dir));
    }

    let mut root_files: Vec<PathBuf> = Vec::new();
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && has_config_extension(&path) {
                root_files.push(path);
            }
        }
    }
    root_files.sort();
    absolute.extend(root_files);

    let mut rels: Vec<String> = Vec::new();
    for abs in absolute {
        let Ok(stripped) = abs.strip_prefix(root) else {
            continue;
        };
        let rel = stripped.to_string_lossy().replace('\\', "/");
        if !rels.contains(&rel) {
            rels.push(rel);
        }
    }
    rels
}

fn has_config_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            matches!(ext.as_str(), "yml" | "yaml" | "json")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn ranks_filename_over_heading_over_body() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "vault/a-body.md", "# Intro\nthe tunnel runs deep\n");
        write(root, "vault/b-heading.md", "# Tunnel\nbody text\n");
        write(root, "vault/tunnel.md", "# Unrelated\nnothing here\n");

        let config = VaultConfig::new(root);
        let hits = search(&config, "tunnel", 10).unwrap();
        let ordered: Vec<(u8, &str)> = hits.iter().map(|h| (h.score, h.path.as_str())).collect();
        assert_eq!(
            ordered,
            vec![
                (3, "vault/tunnel.md"),
                (2, "vault/b-heading.md"),
                (1, "vault/a-body.md"),
            ]
        );
    }

    #[test]
    fn equal_scores_break_ties_by_ascending_path() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "vault/zeta.md", "plain tunnel mention\n");
        write(root, "vault/alpha.md", "plain tunnel mention\n");

        let config = VaultConfig::new(root);
        let hits = search(&config, "tunnel", 10).unwrap();
        let paths: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(paths, vec!["vault/alpha.md", "vault/zeta.md"]);
    }

    #[test]
    fn heading_hit_carries_anchor_and_excerpt() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "vault/doc.md", "intro\n## Tunnel Design\nafter\n");

        let config = VaultConfig::new(root);
        let hits = search(&config, "tunnel", 10).unwrap();
        assert_eq!(hits[0].anchor.as_deref(), Some("#tunnel-design"));
        assert_eq!(hits[0].quote.as_deref(), Some("intro\n## Tunnel Design\nafter"));
    }

    #[test]
    fn body_hit_cites_nearest_heading_above() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "vault/doc.md", "## Setup\nline\nthe tunnel here\n");

        let config = VaultConfig::new(root);
        let hits = search(&config, "tunnel", 10).unwrap();
        assert_eq!(hits[0].score, 1);
        assert_eq!(hits[0].anchor.as_deref(), Some("#setup"));
    }

    #[test]
    fn scan_stops_at_first_match_per_document() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "vault/doc.md", "first tunnel\nsecond tunnel\n");

        let config = VaultConfig::new(root);
        let hits = search(&config, "tunnel", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].quote.as_deref(), Some("first tunnel\nsecond tunnel"));
    }

    #[test]
    fn oversized_candidates_are_skipped_not_fatal() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "vault/huge.md", &"tunnel ".repeat(100));
        write(root, "vault/ok.md", "tunnel\n");

        let config = VaultConfig::new(root).with_max_bytes(32);
        let hits = search(&config, "tunnel", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "vault/ok.md");
    }

    #[test]
    fn agent_and_root_config_files_are_candidates() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "vault/keep.md", "nothing\n");
        write(root, "agent/notes.md", "tunnel mention\n");
        write(root, "docker-compose.yml", "services:\n  tunnel:\n    image: x\n");

        let config = VaultConfig::new(root);
        let hits = search(&config, "tunnel", 10).unwrap();
        let paths: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        assert!(paths.contains(&"agent/notes.md"));
        assert!(paths.contains(&"docker-compose.yml"));
    }

    #[test]
    fn results_are_capped_by_config_ceiling() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for i in 0..6 {
            write(root, &format!("vault/n{i}.md"), "tunnel\n");
        }

        let config = VaultConfig::new(root).with_max_results(3);
        let hits = search(&config, "tunnel", 50).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn blank_term_is_an_error() {
        let temp = tempdir().unwrap();
        let config = VaultConfig::new(temp.path());
        assert!(matches!(search(&config, "  ", 10), Err(SearchError::EmptyTerm)));
    }
}
