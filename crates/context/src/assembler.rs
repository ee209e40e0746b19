use crate::error::{ContextError, Result};
use atlas_markdown::{extract_markdown_links, extract_wiki_links};
use atlas_vault::{docs, read_to_string_capped, sha256_hex, to_vault_md_path, VaultConfig};
use serde::{Deserialize, Serialize};

/// Canonical documents attempted in every bundle, in stable order.
pub const SPINE: [&str; 5] = [
    docs::ARCHITECTURE,
    docs::VAULT_CONTRACT,
    docs::API_CONTRACT,
    docs::GIT_CONTRACT,
    docs::DECISIONS,
];

/// One loaded document in a context bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextSource {
    pub path: String,
    pub bytes: usize,
    pub sha256: String,
    pub content: String,
}

/// Assemble the current-context bundle.
///
/// The focus document (`vault/planning/now.md`) is mandatory. Its wiki
/// links, markdown links and the caller's extra includes form the link tail,
/// capped at `min(max_sources, config.max_results())`; the focus document
/// and the spine are never subject to the cap. Candidates that fail to load
/// are skipped silently, never emitted as placeholders.
pub fn assemble_context(
    config: &VaultConfig,
    extra_includes: &[String],
    max_sources: usize,
) -> Result<Vec<ContextSource>> {
    let now = load(config, docs::NOW)
        .ok_or_else(|| ContextError::RequiredDocumentMissing(docs::NOW.to_string()))?;

    let mut tail: Vec<String> = Vec::new();
    let links = extract_wiki_links(&now)
        .into_iter()
        .chain(extract_markdown_links(&now))
        .chain(extra_includes.iter().cloned());
    for link in links {
        let path = to_vault_md_path(&link);
        if path.starts_with("vault/") && path.ends_with(".md") && !tail.contains(&path) {
            tail.push(path);
        }
    }
    tail.truncate(max_sources.min(config.max_results()));

    let mut candidates: Vec<String> = vec![docs::NOW.to_string()];
    for path in SPINE.iter().map(|s| s.to_string()).chain(tail) {
        if !candidates.contains(&path) {
            candidates.push(path);
        }
    }

    let mut sources = Vec::new();
    for rel in candidates {
        let Some(content) = load(config, &rel) else {
            log::debug!("omitting unreadable context source {rel}");
            continue;
        };
        sources.push(ContextSource {
            bytes: content.len(),
            sha256: sha256_hex(&content),
            path: rel,
            content,
        });
    }
    Ok(sources)
}

fn load(config: &VaultConfig, rel: &str) -> Option<String> {
    let path = config.resolve_vault(rel).ok()?;
    read_to_string_capped(path.as_path(), config.max_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture(root: &Path) -> VaultConfig {
        write(
            root,
            "vault/planning/now.md",
            "# Now\nsee [[projects/alpha]] and [linked](vault/projects/beta.md)\n",
        );
        write(root, "vault/projects/alpha.md", "alpha doc\n");
        write(root, "vault/projects/beta.md", "beta doc\n");
        write(root, "vault/architecture/ARCHITECTURE.md", "# Architecture\n");
        write(root, "vault/architecture/DECISIONS.md", "# Decisions (ADR-lite)\n");
        VaultConfig::new(root)
    }

    #[test]
    fn bundle_orders_seed_spine_then_links() {
        let temp = tempdir().unwrap();
        let config = fixture(temp.path());
        let sources = assemble_context(&config, &[], 10).unwrap();
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "vault/planning/now.md",
                "vault/architecture/ARCHITECTURE.md",
                "vault/architecture/DECISIONS.md",
                "vault/projects/alpha.md",
                "vault/projects/beta.md",
            ]
        );
    }

    #[test]
    fn missing_seed_is_a_hard_error() {
        let temp = tempdir().unwrap();
        let config = VaultConfig::new(temp.path());
        assert!(matches!(
            assemble_context(&config, &[], 10),
            Err(ContextError::RequiredDocumentMissing(_))
        ));
    }

    #[test]
    fn missing_spine_and_link_targets_are_silently_omitted() {
        let temp = tempdir().unwrap();
        let config = fixture(temp.path());
        fs::remove_file(temp.path().join("vault/projects/beta.md")).unwrap();
        let sources = assemble_context(&config, &[], 10).unwrap();
        assert!(sources.iter().all(|s| s.path != "vault/projects/beta.md"));
        assert!(sources.iter().all(|s| s.path != "vault/contracts/API_CONTRACT.md"));
    }

    #[test]
    fn no_path_appears_twice() {
        let temp = tempdir().unwrap();
        let config = fixture(temp.path());
        // Extra include repeating a wiki link and a spine document.
        let extras = vec![
            "projects/alpha".to_string(),
            "vault/architecture/ARCHITECTURE.md".to_string(),
        ];
        let sources = assemble_context(&config, &extras, 10).unwrap();
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        let unique: std::collections::HashSet<&str> = paths.iter().copied().collect();
        assert_eq!(unique.len(), paths.len());
    }

    #[test]
    fn link_tail_is_capped_but_seed_and_spine_are_not() {
        let temp = tempdir().unwrap();
        let config = fixture(temp.path()).with_max_results(1);
        let sources = assemble_context(&config, &[], 1).unwrap();
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert!(paths.contains(&"vault/planning/now.md"));
        assert!(paths.contains(&"vault/architecture/ARCHITECTURE.md"));
        assert!(paths.contains(&"vault/projects/alpha.md"));
        assert!(!paths.contains(&"vault/projects/beta.md"));
    }

    #[test]
    fn sources_carry_bytes_and_digest() {
        let temp = tempdir().unwrap();
        let config = fixture(temp.path());
        let sources = assemble_context(&config, &[], 10).unwrap();
        let alpha = sources
            .iter()
            .find(|s| s.path == "vault/projects/alpha.md")
            .unwrap();
        assert_eq!(alpha.bytes, "alpha doc\n".len());
        assert_eq!(alpha.sha256, sha256_hex("alpha doc\n"));
        assert_eq!(alpha.content, "alpha doc\n");
    }

    #[test]
    fn oversized_documents_are_omitted() {
        let temp = tempdir().unwrap();
        let config = fixture(temp.path()).with_max_bytes(80);
        write(temp.path(), "vault/projects/alpha.md", &"x".repeat(100));
        let sources = assemble_context(&config, &[], 10).unwrap();
        assert!(sources.iter().all(|s| s.path != "vault/projects/alpha.md"));
    }
}
