use crate::error::{Result, VaultError};
use std::path::{Component, Path, PathBuf};

/// Absolute path proven to live under the repo root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPath(PathBuf);

/// Absolute path proven to live under `<repo root>/vault`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPath(PathBuf);

impl RepoPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl VaultPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for VaultPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// A `..` that cannot pop a normal component is kept, so a traversal that
/// climbs past the root still fails the containment check below.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let ends_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if !(ends_normal && out.pop()) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn contained(root: &Path, candidate: &Path) -> bool {
    let root = lexical_normalize(root);
    candidate.starts_with(&root) && candidate != root
}

pub(crate) fn resolve_repo(repo_root: &Path, rel: &str) -> Result<RepoPath> {
    let normalized = lexical_normalize(&repo_root.join(rel));
    if contained(repo_root, &normalized) {
        Ok(RepoPath(normalized))
    } else {
        Err(VaultError::PathEscape("repo"))
    }
}

pub(crate) fn resolve_vault(repo_root: &Path, rel: &str) -> Result<VaultPath> {
    let rel = rel.trim();
    let prefixed = if rel.starts_with("vault/") {
        rel.to_string()
    } else {
        format!("vault/{rel}")
    };
    let normalized = lexical_normalize(&repo_root.join(prefixed));
    if contained(&repo_root.join("vault"), &normalized) {
        Ok(VaultPath(normalized))
    } else {
        Err(VaultError::PathEscape("vault"))
    }
}

/// Normalize a link-like string into a canonical vault document path:
/// prefix `vault/` when absent, append `.md` when absent.
pub fn to_vault_md_path(link_like: &str) -> String {
    let mut path = link_like.trim().to_string();
    if !path.starts_with("vault/") {
        path = format!("vault/{path}");
    }
    if !path.ends_with(".md") {
        path.push_str(".md");
    }
    path
}

/// Canonical vault documents.
pub mod docs {
    pub const NOW: &str = "vault/planning/now.md";
    pub const MASTERPLAN: &str = "vault/planning/masterplan.md";
    pub const PROGRESS: &str = "vault/planning/progress.md";
    pub const MAINTENANCE_LOG: &str = "vault/system/maintenance.md";
    pub const WEEKLY_REPORT: &str = "vault/system/weekly-report.md";
    pub const SEARCH_NOTES: &str = "vault/system/search-notes.md";
    pub const VAULT_CONTRACT: &str = "vault/contracts/VAULT_CONTRACT.md";
    pub const API_CONTRACT: &str = "vault/contracts/API_CONTRACT.md";
    pub const GIT_CONTRACT: &str = "vault/contracts/GIT_CONTRACT.md";
    pub const ARCHITECTURE: &str = "vault/architecture/ARCHITECTURE.md";
    pub const DECISIONS: &str = "vault/architecture/DECISIONS.md";

    pub fn devlog_for_month(yyyy_mm: &str) -> String {
        format!("vault/devlog/{yyyy_mm}.md")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROOT: &str = "/srv/atlas";

    #[test]
    fn repo_scope_accepts_children() {
        let resolved = resolve_repo(Path::new(ROOT), "agent/readme.md").unwrap();
        assert_eq!(resolved.as_path(), Path::new("/srv/atlas/agent/readme.md"));
    }

    #[test]
    fn repo_scope_rejects_traversal() {
        for rel in ["../secrets", "a/../../x", "..", "a/b/../../../etc/passwd"] {
            assert!(matches!(
                resolve_repo(Path::new(ROOT), rel),
                Err(VaultError::PathEscape("repo"))
            ));
        }
    }

    #[test]
    fn repo_scope_rejects_absolute_input() {
        assert!(resolve_repo(Path::new(ROOT), "/etc/passwd").is_err());
    }

    #[test]
    fn vault_scope_prefixes_and_contains() {
        let resolved = resolve_vault(Path::new(ROOT), "planning/now.md").unwrap();
        assert_eq!(
            resolved.as_path(),
            Path::new("/srv/atlas/vault/planning/now.md")
        );
        let already = resolve_vault(Path::new(ROOT), "vault/planning/now.md").unwrap();
        assert_eq!(resolved, already);
    }

    #[test]
    fn vault_scope_rejects_traversal_even_with_prefix() {
        for rel in [
            "vault/../agent/notes.md",
            "../vault/x.md",
            "vault/a/../../b.md",
            "vault/..",
        ] {
            assert!(matches!(
                resolve_vault(Path::new(ROOT), rel),
                Err(VaultError::PathEscape("vault"))
            ));
        }
    }

    #[test]
    fn vault_scope_rejects_the_root_itself() {
        assert!(resolve_vault(Path::new(ROOT), "vault/").is_err());
    }

    #[test]
    fn trailing_slash_tricks_do_not_escape() {
        assert!(resolve_repo(Path::new("/srv/atlas/"), "../atlas-other/x").is_err());
    }

    #[test]
    fn link_normalization_adds_prefix_and_extension() {
        assert_eq!(to_vault_md_path("Notes"), "vault/Notes.md");
        assert_eq!(to_vault_md_path("vault/planning/now.md"), "vault/planning/now.md");
        assert_eq!(to_vault_md_path(" planning/now "), "vault/planning/now.md");
    }
}
