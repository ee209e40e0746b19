use once_cell::sync::Lazy;
use regex::Regex;

/// `[[Target]]`, `[[Target#fragment]]`, `[[Target|display]]`; only the
/// target participates in resolution.
static WIKI_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[([^\]|#]+)(?:#[^\]|]+)?(?:\|[^\]]+)?\]\]").expect("valid wiki-link pattern")
});

/// Inline markdown links whose URL is vault-relative; fragments ignored.
static MARKDOWN_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\]]+\]\((vault/[^)#\s]+)(?:#[^)]+)?\)").expect("valid markdown-link pattern")
});

fn collect_unique(re: &Regex, text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for caps in re.captures_iter(text) {
        let target = caps[1].trim().to_string();
        if !out.contains(&target) {
            out.push(target);
        }
    }
    out
}

/// Wiki-link targets in first-occurrence order, each distinct target once.
pub fn extract_wiki_links(text: &str) -> Vec<String> {
    collect_unique(&WIKI_LINK_RE, text)
}

/// Vault-relative markdown link paths in first-occurrence order; links
/// pointing anywhere else are ignored.
pub fn extract_markdown_links(text: &str) -> Vec<String> {
    collect_unique(&MARKDOWN_LINK_RE, text)
}
