use crate::engine::SearchHit;
use crate::error::Result;
use atlas_vault::{docs, write_text, VaultConfig};
use chrono::Utc;

/// Render the human-readable search-notes document.
pub fn render_search_notes(term: &str, hits: &[SearchHit], stamp: &str) -> String {
    let mut out = String::new();
    out.push_str("# Search Notes (Generated)\n\n");
    out.push_str("_This file is overwritten on each search._\n\n");
    out.push_str(&format!("## {stamp} — find: {term}\n### Results\n"));

    if hits.is_empty() {
        out.push_str("\n- No matches found.\n");
        return out;
    }
    for (idx, hit) in hits.iter().enumerate() {
        out.push_str(&format!(
            "\n{}) **{}** — nearest heading: `{}`\n",
            idx + 1,
            hit.path,
            hit.anchor.as_deref().unwrap_or("n/a")
        ));
        match &hit.quote {
            Some(quote) => {
                out.push_str(&format!("\n> {}\n", quote.replace('\n', "\n> ")));
            }
            None => out.push_str("\n> (no excerpt)\n"),
        }
    }
    out
}

/// Overwrite `vault/system/search-notes.md` with the rendered results.
///
/// The file is an explicitly throwaway artifact; overlapping writers
/// clobbering each other is acceptable, last write wins.
pub fn write_search_notes(config: &VaultConfig, term: &str, hits: &[SearchHit]) -> Result<()> {
    let stamp = Utc::now().format("%Y-%m-%d %H:%M").to_string();
    let rendered = render_search_notes(term, hits, &stamp);
    let path = config.resolve_vault(docs::SEARCH_NOTES)?;
    write_text(path.as_path(), &rendered)?;
    Ok(())
}
