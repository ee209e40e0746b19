use crate::error::Result;
use atlas_markdown::{excerpt_around, make_anchor, nearest_heading};
use atlas_protocol::Citation;
use atlas_vault::{docs, read_to_string_capped, VaultConfig};
use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED_TERM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("valid quoted-term pattern"));
static WHERE_IS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)where is").expect("valid where-is pattern"));
static DEFINED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)defined").expect("valid defined pattern"));

/// Answer plus supporting citations for `/query`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Answer a constrained natural-language question against the two fixed
/// normative documents (architecture, decisions).
///
/// Exactly two intents are recognized; everything else gets a fixed
/// unsupported-intent response. Lookups are literal substring matches with
/// no ranking beyond first-match.
pub fn answer_question(config: &VaultConfig, question: &str) -> Result<QueryAnswer> {
    let arch_path = config.resolve_vault(docs::ARCHITECTURE)?;
    let dec_path = config.resolve_vault(docs::DECISIONS)?;
    let arch = read_to_string_capped(arch_path.as_path(), config.max_bytes())?;
    let dec = read_to_string_capped(dec_path.as_path(), config.max_bytes())?;

    let lowered = question.to_lowercase();

    if lowered.contains("component") || lowered.contains("responsibilit") {
        return Ok(components_answer(&arch));
    }

    if lowered.contains("where is") || lowered.contains("defined") {
        let term = extract_lookup_term(question);
        return Ok(where_is_answer(&term, &arch, &dec));
    }

    Ok(QueryAnswer {
        answer: "Unsupported query intent. Allowed: components/responsibilities, or \
                 where-is/defined lookups."
            .to_string(),
        citations: vec![decisions_citation()],
    })
}

fn components_answer(arch: &str) -> QueryAnswer {
    let lines: Vec<&str> = arch.lines().collect();
    let Some(start) = lines
        .iter()
        .position(|l| l.trim().eq_ignore_ascii_case("## components"))
    else {
        return QueryAnswer {
            answer: "Not found: Components section missing in ARCHITECTURE.md".to_string(),
            citations: vec![architecture_citation()],
        };
    };
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.starts_with("## "))
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());
    let excerpt = lines[start..end.min(start + 120)].join("\n");
    let quote: String = excerpt.chars().take(1200).collect();

    QueryAnswer {
        answer: "Components and responsibilities are defined in ARCHITECTURE.md under the \
                 Components section."
            .to_string(),
        citations: vec![Citation {
            path: docs::ARCHITECTURE.to_string(),
            anchor: Some("#components".to_string()),
            quote: Some(quote),
        }],
    }
}

/// The quoted term when present, otherwise the question minus the intent
/// phrase fragments.
fn extract_lookup_term(question: &str) -> String {
    if let Some(caps) = QUOTED_TERM_RE.captures(question) {
        return caps[1].trim().to_string();
    }
    let stripped = WHERE_IS_RE.replace(question, "");
    let stripped = DEFINED_RE.replace(&stripped, "");
    stripped.trim().to_string()
}

fn where_is_answer(term: &str, arch: &str, dec: &str) -> QueryAnswer {
    let term_lower = term.to_lowercase();
    let haystacks = [(docs::ARCHITECTURE, arch), (docs::DECISIONS, dec)];

    for (path, text) in haystacks {
        let lines: Vec<&str> = text.lines().collect();
        for (idx, line) in lines.iter().enumerate() {
            if !line.to_lowercase().contains(&term_lower) {
                continue;
            }
            let heading = nearest_heading(&lines, idx);
            let answer = match heading {
                Some(heading) => format!("Found '{term}' in {path} under '{heading}'."),
                None => format!("Found '{term}' in {path}."),
            };
            return QueryAnswer {
                answer,
                citations: vec![Citation {
                    path: path.to_string(),
                    anchor: Some(heading.map(make_anchor).unwrap_or_else(|| "#".to_string())),
                    quote: Some(excerpt_around(&lines, idx, 1)),
                }],
            };
        }
    }

    QueryAnswer {
        answer: format!("Not found: '{term}'. Try searching headings with /find."),
        citations: vec![architecture_citation(), decisions_citation()],
    }
}

fn architecture_citation() -> Citation {
    Citation {
        path: docs::ARCHITECTURE.to_string(),
        anchor: Some("#architecture".to_string()),
        quote: Some("# Architecture".to_string()),
    }
}

fn decisions_citation() -> Citation {
    Citation {
        path: docs::DECISIONS.to_string(),
        anchor: Some("#decisions-adr-lite".to_string()),
        quote: Some("# Decisions (ADR-lite)".to_string()),
    }
}
