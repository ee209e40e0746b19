//! # Atlas Markdown
//!
//! Structural parsing for vault markdown documents.
//!
//! ## Pipeline
//!
//! ```text
//! Raw text
//!     │
//!     ├──> Headings (level, text, derived anchor)
//!     ├──> Links (wiki-style + vault-relative markdown links)
//!     ├──> Tasks (- [ ] (ID) text #tags, phase-aware)
//!     └──> Mention map (task ID -> last dated heading)
//! ```
//!
//! Every extractor is a pure function of the input text and never fails on
//! malformed markdown: a construct that is absent yields an empty result.

mod anchor;
mod headings;
mod links;
mod tasks;

pub use anchor::{excerpt_around, make_anchor, nearest_heading};
pub use headings::{extract_headings, extract_section_lines, Heading, HEADING_RE};
pub use links::{extract_markdown_links, extract_wiki_links};
pub use tasks::{extract_progress_mentions, extract_tasks, MentionMap, Task};
