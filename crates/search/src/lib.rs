//! # Atlas Search
//!
//! Keyword search over the vault plus a constrained question-answering mode.
//!
//! ## Pipeline
//!
//! ```text
//! Candidate files (vault/*.md, agent/*.md, root yml|yaml|json)
//!     │
//!     ├──> Line scan (case-insensitive substring)
//!     │      ├─ heading match  -> score 2 (3 with filename hit)
//!     │      ├─ body match     -> score 1 (3 with filename hit)
//!     │      └─ filename only  -> score 3
//!     │
//!     ├──> Order by score desc, path asc; cap results
//!     │
//!     └──> Search-notes artifact (overwritten each call)
//! ```
//!
//! Matching is literal substring lookup by contract: no stemming, no fuzzy
//! matching, no ranking beyond the three tiers and first-match scanning.

mod answer;
mod engine;
mod error;
mod notes;

pub use answer::{answer_question, QueryAnswer};
pub use engine::{search, SearchHit};
pub use error::{Result, SearchError};
pub use notes::{render_search_notes, write_search_notes};
