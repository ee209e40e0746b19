//! # Atlas Maintenance
//!
//! Batch checks over the vault's structural contract and the derived
//! documents they regenerate:
//!
//! - staleness analysis (open tasks the progress log stopped mentioning),
//! - drift analysis (API contract vs. architecture doc, explainer vocabulary
//!   vs. declared components),
//! - the weekly maintenance report and the append-only maintenance log,
//! - contract compliance checking,
//! - regeneration of the `now.md` focus document.
//!
//! Every check is a stateless pass over freshly read documents; the only
//! writes go through the append-with-header log writers.

mod analyze;
mod contract;
mod error;
mod status;
mod weekly;

pub use analyze::{
    component_drift, endpoint_drift, has_links_or_tags, parse_allowed_dirs, parse_components,
    parse_endpoint_names, parse_required_files, stale_tasks, COMPONENT_VOCABULARY, STALE_AFTER_DAYS,
};
pub use contract::{run_contract_check, ContractReport};
pub use error::{MaintenanceError, Result};
pub use status::regenerate_now;
pub use weekly::{run_weekly_maintenance, WeeklyReport};

use std::fmt;

/// Outcome of a batch check, printed verbatim by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
        };
        f.write_str(s)
    }
}
