use crate::analyze::{
    component_drift, endpoint_drift, has_links_or_tags, parse_components, parse_required_files,
    stale_tasks,
};
use crate::error::Result;
use crate::CheckStatus;
use atlas_markdown::{extract_progress_mentions, extract_tasks};
use atlas_vault::{
    append_with_header, docs, list_markdown_files, read_to_string_capped, VaultConfig,
};
use chrono::NaiveDate;

const WEEKLY_HEADER: &str = "# Weekly Report (Append-only)\n\n";
const MAINTENANCE_HEADER: &str = "# Maintenance Log (Append-only)\n\n";

const REQUIRED_FALLBACK: [&str; 8] = [
    docs::ARCHITECTURE,
    docs::DECISIONS,
    docs::MASTERPLAN,
    docs::PROGRESS,
    docs::NOW,
    docs::VAULT_CONTRACT,
    docs::API_CONTRACT,
    docs::GIT_CONTRACT,
];

/// Findings of one weekly maintenance run.
#[derive(Debug, Clone)]
pub struct WeeklyReport {
    pub status: CheckStatus,
    pub required: Vec<String>,
    pub orphans: Vec<String>,
    pub stale: Vec<String>,
    pub drift: Vec<String>,
}

/// Run the weekly maintenance checks, append the structured report to the
/// weekly-report document and a short entry to the maintenance log.
///
/// `today` and `stamp` are passed in so runs are reproducible in tests.
pub fn run_weekly_maintenance(
    config: &VaultConfig,
    today: NaiveDate,
    stamp: &str,
) -> Result<WeeklyReport> {
    let contract = read_vault_or_empty(config, docs::VAULT_CONTRACT);
    let required_files = parse_required_files(&contract);
    let required: Vec<String> = if required_files.is_empty() {
        REQUIRED_FALLBACK.iter().map(|s| s.to_string()).collect()
    } else {
        required_files
    };

    let mut required_findings = Vec::new();
    let mut required_missing = false;
    for rel in &required {
        let present = config
            .resolve_vault(rel)
            .map(|p| p.as_path().is_file())
            .unwrap_or(false);
        if present {
            required_findings.push(format!("- [PASS] {rel} — present"));
        } else {
            required_missing = true;
            required_findings.push(format!("- [FAIL] {rel} — missing"));
        }
    }

    let orphans = collect_orphans(config);
    let orphan_findings = if orphans.is_empty() {
        vec!["- [PASS] none".to_string()]
    } else {
        let mut findings = vec!["- [WARN] timestamp unavailable; reporting all orphans".to_string()];
        findings.extend(orphans.iter().map(|o| format!("- [WARN] {o} — add link or tag")));
        findings
    };

    let masterplan = read_vault_or_empty(config, docs::MASTERPLAN);
    let progress = read_vault_or_empty(config, docs::PROGRESS);
    let tasks = extract_tasks(&masterplan);
    let mentions = extract_progress_mentions(&progress);
    let stale: Vec<String> = stale_tasks(&tasks, &mentions, today)
        .into_iter()
        .take(10)
        .map(|t| format!("- [WARN] ({}) {}", t.id, t.text))
        .collect();
    let stale_findings = if stale.is_empty() {
        vec!["- [PASS] none".to_string()]
    } else {
        stale.clone()
    };

    let api_contract = read_vault_or_empty(config, docs::API_CONTRACT);
    let architecture = read_vault_or_empty(config, docs::ARCHITECTURE);
    let mut drift = endpoint_drift(&api_contract, &architecture);
    let endpoint_warnings = drift.len();
    let components = parse_components(&architecture);
    for explainer in list_markdown_files(&config.vault_dir().join("explainers")) {
        if let Ok(content) = read_to_string_capped(&explainer, config.max_bytes()) {
            drift.extend(component_drift(&components, &content));
        }
    }
    let drift_findings = if drift.is_empty() {
        vec!["- [PASS] none".to_string()]
    } else {
        drift.clone()
    };

    let has_warn = !orphans.is_empty() || !stale.is_empty() || endpoint_warnings > 0;
    let status = if required_missing {
        CheckStatus::Fail
    } else if has_warn {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };

    let report = WeeklyReport {
        status,
        required: required_findings,
        orphans: orphan_findings,
        stale: stale_findings,
        drift: drift_findings,
    };

    append_weekly_entry(config, &report, today, stamp, required_missing, &orphans, &stale)?;
    append_maintenance_entry(config, status, stamp)?;
    Ok(report)
}

fn read_vault_or_empty(config: &VaultConfig, rel: &str) -> String {
    config
        .resolve_vault(rel)
        .ok()
        .and_then(|p| read_to_string_capped(p.as_path(), config.max_bytes()).ok())
        .unwrap_or_default()
}

/// Vault notes outside `system/` and `contracts/` that carry neither a
/// wiki-link nor a tag, capped to 10.
fn collect_orphans(config: &VaultConfig) -> Vec<String> {
    let vault_dir = config.vault_dir();
    let mut orphans = Vec::new();
    for abs in list_markdown_files(&vault_dir) {
        let Ok(stripped) = abs.strip_prefix(&vault_dir) else {
            continue;
        };
        let rel = stripped.to_string_lossy().replace('\\', "/");
        if rel.starts_with("system/") || rel.starts_with("contracts/") {
            continue;
        }
        let Ok(content) = read_to_string_capped(&abs, config.max_bytes()) else {
            continue;
        };
        if !has_links_or_tags(&content) {
            orphans.push(format!("vault/{rel}"));
        }
    }
    orphans.truncate(10);
    orphans
}

#[allow(clippy::too_many_arguments)]
fn append_weekly_entry(
    config: &VaultConfig,
    report: &WeeklyReport,
    today: NaiveDate,
    stamp: &str,
    required_missing: bool,
    orphans: &[String],
    stale: &[String],
) -> Result<()> {
    let mut lines: Vec<String> = vec![
        format!("\n## {} — Weekly Maintenance", today.format("%Y-%m-%d")),
        format!("Status: {}", report.status),
        String::new(),
        "### Summary".to_string(),
        format!(
            "- Required files: {}",
            if required_missing { "missing" } else { "ok" }
        ),
        format!("- Orphan notes: {}", orphans.len()),
        format!("- Stale tasks: {}", stale.len()),
        String::new(),
        "### Checks".to_string(),
        "#### Required Files".to_string(),
    ];
    lines.extend(report.required.iter().cloned());
    lines.extend([
        String::new(),
        "#### Orphan Notes (created this week)".to_string(),
        "Definition:".to_string(),
        "- A note created/modified this week with:".to_string(),
        "  - no `[[links]]` AND no `#tags`".to_string(),
        "Exclude:".to_string(),
        "- vault/system/".to_string(),
        "- vault/contracts/".to_string(),
        String::new(),
        "List:".to_string(),
    ]);
    lines.extend(report.orphans.iter().cloned());
    lines.extend([
        String::new(),
        "#### Stale Tasks (14+ days)".to_string(),
        "Definition:".to_string(),
        "- A task ID in masterplan.md not mentioned in progress.md within last 14 days".to_string(),
        "- If date parsing is not possible, “stale” = never mentioned in progress.md".to_string(),
        String::new(),
        "List:".to_string(),
    ]);
    lines.extend(report.stale.iter().cloned());
    lines.extend([
        String::new(),
        "#### Architecture Drift Warnings".to_string(),
    ]);
    lines.extend(report.drift.iter().cloned());
    lines.extend([
        String::new(),
        "### Suggested Actions (ranked)".to_string(),
        "1) Address missing required files or contract violations".to_string(),
        "2) Triage orphan notes and add links/tags".to_string(),
        "3) Review stale tasks and update progress log".to_string(),
        String::new(),
        "### Notes".to_string(),
        format!("- Generated: {stamp}"),
        String::new(),
    ]);

    let path = config.resolve_vault(docs::WEEKLY_REPORT)?;
    append_with_header(path.as_path(), WEEKLY_HEADER, &lines.join("\n"))?;
    Ok(())
}

fn append_maintenance_entry(
    config: &VaultConfig,
    status: CheckStatus,
    stamp: &str,
) -> Result<()> {
    let entry = [
        format!("\n## {stamp} — Weekly maintenance"),
        format!("Status: {status}"),
        "Findings:".to_string(),
        format!("- [{status}] Weekly report appended"),
        "Suggested Fixes:".to_string(),
        "- See weekly report for details".to_string(),
        String::new(),
    ]
    .join("\n");

    let path = config.resolve_vault(docs::MAINTENANCE_LOG)?;
    append_with_header(path.as_path(), MAINTENANCE_HEADER, &entry)?;
    Ok(())
}
