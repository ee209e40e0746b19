use crate::analyze::{parse_allowed_dirs, parse_required_files};
use crate::error::Result;
use crate::CheckStatus;
use atlas_vault::{append_with_header, docs, read_to_string_capped, VaultConfig};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;

const MAINTENANCE_HEADER: &str = "# Maintenance Log (Append-only)\n\n";
const MIN_TASK_LINES: usize = 5;

static TASK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^- \[[ xX]\] \([A-Z0-9-]+\) ").expect("valid task-line pattern"));

const ALLOWED_FALLBACK: [&str; 9] = [
    "architecture",
    "planning",
    "devlog",
    "contracts",
    "system",
    "inbox",
    "projects",
    "tasks",
    "explainers",
];

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

/// Findings of one contract-compliance run.
#[derive(Debug, Clone)]
pub struct ContractReport {
    pub status: CheckStatus,
    pub findings: Vec<String>,
    pub suggested: Vec<String>,
}

/// Validate the vault against its structural contract and append the result
/// to the maintenance log.
pub fn run_contract_check(
    config: &VaultConfig,
    today: NaiveDate,
    stamp: &str,
) -> Result<ContractReport> {
    let mut findings = Vec::new();
    let mut suggested = Vec::new();
    let mut failed = false;

    let contract = config
        .resolve_vault(docs::VAULT_CONTRACT)
        .ok()
        .and_then(|p| read_to_string_capped(p.as_path(), config.max_bytes()).ok())
        .unwrap_or_default();

    let allowed_dirs = parse_allowed_dirs(&contract);
    let allowed: Vec<String> = if allowed_dirs.is_empty() {
        ALLOWED_FALLBACK.iter().map(|s| s.to_string()).collect()
    } else {
        allowed_dirs
    };
    let required_files = parse_required_files(&contract);
    let required: Vec<String> = if required_files.is_empty() {
        REQUIRED_FALLBACK.iter().map(|s| s.to_string()).collect()
    } else {
        required_files
    };

    let mut unknown: Vec<String> = Vec::new();
    if let Ok(entries) = fs::read_dir(config.vault_dir()) {
        for entry in entries.flatten() {
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                let name = entry.file_name().to_string_lossy().to_string();
                if !allowed.contains(&name) {
                    unknown.push(name);
                }
            }
        }
    }
    unknown.sort();
    if unknown.is_empty() {
        findings.push("[PASS] Top-level vault directories match allowed list".to_string());
    } else {
        failed = true;
        findings.push(format!(
            "[FAIL] Unknown top-level directories: {}",
            unknown.join(", ")
        ));
        suggested.push("Update VAULT_CONTRACT.md or remove unknown directories".to_string());
    }

    for rel in &required {
        let present = config
            .resolve_vault(rel)
            .map(|p| p.as_path().is_file())
            .unwrap_or(false);
        if present {
            findings.push(format!("[PASS] Required file exists: {rel}"));
        } else {
            failed = true;
            findings.push(format!("[FAIL] Missing required file: {rel}"));
            suggested.push(format!("Create {rel}"));
        }
    }

    let now_present = config
        .resolve_vault(docs::NOW)
        .map(|p| p.as_path().is_file())
        .unwrap_or(false);
    if now_present {
        findings.push("[PASS] now.md exists".to_string());
    } else {
        failed = true;
        findings.push("[FAIL] now.md missing".to_string());
        suggested.push(format!("Create {}", docs::NOW));
    }

    let masterplan = config
        .resolve_vault(docs::MASTERPLAN)
        .ok()
        .and_then(|p| read_to_string_capped(p.as_path(), config.max_bytes()).ok())
        .unwrap_or_default();
    if TASK_LINE_RE.find_iter(&masterplan).count() >= MIN_TASK_LINES {
        findings.push(format!(
            "[PASS] masterplan.md has at least {MIN_TASK_LINES} valid task lines"
        ));
    } else {
        failed = true;
        findings.push(format!(
            "[FAIL] masterplan.md has fewer than {MIN_TASK_LINES} valid task lines"
        ));
        suggested.push("Add more tasks with IDs to masterplan.md".to_string());
    }

    let yyyy_mm = today.format("%Y-%m").to_string();
    let devlog = docs::devlog_for_month(&yyyy_mm);
    let devlog_present = config
        .resolve_vault(&devlog)
        .map(|p| p.as_path().is_file())
        .unwrap_or(false);
    if devlog_present {
        findings.push(format!("[PASS] Devlog exists for {yyyy_mm}"));
    } else {
        findings.push(format!("[WARN] Devlog missing for {yyyy_mm}"));
        suggested.push(format!("Create {devlog}"));
    }

    let status = if failed {
        CheckStatus::Fail
    } else {
        CheckStatus::Pass
    };

    let mut entry: Vec<String> = vec![
        format!("\n## {stamp} — Contract Check"),
        format!("Status: {status}"),
        "Findings:".to_string(),
    ];
    entry.extend(findings.iter().map(|f| format!("- {f}")));
    entry.push("Suggested Fixes:".to_string());
    if suggested.is_empty() {
        entry.push("- None".to_string());
    } else {
        entry.extend(suggested.iter().map(|s| format!("- {s}")));
    }
    entry.push(String::new());

    let path = config.resolve_vault(docs::MAINTENANCE_LOG)?;
    append_with_header(path.as_path(), MAINTENANCE_HEADER, &entry.join("\n"))?;

    Ok(ContractReport {
        status,
        findings,
        suggested,
    })
}
