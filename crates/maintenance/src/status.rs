use crate::error::Result;
use atlas_markdown::{extract_tasks, Task};
use atlas_vault::{docs, read_to_string_capped, write_text, VaultConfig};

const MAX_LISTED_TASKS: usize = 5;
const BLOCKER_TAG: &str = "#blocker";

/// Rebuild the `now.md` focus document from the masterplan and progress log.
///
/// The current phase is the phase of the first unchecked task that has one;
/// up to five non-blocker tasks of that phase become active, the rest feed
/// the next list, and blocker-tagged tasks surface under Blockers together
/// with missing-required-file notes.
pub fn regenerate_now(config: &VaultConfig) -> Result<()> {
    let mut blockers: Vec<String> = Vec::new();

    let masterplan = match read_doc(config, docs::MASTERPLAN) {
        Some(text) => text,
        None => {
            blockers.push(format!("- Missing required file: {}", docs::MASTERPLAN));
            String::new()
        }
    };
    if read_doc(config, docs::PROGRESS).is_none() {
        blockers.push(format!("- Missing required file: {}", docs::PROGRESS));
    }

    let tasks = extract_tasks(&masterplan);
    let unchecked: Vec<&Task> = tasks.iter().filter(|t| !t.checked).collect();
    let current_phase = unchecked
        .iter()
        .find_map(|t| t.phase.clone())
        .unwrap_or_else(|| "Unknown Phase".to_string());
    let phase_tasks: Vec<&Task> = unchecked
        .iter()
        .copied()
        .filter(|t| t.phase.as_deref() == Some(current_phase.as_str()))
        .collect();

    let is_blocker = |t: &Task| t.tags.iter().any(|tag| tag == BLOCKER_TAG);
    let non_blockers: Vec<&Task> = phase_tasks
        .iter()
        .copied()
        .filter(|t| !is_blocker(t))
        .collect();
    let blocker_tasks: Vec<&Task> = phase_tasks
        .iter()
        .copied()
        .filter(|t| is_blocker(t))
        .collect();

    let active: Vec<&Task> = non_blockers.iter().copied().take(MAX_LISTED_TASKS).collect();
    let remaining: Vec<&Task> = phase_tasks
        .iter()
        .copied()
        .filter(|t| !active.iter().any(|a| a.id == t.id))
        .collect();
    let next_candidates: Vec<&Task> = remaining
        .iter()
        .copied()
        .filter(|t| !is_blocker(t))
        .collect();
    let next_pool = if !next_candidates.is_empty() {
        next_candidates
    } else if !remaining.is_empty() {
        remaining
    } else {
        blocker_tasks.clone()
    };
    let next: Vec<&Task> = next_pool.into_iter().take(MAX_LISTED_TASKS).collect();

    let objective = match active.first() {
        Some(first) => format!(
            "Complete Phase {current_phase} tasks, starting with {}.",
            first.id
        ),
        None => "Maintain system state and resolve blockers.".to_string(),
    };

    let mut blocker_lines: Vec<String> = blocker_tasks
        .iter()
        .map(|t| format!("- ({}) {}", t.id, t.text))
        .collect();
    blocker_lines.append(&mut blockers);

    let content = render_now(
        &objective,
        &active.iter().map(|t| format_task_line(t)).collect::<Vec<_>>(),
        &next.iter().map(|t| format_task_line(t)).collect::<Vec<_>>(),
        &blocker_lines,
    );

    let path = config.resolve_vault(docs::NOW)?;
    write_text(path.as_path(), &content)?;
    Ok(())
}

fn read_doc(config: &VaultConfig, rel: &str) -> Option<String> {
    let path = config.resolve_vault(rel).ok()?;
    read_to_string_capped(path.as_path(), config.max_bytes()).ok()
}

fn format_task_line(task: &Task) -> String {
    let tag_str = if task.tags.is_empty() {
        String::new()
    } else {
        format!(" {}", task.tags.join(" "))
    };
    format!("- [ ] ({}) {}{}", task.id, task.text, tag_str)
}

fn render_now(objective: &str, active: &[String], next: &[String], blockers: &[String]) -> String {
    let none = || vec!["- None".to_string()];
    let mut lines: Vec<String> = vec![
        "# Now".to_string(),
        String::new(),
        "## Current Objective".to_string(),
        objective.to_string(),
        String::new(),
        "## Active Tasks (max 5)".to_string(),
    ];
    lines.extend(if active.is_empty() { none() } else { active.to_vec() });
    lines.push(String::new());
    lines.push("## Next Tasks (max 5)".to_string());
    lines.extend(if next.is_empty() { none() } else { next.to_vec() });
    lines.push(String::new());
    lines.push("## Blockers".to_string());
    lines.extend(if blockers.is_empty() { none() } else { blockers.to_vec() });
    lines.extend([
        String::new(),
        "## References".to_string(),
        format!("- `{}`", docs::ARCHITECTURE),
        format!("- `{}`", docs::VAULT_CONTRACT),
        format!("- `{}`", docs::DECISIONS),
        String::new(),
    ]);
    lines.join("\n")
}
