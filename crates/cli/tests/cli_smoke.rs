use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn atlas() -> Command {
    let mut cmd = Command::cargo_bin("atlas").expect("binary builds");
    cmd.env_remove("ATLAS_VAULT_ROOT");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn seed_vault(root: &Path) {
    let plan = "## Phase 1\n- [ ] (A-1) a #core\n- [ ] (A-2) b #core\n- [ ] (A-3) c #core\n- [ ] (A-4) d #core\n- [ ] (A-5) e #core\n";
    let progress = format!(
        "## {}\n- touched (A-1) (A-2) (A-3) (A-4) (A-5) #log\n",
        chrono::Local::now().format("%Y-%m-%d")
    );
    write(
        root,
        "vault/architecture/ARCHITECTURE.md",
        "# Architecture\nSee [[DECISIONS]].\n\n## Interfaces\n\n| /health | GET |\n",
    );
    write(root, "vault/architecture/DECISIONS.md", "# Decisions\n#adr\n");
    write(root, "vault/planning/masterplan.md", plan);
    write(root, "vault/planning/progress.md", &progress);
    write(root, "vault/planning/now.md", "# Now\n[[masterplan]]\n");
    write(root, "vault/contracts/VAULT_CONTRACT.md", "# Contract\n#contract\n");
    write(root, "vault/contracts/API_CONTRACT.md", "| /health | GET |\n");
    write(root, "vault/contracts/GIT_CONTRACT.md", "# Git\n#contract\n");
}

#[test]
fn version_flag_works() {
    atlas()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("atlas"));
}

#[test]
fn missing_root_is_a_clear_error() {
    atlas()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ATLAS_VAULT_ROOT"));
}

#[test]
fn status_regenerates_the_focus_document() {
    let temp = tempdir().unwrap();
    seed_vault(temp.path());
    atlas()
        .env("ATLAS_VAULT_ROOT", temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("now.md regenerated"));
    let now = fs::read_to_string(temp.path().join("vault/planning/now.md")).unwrap();
    assert!(now.contains("Complete Phase 1 tasks, starting with A-1."));
}

#[test]
fn contract_check_fails_on_an_incomplete_vault() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("vault")).unwrap();
    atlas()
        .env("ATLAS_VAULT_ROOT", temp.path())
        .arg("contract-check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Contract check: FAIL"));
}

#[test]
fn maintain_reports_pass_on_a_healthy_vault() {
    let temp = tempdir().unwrap();
    seed_vault(temp.path());
    atlas()
        .env("ATLAS_VAULT_ROOT", temp.path())
        .arg("maintain")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weekly maintenance: PASS"));
    let weekly = fs::read_to_string(temp.path().join("vault/system/weekly-report.md")).unwrap();
    assert!(weekly.starts_with("# Weekly Report (Append-only)\n"));
}
