use crate::error::{Result, VaultError};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read a file as UTF-8, refusing anything that is not a regular file or
/// exceeds `max_bytes`. Reads are always fresh; nothing is cached.
pub fn read_to_string_capped(path: &Path, max_bytes: u64) -> Result<String> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(VaultError::NotAFile);
    }
    if meta.len() > max_bytes {
        return Err(VaultError::SizeExceeded { limit: max_bytes });
    }
    Ok(fs::read_to_string(path)?)
}

/// Lowercase hex SHA-256 of the raw text, used for change detection and
/// citation provenance.
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// All `.md` files under `dir`, walked depth-first with name-sorted entries
/// so candidate ordering is deterministic across platforms.
pub fn list_markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("failed to read entry under {}: {err}", dir.display());
                None
            }
        });
    for entry in walker {
        if !entry.file_type().is_file() {
            continue;
        }
        let is_md = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if is_md {
            files.push(entry.into_path());
        }
    }
    files
}

/// Overwrite `path` with `content`, creating parent directories.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

/// Append to an append-only log, creating it with `header` first when the
/// file does not exist yet.
pub fn append_with_header(path: &Path, header: &str, entry: &str) -> Result<()> {
    if !path.exists() {
        write_text(path, header)?;
    }
    let mut file = fs::OpenOptions::new().append(true).open(path)?;
    file.write_all(entry.as_bytes())?;
    Ok(())
}
