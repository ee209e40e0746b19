use crate::error::{Result, VaultError};
use crate::paths::{self, RepoPath, VaultPath};
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_VAULT_ROOT: &str = "ATLAS_VAULT_ROOT";
pub const ENV_PORT: &str = "ATLAS_PORT";
pub const ENV_MAX_BYTES: &str = "ATLAS_MAX_BYTES";
pub const ENV_MAX_RESULTS: &str = "ATLAS_MAX_RESULTS";

const DEFAULT_PORT: u16 = 3737;
const DEFAULT_MAX_BYTES: u64 = 250_000;
const DEFAULT_MAX_RESULTS: usize = 10;

/// Immutable process configuration.
///
/// Built once (from the environment or directly in tests) and passed to each
/// component, so one process can serve several roots.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    repo_root: PathBuf,
    port: u16,
    max_bytes: u64,
    max_results: usize,
}

impl VaultConfig {
    /// Read `ATLAS_*` variables; the root is required, everything else has
    /// defaults.
    pub fn from_env() -> Result<Self> {
        let repo_root = env::var(ENV_VAULT_ROOT)
            .map(PathBuf::from)
            .map_err(|_| VaultError::MissingConfig(ENV_VAULT_ROOT))?;
        Ok(Self {
            repo_root,
            port: parse_env(ENV_PORT, DEFAULT_PORT)?,
            max_bytes: parse_env(ENV_MAX_BYTES, DEFAULT_MAX_BYTES)?,
            max_results: parse_env(ENV_MAX_RESULTS, DEFAULT_MAX_RESULTS)?,
        })
    }

    pub fn new(repo_root: impl AsRef<Path>) -> Self {
        Self {
            repo_root: repo_root.as_ref().to_path_buf(),
            port: DEFAULT_PORT,
            max_bytes: DEFAULT_MAX_BYTES,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// `<repo root>/vault`, the directory all vault-scoped paths live under.
    pub fn vault_dir(&self) -> PathBuf {
        self.repo_root.join("vault")
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Default page size and the hard ceiling applied to search results and
    /// link-derived context tails.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Resolve a repo-relative path, rejecting anything that escapes the
    /// repo root.
    pub fn resolve_repo(&self, rel: &str) -> Result<RepoPath> {
        paths::resolve_repo(&self.repo_root, rel)
    }

    /// Resolve a vault-relative path (the `vault/` prefix is added when
    /// absent), rejecting anything that escapes the vault directory.
    pub fn resolve_vault(&self, rel: &str) -> Result<VaultPath> {
        paths::resolve_vault(&self.repo_root, rel)
    }
}

fn parse_env<T>(name: &'static str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| VaultError::InvalidConfig(name, raw)),
    }
}
