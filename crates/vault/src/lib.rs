//! # Atlas Vault
//!
//! Filesystem access layer for the vault: immutable configuration, scoped
//! path resolution with containment checks, and size-guarded reads.
//!
//! ## Scopes
//!
//! ```text
//! <repo root>            (ATLAS_VAULT_ROOT)
//!     ├── vault/         <- VaultPath scope
//!     ├── agent/
//!     └── *.yml|yaml|json
//! ```
//!
//! Two resolver scopes exist: repo-wide ([`VaultConfig::resolve_repo`]) and
//! vault-only ([`VaultConfig::resolve_vault`]). They return incompatible
//! path newtypes so a vault-scoped read cannot silently widen to the repo.

mod config;
mod error;
mod paths;
mod store;

pub use config::VaultConfig;
pub use error::{Result, VaultError};
pub use paths::{docs, to_vault_md_path, RepoPath, VaultPath};
pub use store::{
    append_with_header, list_markdown_files, read_to_string_capped, sha256_hex, write_text,
};
