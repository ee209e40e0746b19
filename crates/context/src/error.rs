use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContextError>;

#[derive(Error, Debug)]
pub enum ContextError {
    /// The focus document is the one mandatory input; everything else in
    /// the bundle degrades silently.
    #[error("required document missing: {0}")]
    RequiredDocumentMissing(String),

    #[error("vault error: {0}")]
    Vault(#[from] atlas_vault::VaultError),
}
