use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("empty search term")]
    EmptyTerm,

    #[error("vault error: {0}")]
    Vault(#[from] atlas_vault::VaultError),
}
