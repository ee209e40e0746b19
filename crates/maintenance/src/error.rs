use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaintenanceError>;

#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error("vault error: {0}")]
    Vault(#[from] atlas_vault::VaultError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
