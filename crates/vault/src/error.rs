use thiserror::Error;

pub type Result<T> = std::result::Result<T, VaultError>;

#[derive(Error, Debug)]
pub enum VaultError {
    /// A resolved path would land outside its declared root. The attempted
    /// path is deliberately not part of the message.
    #[error("path escapes {0} root")]
    PathEscape(&'static str),

    #[error("file too large (> {limit} bytes)")]
    SizeExceeded { limit: u64 },

    #[error("not a regular file")]
    NotAFile,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("invalid configuration value for {0}: {1}")]
    InvalidConfig(&'static str, String),
}
