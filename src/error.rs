use thiserror::Error;

pub type Result<T> = std::result::Result<T, MinicoinError>;

#[derive(Error, Debug)]
pub enum MinicoinError {
    /// No usable entropy source; callers should treat this as fatal.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Chain integrity error: {0}")]
    ChainIntegrity(String),

    #[error("Mining error: {0}")]
    Mining(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
