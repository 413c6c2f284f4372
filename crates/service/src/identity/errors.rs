use thiserror::Error;

/// Business errors for identity workflows
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("crypto error: {0}")]
    Crypto(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl IdentityError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            IdentityError::Validation(_) => 1001,
            IdentityError::Conflict(_) => 1002,
            IdentityError::NotFound(_) => 1003,
            IdentityError::Unauthorized(_) => 1004,
            IdentityError::Hash(_) => 1101,
            IdentityError::Token(_) => 1102,
            IdentityError::Crypto(_) => 1103,
            IdentityError::Repository(_) => 1200,
        }
    }
}

impl From<common::crypto::CryptoError> for IdentityError {
    fn from(e: common::crypto::CryptoError) -> Self {
        Self::Crypto(e.to_string())
    }
}
