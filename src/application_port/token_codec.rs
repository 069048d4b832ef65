use crate::domain_model::*;
use serde::Deserialize;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    #[error("token expired")]
    Expired,
    #[error("token signature invalid")]
    InvalidSignature,
    #[error("token malformed: {0}")]
    Malformed(String),
    #[error("signing key unusable: {0}")]
    Key(String),
    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Signing algorithms accepted in configuration.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
pub enum SigningAlgorithm {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
}

impl SigningAlgorithm {
    pub fn uses_shared_secret(self) -> bool {
        matches!(
            self,
            SigningAlgorithm::HS256 | SigningAlgorithm::HS384 | SigningAlgorithm::HS512
        )
    }
}

pub trait TokenCodec: Send + Sync {
    /// Sign `principal` with fresh `issued_at`/`expires_at` stamps.
    fn encode(&self, principal: &Principal) -> Result<SignedToken, CodecError>;
    fn decode(&self, token: &SignedToken) -> Result<Claims, CodecError>;
    /// Lifetime stamped on every encoded token.
    fn ttl_minutes(&self) -> u32;
}
