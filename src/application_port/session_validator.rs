use crate::application_port::CodecError;
use crate::domain_model::*;
use crate::domain_port::StoreError;

#[derive(Debug, Clone)]
pub struct AccessRequest {
    pub user_id: UserId,
    pub short_id: ShortId,
    pub required_scopes: Scopes,
    /// Schedule a background rotation after a successful check.
    pub refresh: bool,
}

impl AccessRequest {
    pub fn new(user_id: UserId, short_id: ShortId, required_scopes: Scopes) -> Self {
        Self {
            user_id,
            short_id,
            required_scopes,
            refresh: true,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UnauthenticatedReason {
    #[error("no session")]
    NoSession,
    #[error("{0}")]
    Token(#[from] CodecError),
    #[error("wrong token type")]
    WrongTokenType,
    #[error("missing credentials")]
    MissingCredentials,
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("not authenticated: {0}")]
    Unauthenticated(UnauthenticatedReason),
    #[error("missing scopes: {}", missing.join(" "))]
    Forbidden { missing: Vec<String> },
    #[error("session lookup failed: {0}")]
    Store(#[from] StoreError),
}

#[async_trait::async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, request: &AccessRequest) -> Result<Claims, AccessError>;
}
