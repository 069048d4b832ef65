use crate::application_port::CodecError;
use crate::domain_model::*;
use crate::domain_port::StoreError;
use serde::{Deserialize, Serialize};

/// Wire body of the refresh procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub user_id: UserId,
    pub short_identifier: ShortId,
}

/// Empty acknowledgment returned for every refresh call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshAck {}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RefreshOutcome {
    /// A rotation already happened inside the restriction window.
    Restricted,
    SessionGone,
    /// Stored token no longer decodes; left for the validator to reject.
    Undecodable,
    Rotated,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("re-signing failed: {0}")]
    Codec(#[from] CodecError),
}

/// Served side of the refresh procedure.
#[async_trait::async_trait]
pub trait RefreshService: Send + Sync {
    /// Always acknowledges; failures stay inside the service.
    async fn refresh_token(&self, user_id: &UserId, short_id: &ShortId);
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshCallError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("refresh service answered {0}")]
    Status(u16),
    #[error("refresh call timed out")]
    Timeout,
}

/// Calling side of the refresh procedure.
#[async_trait::async_trait]
pub trait RefreshClient: Send + Sync {
    async fn request_refresh(
        &self,
        user_id: &UserId,
        short_id: &ShortId,
    ) -> Result<(), RefreshCallError>;
}
