use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{RestrictionStore, SessionStore};
use crate::logger::*;
use std::sync::Arc;

/// Rotation procedure behind the refresh RPC.
///
/// The restriction check, the rotation and the mark are three separate
/// store operations. Two concurrent calls for the same session may both
/// rotate; each write leaves a valid token with the same principal, so the
/// store still ends with a single well-formed entry.
pub struct RealRefreshService {
    session_store: Arc<dyn SessionStore>,
    restriction_store: Arc<dyn RestrictionStore>,
    token_codec: Arc<dyn TokenCodec>,
    restrict_minutes: u32,
}

impl RealRefreshService {
    pub fn new(
        session_store: Arc<dyn SessionStore>,
        restriction_store: Arc<dyn RestrictionStore>,
        token_codec: Arc<dyn TokenCodec>,
        restrict_minutes: u32,
    ) -> Self {
        Self {
            session_store,
            restriction_store,
            token_codec,
            restrict_minutes,
        }
    }

    pub async fn rotate(
        &self,
        user_id: &UserId,
        short_id: &ShortId,
    ) -> Result<RefreshOutcome, RefreshError> {
        if self.restriction_store.is_marked(user_id, short_id).await? {
            return Ok(RefreshOutcome::Restricted);
        }

        let Some(token) = self.session_store.get(user_id, short_id).await? else {
            return Ok(RefreshOutcome::SessionGone);
        };

        let claims = match self.token_codec.decode(&token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(%user_id, %short_id, "stored token not refreshable: {}", e);
                return Ok(RefreshOutcome::Undecodable);
            }
        };

        let rotated = self.token_codec.encode(&claims.principal)?;
        self.session_store
            .put(
                user_id,
                &rotated,
                self.token_codec.ttl_minutes(),
                Some(short_id),
            )
            .await?;
        self.restriction_store
            .mark(user_id, short_id, self.restrict_minutes)
            .await?;

        Ok(RefreshOutcome::Rotated)
    }
}

#[async_trait::async_trait]
impl RefreshService for RealRefreshService {
    async fn refresh_token(&self, user_id: &UserId, short_id: &ShortId) {
        match self.rotate(user_id, short_id).await {
            Ok(RefreshOutcome::Rotated) => info!(%user_id, %short_id, "session token rotated"),
            Ok(outcome) => debug!(%user_id, %short_id, ?outcome, "refresh skipped"),
            Err(e) => warn!(%user_id, %short_id, "refresh failed: {}", e),
        }
    }
}
