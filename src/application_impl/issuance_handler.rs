use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{RestrictionStore, SessionStore};
use crate::logger::*;
use std::sync::Arc;

/// Login: sign the principal, store it and arm the refresh cooldown.
pub struct IssuanceHandler {
    session_store: Arc<dyn SessionStore>,
    restriction_store: Arc<dyn RestrictionStore>,
    token_codec: Arc<dyn TokenCodec>,
    restrict_minutes: u32,
}

impl IssuanceHandler {
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

    /// Returns the short identifier the client should present from now on.
    pub async fn issue(&self, principal: &Principal) -> Result<ShortId, SessionError> {
        let user_id = &principal.user_id;
        let token = self.token_codec.encode(principal)?;
        let short_id = self
            .session_store
            .put(user_id, &token, self.token_codec.ttl_minutes(), None)
            .await?;
        // A fresh session starts inside its own cooldown window.
        self.restriction_store
            .mark(user_id, &short_id, self.restrict_minutes)
            .await?;

        info!(%user_id, %short_id, "session issued");
        Ok(short_id)
    }
}
