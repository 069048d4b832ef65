use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::SessionStore;
use crate::logger::*;
use std::sync::Arc;

/// Logout. Restriction marks are left to expire on their own.
pub struct RevocationHandler {
    session_store: Arc<dyn SessionStore>,
}

impl RevocationHandler {
    pub fn new(session_store: Arc<dyn SessionStore>) -> Self {
        Self { session_store }
    }

    pub async fn revoke(&self, user_id: &UserId, short_id: &ShortId) -> Result<(), SessionError> {
        self.session_store.delete(user_id, short_id).await?;
        info!(%user_id, %short_id, "session revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{CodecConfig, IssuanceHandler, JwtCodec, KeyMaterial};
    use crate::domain_port::{Clock, ManualClock, RestrictionStore};
    use crate::infra_kv::{KvRestrictionStore, KvSessionStore};
    use crate::infra_memory::MemoryKeyValueStore;

    #[tokio::test]
    async fn issue_then_revoke() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let sessions: Arc<dyn SessionStore> = Arc::new(KvSessionStore::new(Arc::new(
            MemoryKeyValueStore::new(clock.clone()),
        )));
        let restrictions: Arc<dyn RestrictionStore> = Arc::new(KvRestrictionStore::new(
            Arc::new(MemoryKeyValueStore::new(clock.clone())),
        ));
        let codec = Arc::new(
            JwtCodec::new(
                CodecConfig {
                    algorithm: SigningAlgorithm::HS384,
                    key: KeyMaterial::Secret(b"handler-secret".to_vec()),
                    access_ttl_minutes: 15,
                },
                clock,
            )
            .unwrap(),
        );
        let issuer = IssuanceHandler::new(sessions.clone(), restrictions.clone(), codec.clone(), 5);
        let revoker = RevocationHandler::new(sessions.clone());

        let user_id = UserId::from("u1");
        let id = issuer
            .issue(&Principal::access("u1", Scopes::new(["read"])))
            .await
            .unwrap();

        assert_eq!(id, ShortId::derive(&user_id));
        let token = sessions.get(&user_id, &id).await.unwrap().unwrap();
        assert_eq!(codec.decode(&token).unwrap().principal.user_id, user_id);
        assert!(restrictions.is_marked(&user_id, &id).await.unwrap());

        revoker.revoke(&user_id, &id).await.unwrap();
        assert_eq!(sessions.get(&user_id, &id).await.unwrap(), None);
        // revoking twice is harmless
        revoker.revoke(&user_id, &id).await.unwrap();
    }
}
