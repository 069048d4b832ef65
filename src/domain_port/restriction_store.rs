use crate::domain_model::*;
use crate::domain_port::StoreError;

/// Cooldown markers that suppress refresh rotations for a session.
#[async_trait::async_trait]
pub trait RestrictionStore: Send + Sync {
    async fn mark(
        &self,
        user_id: &UserId,
        short_id: &ShortId,
        ttl_minutes: u32,
    ) -> Result<(), StoreError>;
    async fn is_marked(&self, user_id: &UserId, short_id: &ShortId) -> Result<bool, StoreError>;
}
