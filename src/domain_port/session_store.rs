use crate::domain_model::*;
use crate::domain_port::StoreError;

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Store the current signed token of a session. Without `short_id` the
    /// slot is derived from the user id. Returns the slot used.
    async fn put(
        &self,
        user_id: &UserId,
        token: &SignedToken,
        ttl_minutes: u32,
        short_id: Option<&ShortId>,
    ) -> Result<ShortId, StoreError>;
    async fn get(&self, user_id: &UserId, short_id: &ShortId)
    -> Result<Option<SignedToken>, StoreError>;
    async fn delete(&self, user_id: &UserId, short_id: &ShortId) -> Result<(), StoreError>;
}
