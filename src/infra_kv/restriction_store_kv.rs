use super::session_store_kv::minutes;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

const RESTRICTED: &str = "restricted";

pub struct KvRestrictionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvRestrictionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        KvRestrictionStore { kv }
    }

    fn key(user_id: &UserId, short_id: &ShortId) -> String {
        format!("{}__{}", user_id, short_id)
    }
}

#[async_trait::async_trait]
impl RestrictionStore for KvRestrictionStore {
    async fn mark(
        &self,
        user_id: &UserId,
        short_id: &ShortId,
        ttl_minutes: u32,
    ) -> Result<(), StoreError> {
        self.kv
            .set(&Self::key(user_id, short_id), RESTRICTED, minutes(ttl_minutes))
            .await
    }

    async fn is_marked(&self, user_id: &UserId, short_id: &ShortId) -> Result<bool, StoreError> {
        self.kv.exists(&Self::key(user_id, short_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryKeyValueStore;

    #[tokio::test]
    async fn mark_is_scoped_to_pair_and_window() {
        let clock = Arc::new(ManualClock::default());
        let store = KvRestrictionStore::new(Arc::new(MemoryKeyValueStore::new(clock.clone())));
        let user_id = UserId::from("u1");
        let id = ShortId::from("a");

        assert!(!store.is_marked(&user_id, &id).await.unwrap());
        store.mark(&user_id, &id, 2).await.unwrap();
        assert!(store.is_marked(&user_id, &id).await.unwrap());
        assert!(!store.is_marked(&user_id, &ShortId::from("b")).await.unwrap());
        assert!(!store.is_marked(&UserId::from("u2"), &id).await.unwrap());

        clock.advance(chrono::Duration::minutes(2));
        assert!(!store.is_marked(&user_id, &id).await.unwrap());
    }
}
