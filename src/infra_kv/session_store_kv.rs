use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use std::time::Duration;

/// Session store laid out as one hash per user, one field per session.
pub struct KvSessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl KvSessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        KvSessionStore { kv }
    }
}

pub(crate) fn minutes(ttl_minutes: u32) -> Duration {
    Duration::from_secs(u64::from(ttl_minutes) * 60)
}

#[async_trait::async_trait]
impl SessionStore for KvSessionStore {
    async fn put(
        &self,
        user_id: &UserId,
        token: &SignedToken,
        ttl_minutes: u32,
        short_id: Option<&ShortId>,
    ) -> Result<ShortId, StoreError> {
        let short_id = short_id
            .cloned()
            .unwrap_or_else(|| ShortId::derive(user_id));
        let record = SessionRecord {
            token: token.clone(),
            ttl_minutes,
        };
        let value =
            serde_json::to_string(&record).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        self.kv
            .put(
                user_id.as_str(),
                short_id.as_str(),
                &value,
                minutes(ttl_minutes),
            )
            .await?;
        Ok(short_id)
    }

    async fn get(
        &self,
        user_id: &UserId,
        short_id: &ShortId,
    ) -> Result<Option<SignedToken>, StoreError> {
        let Some(value) = self.kv.get(user_id.as_str(), short_id.as_str()).await? else {
            return Ok(None);
        };
        let record: SessionRecord =
            serde_json::from_str(&value).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        Ok(Some(record.token))
    }

    async fn delete(&self, user_id: &UserId, short_id: &ShortId) -> Result<(), StoreError> {
        self.kv.delete(user_id.as_str(), short_id.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemoryKeyValueStore;

    fn store() -> (Arc<ManualClock>, KvSessionStore) {
        let clock = Arc::new(ManualClock::default());
        let kv = Arc::new(MemoryKeyValueStore::new(clock.clone()));
        (clock, KvSessionStore::new(kv))
    }

    #[tokio::test]
    async fn token_is_served_until_ttl() {
        let (clock, store) = store();
        let user_id = UserId::from("u1");
        let token = SignedToken("t1".to_string());

        let id = store.put(&user_id, &token, 1, None).await.unwrap();
        assert_eq!(id, ShortId::derive(&user_id));
        assert_eq!(store.get(&user_id, &id).await.unwrap(), Some(token));

        clock.advance(chrono::Duration::minutes(1));
        assert_eq!(store.get(&user_id, &id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn explicit_id_is_reused() {
        let (_, store) = store();
        let user_id = UserId::from("u1");
        let id = ShortId::from("slot-7");

        let used = store
            .put(&user_id, &SignedToken("a".to_string()), 5, Some(&id))
            .await
            .unwrap();
        assert_eq!(used, id);
        store
            .put(&user_id, &SignedToken("b".to_string()), 5, Some(&id))
            .await
            .unwrap();
        assert_eq!(
            store.get(&user_id, &id).await.unwrap(),
            Some(SignedToken("b".to_string()))
        );
    }

    #[tokio::test]
    async fn sessions_of_other_users_are_separate() {
        let (_, store) = store();
        let id = ShortId::from("shared");
        store
            .put(&UserId::from("u1"), &SignedToken("a".to_string()), 5, Some(&id))
            .await
            .unwrap();
        assert_eq!(store.get(&UserId::from("u2"), &id).await.unwrap(), None);
    }
}
