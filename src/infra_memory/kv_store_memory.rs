use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Expiring {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Expiring {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-local stand-in for the networked store. Expired entries are
/// evicted lazily when touched.
pub struct MemoryKeyValueStore {
    hashes: DashMap<String, HashMap<String, Expiring>>,
    values: DashMap<String, Expiring>,
    clock: Arc<dyn Clock>,
}

impl MemoryKeyValueStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemoryKeyValueStore {
            hashes: DashMap::new(),
            values: DashMap::new(),
            clock,
        }
    }

    fn expiry(&self, ttl: Duration) -> Result<DateTime<Utc>, StoreError> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(self.clock.now() + ttl)
    }

    fn drop_empty_hash(&self, key: &str) {
        self.hashes.remove_if(key, |_, fields| fields.is_empty());
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn put(
        &self,
        key: &str,
        field: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let expires_at = self.expiry(ttl)?;
        self.hashes.entry(key.to_owned()).or_default().insert(
            field.to_owned(),
            Expiring {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        let value = {
            let Some(mut fields) = self.hashes.get_mut(key) else {
                return Ok(None);
            };
            let live = fields
                .get(field)
                .map(|entry| entry.is_live(now).then(|| entry.value.clone()));
            if let Some(None) = live {
                fields.remove(field);
            }
            live.flatten()
        };
        if value.is_none() {
            self.drop_empty_hash(key);
        }
        Ok(value)
    }

    async fn delete(&self, key: &str, field: &str) -> Result<(), StoreError> {
        if let Some(mut fields) = self.hashes.get_mut(key) {
            fields.remove(field);
        }
        self.drop_empty_hash(key);
        Ok(())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = self.expiry(ttl)?;
        self.values.insert(
            key.to_owned(),
            Expiring {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.clock.now();
        self.values.remove_if(key, |_, entry| !entry.is_live(now));
        if self.values.contains_key(key) {
            return Ok(true);
        }
        if let Some(mut fields) = self.hashes.get_mut(key) {
            fields.retain(|_, entry| entry.is_live(now));
        }
        self.drop_empty_hash(key);
        Ok(self.hashes.contains_key(key))
    }
}
