use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
}

/// Minimal networked key-value contract shared by the session and
/// restriction stores. Every operation is atomic on its own.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set one field of a hash with a TTL on that field only.
    async fn put(&self, key: &str, field: &str, value: &str, ttl: Duration)
    -> Result<(), StoreError>;
    async fn get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;
    async fn delete(&self, key: &str, field: &str) -> Result<(), StoreError>;
    /// Set a plain key with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
}
