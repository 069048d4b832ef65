use crate::application_port::*;
use crate::domain_model::*;
use std::sync::Arc;

/// In-process client for deployments that host the refresh service
/// themselves.
pub struct LocalRefreshClient {
    service: Arc<dyn RefreshService>,
}

impl LocalRefreshClient {
    pub fn new(service: Arc<dyn RefreshService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl RefreshClient for LocalRefreshClient {
    async fn request_refresh(
        &self,
        user_id: &UserId,
        short_id: &ShortId,
    ) -> Result<(), RefreshCallError> {
        self.service.refresh_token(user_id, short_id).await;
        Ok(())
    }
}
