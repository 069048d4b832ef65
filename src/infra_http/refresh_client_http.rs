use crate::application_port::*;
use crate::domain_model::*;
use reqwest::Client;
use std::time::Duration;

pub const REFRESH_PATH: &str = "rpc/v1/refresh";

/// Calls a remote refresh service over HTTP(S). Whether the channel is
/// encrypted follows the scheme of the configured URL.
pub struct HttpRefreshClient {
    client: Client,
    endpoint: String,
}

impl HttpRefreshClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RefreshCallError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RefreshCallError::Transport(e.to_string()))?;
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), REFRESH_PATH);
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl RefreshClient for HttpRefreshClient {
    async fn request_refresh(
        &self,
        user_id: &UserId,
        short_id: &ShortId,
    ) -> Result<(), RefreshCallError> {
        let body = RefreshRequest {
            user_id: user_id.clone(),
            short_identifier: short_id.clone(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RefreshCallError::Timeout
                } else {
                    RefreshCallError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshCallError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_cleanly() {
        let a = HttpRefreshClient::new("http://127.0.0.1:50051/", Duration::from_secs(1)).unwrap();
        let b = HttpRefreshClient::new("https://auth.internal", Duration::from_secs(1)).unwrap();
        assert_eq!(a.endpoint(), "http://127.0.0.1:50051/rpc/v1/refresh");
        assert_eq!(b.endpoint(), "https://auth.internal/rpc/v1/refresh");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let client =
            HttpRefreshClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = client
            .request_refresh(&UserId::from("u1"), &ShortId::from("a"))
            .await;
        assert!(result.is_err());
    }
}
