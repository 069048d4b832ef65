use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::SessionStore;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(2);

/// Request-time gate: resolve, decode, authorize, then maybe schedule a
/// background rotation.
pub struct RealSessionValidator {
    session_store: Arc<dyn SessionStore>,
    token_codec: Arc<dyn TokenCodec>,
    refresh_client: Arc<dyn RefreshClient>,
    refresh_timeout: Duration,
}

impl RealSessionValidator {
    pub fn new(
        session_store: Arc<dyn SessionStore>,
        token_codec: Arc<dyn TokenCodec>,
        refresh_client: Arc<dyn RefreshClient>,
    ) -> Self {
        Self {
            session_store,
            token_codec,
            refresh_client,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Fire and forget. The task owns clones of everything it touches, so
    /// dropping the caller does not cancel it.
    fn spawn_refresh(&self, user_id: UserId, short_id: ShortId) {
        let client = self.refresh_client.clone();
        let timeout = self.refresh_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, client.request_refresh(&user_id, &short_id)).await
            {
                Ok(Ok(())) => trace!(%user_id, %short_id, "refresh requested"),
                Ok(Err(e)) => debug!(%user_id, %short_id, "refresh request failed: {}", e),
                Err(_) => debug!(
                    %user_id,
                    %short_id,
                    "refresh request failed: {}",
                    RefreshCallError::Timeout
                ),
            }
        });
    }
}

fn unauthenticated(request: &AccessRequest, reason: UnauthenticatedReason) -> AccessError {
    match &reason {
        UnauthenticatedReason::Token(CodecError::Expired) => {
            debug!(user_id = %request.user_id, "session token expired")
        }
        UnauthenticatedReason::Token(CodecError::InvalidSignature) => {
            warn!(user_id = %request.user_id, "session token has an invalid signature")
        }
        UnauthenticatedReason::Token(e) => {
            warn!(user_id = %request.user_id, "session token rejected: {}", e)
        }
        other => debug!(user_id = %request.user_id, "not authenticated: {}", other),
    }
    AccessError::Unauthenticated(reason)
}

#[async_trait::async_trait]
impl SessionValidator for RealSessionValidator {
    async fn validate(&self, request: &AccessRequest) -> Result<Claims, AccessError> {
        let token = self
            .session_store
            .get(&request.user_id, &request.short_id)
            .await
            .inspect_err(|e| error!(user_id = %request.user_id, "session lookup failed: {}", e))?
            .ok_or_else(|| unauthenticated(request, UnauthenticatedReason::NoSession))?;

        let claims = self
            .token_codec
            .decode(&token)
            .map_err(|e| unauthenticated(request, UnauthenticatedReason::Token(e)))?;

        if claims.principal.token_type != TokenType::Access {
            return Err(unauthenticated(
                request,
                UnauthenticatedReason::WrongTokenType,
            ));
        }

        let missing = claims.principal.scopes.missing(&request.required_scopes);
        if !missing.is_empty() {
            debug!(user_id = %request.user_id, ?missing, "insufficient scopes");
            return Err(AccessError::Forbidden {
                missing: missing.into_iter().map(str::to_owned).collect(),
            });
        }

        if request.refresh {
            self.spawn_refresh(request.user_id.clone(), request.short_id.clone());
        }

        Ok(claims)
    }
}
