use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_http::*;
use crate::infra_kv::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{Settings, Token};
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;

/// Every component of the session protocol, wired from the settings.
pub struct Server {
    pub session_validator: Arc<dyn SessionValidator>,
    pub issuance_handler: Arc<IssuanceHandler>,
    pub revocation_handler: Arc<RevocationHandler>,
    /// Present when this process serves the refresh procedure.
    pub refresh_service: Option<Arc<dyn RefreshService>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        if settings.refresh.restrict_minutes == 0 {
            return Err(anyhow!("refresh.restrict_minutes must be positive"));
        }

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let session_kv = kv_store(
            settings,
            &settings.store.session_url,
            &settings.store.session_prefix,
            clock.clone(),
        )
        .await?;
        let restriction_kv = kv_store(
            settings,
            &settings.store.restriction_url,
            &settings.store.restriction_prefix,
            clock.clone(),
        )
        .await?;
        let session_store: Arc<dyn SessionStore> = Arc::new(KvSessionStore::new(session_kv));
        let restriction_store: Arc<dyn RestrictionStore> =
            Arc::new(KvRestrictionStore::new(restriction_kv));

        let token_codec: Arc<dyn TokenCodec> =
            Arc::new(JwtCodec::new(codec_config(&settings.token)?, clock)?);
        let restrict_minutes = settings.refresh.restrict_minutes;

        let refresh_service: Option<Arc<dyn RefreshService>> = if settings.refresh.host {
            Some(Arc::new(RealRefreshService::new(
                session_store.clone(),
                restriction_store.clone(),
                token_codec.clone(),
                restrict_minutes,
            )))
        } else {
            None
        };

        let refresh_timeout = Duration::from_millis(settings.refresh.timeout_ms);
        let refresh_client: Arc<dyn RefreshClient> = match settings.refresh.client.as_str() {
            "http" => Arc::new(HttpRefreshClient::new(
                &settings.refresh.url,
                refresh_timeout,
            )?),
            "local" => match &refresh_service {
                Some(service) => Arc::new(LocalRefreshClient::new(service.clone())),
                None => {
                    return Err(anyhow!(
                        "refresh client \"local\" requires refresh.host = true"
                    ));
                }
            },
            other => return Err(anyhow!("Unknown refresh client: {}", other)),
        };

        let session_validator: Arc<dyn SessionValidator> = Arc::new(
            RealSessionValidator::new(session_store.clone(), token_codec.clone(), refresh_client)
                .with_refresh_timeout(refresh_timeout),
        );
        let issuance_handler = Arc::new(IssuanceHandler::new(
            session_store.clone(),
            restriction_store,
            token_codec,
            restrict_minutes,
        ));
        let revocation_handler = Arc::new(RevocationHandler::new(session_store));

        info!(
            store = %settings.store.backend,
            refresh_client = %settings.refresh.client,
            hosts_refresh = settings.refresh.host,
            "session components ready"
        );

        Ok(Self {
            session_validator,
            issuance_handler,
            revocation_handler,
            refresh_service,
        })
    }
}

async fn kv_store(
    settings: &Settings,
    url: &str,
    prefix: &str,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match settings.store.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryKeyValueStore::new(clock))),
        "redis" => Ok(Arc::new(RedisKeyValueStore::connect(url, prefix).await?)),
        other => Err(anyhow!("Unknown store backend: {}", other)),
    }
}

fn codec_config(token: &Token) -> anyhow::Result<CodecConfig> {
    let key = if token.algorithm.uses_shared_secret() {
        let secret = token
            .secret
            .as_ref()
            .ok_or_else(|| anyhow!("token.secret is required for {:?}", token.algorithm))?;
        KeyMaterial::Secret(secret.as_bytes().to_vec())
    } else {
        let read = |path: &Option<String>, name: &str| -> anyhow::Result<Vec<u8>> {
            let path = path
                .as_ref()
                .ok_or_else(|| anyhow!("token.{} is required for {:?}", name, token.algorithm))?;
            std::fs::read(path).map_err(|e| anyhow!("reading {}: {}", path, e))
        };
        KeyMaterial::Pem {
            private_pem: read(&token.private_key_path, "private_key_path")?,
            public_pem: read(&token.public_key_path, "public_key_path")?,
        }
    };

    Ok(CodecConfig {
        algorithm: token.algorithm,
        key,
        access_ttl_minutes: token.access_ttl_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(extra: &str) -> String {
        format!(
            r#"
            [http]
            address = "127.0.0.1:0"
            [log]
            filter = "info"
            [token]
            algorithm = "HS512"
            secret = "s"
            access_ttl_minutes = 5
            [store]
            backend = "memory"
            session_url = ""
            restriction_url = ""
            [refresh]
            restrict_minutes = 1
            url = "http://127.0.0.1:1"
            listen_address = "127.0.0.1:0"
            {}
            "#,
            extra
        )
    }

    #[tokio::test]
    async fn http_client_without_hosting() {
        let s = Settings::from_toml(&settings("host = false\nclient = \"http\"")).unwrap();
        let server = Server::try_new(&s).await.unwrap();
        assert!(server.refresh_service.is_none());
    }

    #[tokio::test]
    async fn local_client_needs_hosted_service() {
        let s = Settings::from_toml(&settings("host = false\nclient = \"local\"")).unwrap();
        assert!(Server::try_new(&s).await.is_err());

        let s = Settings::from_toml(&settings("host = true\nclient = \"local\"")).unwrap();
        assert!(Server::try_new(&s).await.unwrap().refresh_service.is_some());
    }

    #[tokio::test]
    async fn unknown_backend_is_refused() {
        let source = settings("host = false").replace("\"memory\"", "\"etcd\"");
        let s = Settings::from_toml(&source).unwrap();
        assert!(Server::try_new(&s).await.is_err());
    }

    #[test]
    fn pem_algorithms_need_key_paths() {
        let s = Settings::from_toml(
            &settings("host = false").replace("\"HS512\"", "\"ES256\""),
        )
        .unwrap();
        assert!(codec_config(&s.token).is_err());
    }

    #[tokio::test]
    async fn zero_restriction_window_is_refused() {
        let source =
            settings("host = false").replace("restrict_minutes = 1", "restrict_minutes = 0");
        let s = Settings::from_toml(&source).unwrap();
        let err = Server::try_new(&s).await.err().unwrap();
        assert!(err.to_string().contains("restrict_minutes"));
    }
}
